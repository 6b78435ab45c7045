pub mod error;
pub mod server;
pub mod signing;
pub mod transport;

pub use error::{Error, VerificationError};
pub use server::verify_signature;
pub use signing::{HmacSigner, Payload, Token};
pub use transport::{HttpTransport, HttpTransportBuilder, Response};
