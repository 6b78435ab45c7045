mod payload;
mod signer;
mod token;

pub(crate) use payload::encode_json;
pub use payload::Payload;
pub use signer::HmacSigner;
pub use token::{HMAC_PREFIX, Token, TokenError, strip_hmac_prefix};

/// Header carrying the token on signed requests.
pub use http::header::AUTHORIZATION as AUTHORIZATION_HEADER;
