use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::payload::Payload;
use super::token::{HMAC_PREFIX, strip_hmac_prefix};
use crate::error::Error;

type HmacSha256 = Hmac<Sha256>;

/// Produces and checks `<identifier>:<hex digest>` tokens over request payloads.
///
/// The digest is the lowercase hex HMAC-SHA256 of the canonical payload,
/// keyed with the shared secret. Both fields are fixed at construction, so a
/// signer can be shared freely across threads.
#[derive(Clone)]
pub struct HmacSigner {
    identifier: String,
    secret: String,
}

impl HmacSigner {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Sign a payload, returning the bare token (no `hmac ` prefix).
    ///
    /// Fails only when a structured payload cannot be encoded as JSON.
    pub fn generate<'a>(&self, payload: impl Into<Payload<'a>>) -> Result<String, Error> {
        let payload: Payload<'a> = payload.into();
        let canonical = payload.canonicalize()?;
        Ok(format!("{}:{}", self.identifier, self.digest(canonical.as_bytes())))
    }

    /// Sign a payload, returning the token in header form (`hmac <token>`).
    pub fn generate_header<'a>(&self, payload: impl Into<Payload<'a>>) -> Result<String, Error> {
        Ok(format!("{HMAC_PREFIX}{}", self.generate(payload)?))
    }

    /// Check a received token against a freshly generated one.
    ///
    /// An optional leading `hmac` prefix is ignored. Every kind of mismatch,
    /// including a payload that fails to encode, yields `false`.
    pub fn validate<'a>(&self, received: &str, payload: impl Into<Payload<'a>>) -> bool {
        let Ok(expected) = self.generate(payload) else {
            return false;
        };
        let received = strip_hmac_prefix(received);

        received.as_bytes().ct_eq(expected.as_bytes()).into()
    }

    fn digest(&self, data: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(data);
        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacSigner")
            .field("identifier", &self.identifier)
            .field("secret", &"[redacted]")
            .finish()
    }
}
