/// Prefix producers put in front of the token when sending it as a header.
pub const HMAC_PREFIX: &str = "hmac ";

const DIGEST_HEX_LEN: usize = 64;

/// Strips a single leading `hmac` (any case), optionally followed by one space.
///
/// Nothing else is normalized: surrounding whitespace and the case of the
/// remainder are left untouched.
pub fn strip_hmac_prefix(header: &str) -> &str {
    let scheme = HMAC_PREFIX.trim_end();
    match header.get(..scheme.len()) {
        Some(head) if head.eq_ignore_ascii_case(scheme) => {
            let rest = &header[scheme.len()..];
            rest.strip_prefix(' ').unwrap_or(rest)
        }
        _ => header,
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has no `:` between identifier and digest")]
    MissingSeparator,
    #[error("token identifier is empty")]
    EmptyIdentifier,
    #[error("token digest is not 64 lowercase hex characters")]
    InvalidDigest,
}

/// A token split into its identifier and digest.
///
/// Parsing is only a routing aid, e.g. to look up the secret for an
/// identifier. Authenticity is established by
/// [`HmacSigner::validate`](super::HmacSigner::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub identifier: &'a str,
    pub digest: &'a str,
}

impl<'a> Token<'a> {
    pub fn parse(header: &'a str) -> Result<Self, TokenError> {
        let token = strip_hmac_prefix(header);
        let (identifier, digest) = token.rsplit_once(':').ok_or(TokenError::MissingSeparator)?;

        if identifier.is_empty() {
            return Err(TokenError::EmptyIdentifier);
        }

        let is_lower_hex = digest
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if digest.len() != DIGEST_HEX_LEN || !is_lower_hex {
            return Err(TokenError::InvalidDigest);
        }

        Ok(Self { identifier, digest })
    }
}
