use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::error::VerificationError;
use crate::signing::{AUTHORIZATION_HEADER, HmacSigner};

/// Largest request body the middleware buffers for verification.
pub const MAX_SIGNED_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Middleware rejecting requests whose `Authorization` token does not match the body.
///
/// Install with `axum::middleware::from_fn_with_state(Arc::new(signer), verify_signature)`.
/// The body is buffered, checked, and handed to the inner service unchanged.
/// Bodies over [`MAX_SIGNED_BODY_BYTES`] or not valid UTF-8 are rejected with 400.
pub async fn verify_signature(
    State(signer): State<Arc<HmacSigner>>,
    request: Request,
    next: Next,
) -> Result<Response, VerificationError> {
    let (parts, body) = request.into_parts();

    let Some(header) = parts
        .headers
        .get(AUTHORIZATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
    else {
        warn!(identifier = signer.identifier(), path = %parts.uri.path(), "request without signature header");
        return Err(VerificationError::MissingSignature);
    };

    let bytes = to_bytes(body, MAX_SIGNED_BODY_BYTES)
        .await
        .map_err(|e| VerificationError::BadRequest(e.to_string()))?;

    let text = std::str::from_utf8(&bytes).map_err(|e| {
        warn!(identifier = signer.identifier(), path = %parts.uri.path(), "body is not UTF-8");
        VerificationError::BadRequest(format!("request body is not UTF-8: {e}"))
    })?;

    if !signer.validate(&header, text) {
        warn!(identifier = signer.identifier(), path = %parts.uri.path(), "signature mismatch");
        return Err(VerificationError::InvalidSignature);
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}
