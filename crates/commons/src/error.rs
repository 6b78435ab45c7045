use axum::http::StatusCode;
use axum_core::response::{IntoResponse as AxumCoreIntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to encode payload as JSON: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Reasons an inbound request fails signature verification.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("Missing or unreadable signature header")]
    MissingSignature,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

/// Trait implementation to convert this error into an axum http response
impl AxumCoreIntoResponse for VerificationError {
    fn into_response(self) -> Response {
        let status = match self {
            VerificationError::MissingSignature | VerificationError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            VerificationError::InvalidSignature => StatusCode::UNAUTHORIZED,
        };
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_signature_returns_400() {
        let response = VerificationError::MissingSignature.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_signature_returns_401() {
        let response = VerificationError::InvalidSignature.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn bad_request_returns_400() {
        let response = VerificationError::BadRequest("body too large".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn encoding_error_mentions_json() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = Error::from(source);
        assert!(error.to_string().starts_with("failed to encode payload as JSON"));
    }
}
