use http::StatusCode;
use http::header::InvalidHeaderValue;
use tower::BoxError;

/// Transport error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The response status was outside the accepted set.
    #[error("Invalid status code: {}", .code.as_u16())]
    Status { code: StatusCode },

    /// Failure of the underlying HTTP client, passed through as-is.
    #[error(transparent)]
    Transport(BoxError),

    #[error("failed to build request: {0}")]
    Http(#[from] http::Error),

    #[error("failed to encode request body: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("failed to decode response body: {0}")]
    Decoding(#[source] serde_json::Error),

    #[error("invalid header value: {0}")]
    InvalidHeaderValue(#[from] InvalidHeaderValue),

    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

impl Error {
    /// The rejected status code, if this is a status error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Status { code } => Some(*code),
            _ => None,
        }
    }
}
