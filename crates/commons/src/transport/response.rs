use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use super::error::Error;

/// HTTP response with its body already collected.
#[derive(Debug, Clone)]
pub struct Response {
    inner: http::Response<Bytes>,
}

impl Response {
    pub(crate) fn new(inner: http::Response<Bytes>) -> Self {
        Self { inner }
    }

    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn body(&self) -> &Bytes {
        self.inner.body()
    }

    /// Interpret the body as UTF-8 text.
    pub fn text(&self) -> Result<&str, Error> {
        Ok(std::str::from_utf8(self.inner.body())?)
    }

    /// Deserialize the body as JSON.
    pub fn json<T>(&self) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(self.inner.body()).map_err(Error::Decoding)
    }

    pub fn into_inner(self) -> http::Response<Bytes> {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn exposes_text_and_json() {
        #[derive(Deserialize)]
        struct Greeting {
            hello: String,
        }

        let response = Response::new(http::Response::new(Bytes::from_static(br#"{"hello":"world"}"#)));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().unwrap(), r#"{"hello":"world"}"#);
        assert_eq!(response.json::<Greeting>().unwrap().hello, "world");
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let response = Response::new(http::Response::new(Bytes::from_static(&[0xff, 0xfe])));
        assert!(matches!(response.text(), Err(Error::Utf8(_))));
    }
}
