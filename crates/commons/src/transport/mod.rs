mod error;
mod response;

use bytes::Bytes;
use http::{
    HeaderMap, HeaderValue, Method, Request, StatusCode,
    header::{ACCEPT, CONTENT_TYPE, USER_AGENT},
};
use http_body::Body as HttpBody;
use http_body_util::{BodyExt, Full, combinators::BoxBody};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::{
    client::legacy::Client as HyperClient,
    rt::TokioExecutor,
};
use serde::Serialize;
use tower::{BoxError, Service, ServiceExt, util::BoxCloneSyncService};
use tracing::{debug, warn};

use crate::signing::encode_json;

pub use self::error::Error;
pub use self::response::Response;

/// Body type handed to the underlying client service.
pub type RequestBody = Full<Bytes>;

type ResponseBody = BoxBody<Bytes, BoxError>;
type Result<T, E = Error> = std::result::Result<T, E>;

/// Default `User-Agent` header value.
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Builder for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportBuilder {
    base_url: String,
    user_agent: HeaderValue,
}

impl HttpTransportBuilder {
    /// URL every request path is appended to. Trailing slashes are dropped.
    ///
    /// Defaults to the empty string, in which case paths must be full URLs.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    /// Set the `User-Agent` header sent with every request.
    ///
    /// Defaults to [`DEFAULT_USER_AGENT`].
    pub fn user_agent(mut self, user_agent: &str) -> Result<Self> {
        self.user_agent = HeaderValue::from_str(user_agent)?;
        Ok(self)
    }

    /// Build the transport on top of a hyper client speaking HTTP/1 and HTTP/2 over http or https.
    ///
    /// Server certificates are checked against the bundled webpki root store.
    #[must_use]
    pub fn build(self) -> HttpTransport {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();

        let client: HyperClient<_, RequestBody> =
            HyperClient::builder(TokioExecutor::new()).build(connector);

        self.service(client)
    }

    /// Build the transport by wrapping another HTTP client service.
    pub fn service<S, B>(self, client: S) -> HttpTransport
    where
        S: Service<Request<RequestBody>, Response = http::Response<B>>
            + Clone
            + Send
            + Sync
            + 'static,
        S::Error: Into<BoxError>,
        S::Future: Send + 'static,
        B: HttpBody<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        let inner = client
            .map_response(|response: http::Response<B>| {
                response.map(|body| body.map_err(Into::<BoxError>::into).boxed())
            })
            .map_err(Into::<BoxError>::into);

        HttpTransport {
            base_url: self.base_url,
            user_agent: self.user_agent,
            inner: BoxCloneSyncService::new(inner),
        }
    }
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            user_agent: HeaderValue::from_static(DEFAULT_USER_AGENT),
        }
    }
}

/// JSON-over-HTTP transport that enforces an accept-list of status codes.
///
/// Every request carries `Accept: application/json`, `Content-Type: application/json`
/// and the configured `User-Agent`. Caller-supplied headers replace defaults of the
/// same name.
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    user_agent: HeaderValue,
    inner: BoxCloneSyncService<Request<RequestBody>, http::Response<ResponseBody>, BoxError>,
}

impl HttpTransport {
    #[must_use]
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`, joined to the base URL with exactly one slash.
    pub fn url(&self, path: &str) -> String {
        if self.base_url.is_empty() {
            return path.to_owned();
        }
        if path.is_empty() {
            return self.base_url.clone();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Execute a request and check the response status.
    ///
    /// An empty `accepted` list accepts any 2xx status.
    ///
    /// # Errors
    ///
    /// - The body could not be encoded as JSON
    /// - The request could not be built from the method and URL
    /// - The underlying client failed, returned unchanged as [`Error::Transport`]
    /// - The status code is not accepted ([`Error::Status`])
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
        headers: &HeaderMap,
        accepted: &[StatusCode],
    ) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        let url = self.url(path);
        let body = match body {
            Some(body) => Bytes::from(encode_json(body)?),
            None => Bytes::new(),
        };

        let mut request = Request::builder()
            .method(method.clone())
            .uri(url.as_str())
            .body(Full::new(body))?;
        self.prepare_headers(request.headers_mut(), headers);

        debug!(%method, %url, "sending request");
        let response = self
            .inner
            .clone()
            .oneshot(request)
            .await
            .map_err(Error::Transport)?;

        let (parts, body) = response.into_parts();
        let body = body.collect().await.map_err(Error::Transport)?.to_bytes();
        let response = Response::new(http::Response::from_parts(parts, body));

        let status = response.status();
        debug!(%method, %url, status = status.as_u16(), "received response");

        if !is_accepted(status, accepted) {
            warn!(%method, %url, status = status.as_u16(), "rejecting response status");
            return Err(Error::Status { code: status });
        }

        Ok(response)
    }

    pub async fn get(
        &self,
        path: &str,
        headers: &HeaderMap,
        accepted: &[StatusCode],
    ) -> Result<Response> {
        self.request::<()>(Method::GET, path, None, headers, accepted)
            .await
    }

    pub async fn post<T>(
        &self,
        path: &str,
        body: &T,
        headers: &HeaderMap,
        accepted: &[StatusCode],
    ) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body), headers, accepted)
            .await
    }

    pub async fn put<T>(
        &self,
        path: &str,
        body: &T,
        headers: &HeaderMap,
        accepted: &[StatusCode],
    ) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body), headers, accepted)
            .await
    }

    pub async fn patch<T>(
        &self,
        path: &str,
        body: &T,
        headers: &HeaderMap,
        accepted: &[StatusCode],
    ) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, Some(body), headers, accepted)
            .await
    }

    pub async fn delete(
        &self,
        path: &str,
        headers: &HeaderMap,
        accepted: &[StatusCode],
    ) -> Result<Response> {
        self.request::<()>(Method::DELETE, path, None, headers, accepted)
            .await
    }

    fn prepare_headers(&self, target: &mut HeaderMap, overrides: &HeaderMap) {
        target.insert(ACCEPT, HeaderValue::from_static("application/json"));
        target.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        target.insert(USER_AGENT, self.user_agent.clone());

        for name in overrides.keys() {
            target.remove(name);
        }
        for (name, value) in overrides {
            target.append(name, value.clone());
        }
    }
}

fn is_accepted(status: StatusCode, accepted: &[StatusCode]) -> bool {
    if accepted.is_empty() {
        status.is_success()
    } else {
        accepted.contains(&status)
    }
}
