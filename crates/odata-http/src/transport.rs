//! HTTP transport implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue, SET_COOKIE};
use tracing::{debug, instrument, trace};

use odata_core::error::TransportError;
use odata_core::{Cookie, Credentials, Method, ServiceUrl, Transport, TransportRequest, TransportResponse};

/// Request timeout used unless the builder sets another one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for one service host.
///
/// Relative request paths are resolved against the base URL. Every request
/// carries basic auth (if configured) and JSON `Accept`/`Content-Type`
/// headers. Cookies are not stored here; the executor decides which ones to
/// send.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base: ServiceUrl,
    credentials: Option<Credentials>,
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    base: ServiceUrl,
    credentials: Option<Credentials>,
    timeout: Duration,
}

impl ReqwestTransportBuilder {
    /// Authenticate every request with basic auth.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Total time allowed for one request, including reading the body.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ReqwestTransport, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(concat!("odata-http/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .map_err(map_reqwest_error)?;

        Ok(ReqwestTransport {
            client,
            base: self.base,
            credentials: self.credentials,
        })
    }
}

impl ReqwestTransport {
    /// Start building a transport for the given base URL.
    pub fn builder(base: ServiceUrl) -> ReqwestTransportBuilder {
        ReqwestTransportBuilder {
            base,
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Returns the base URL this transport is configured for.
    pub fn base(&self) -> &ServiceUrl {
        &self.base
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = self.base.resolve(&request.url);
        debug!(%url, "Sending request");

        let mut builder = self.client.request(to_reqwest_method(request.method), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref credentials) = self.credentials {
            builder = builder.basic_auth(credentials.username(), Some(credentials.password()));
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(cookies) = Cookie::header_value(&request.cookies) {
            builder = builder.header(COOKIE, cookies);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        trace!(status, "Response received");

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        let cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(Cookie::parse_set_cookie)
            .collect();

        let body = response.bytes().await.map_err(map_reqwest_error)?.to_vec();

        Ok(TransportResponse {
            status,
            headers,
            cookies,
            body,
        })
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            message: err.to_string(),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    }
}
