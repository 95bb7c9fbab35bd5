//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpBody, HttpClient, HttpMethod, HttpRequest, HttpResponse},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// Timeouts applied to every request issued by a [`ReqwestHttpClient`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Time allowed to establish the TCP/TLS connection
    pub connect_timeout: Duration,
    /// Maximum idle time between reads of the response
    pub read_timeout: Duration,
    /// Overall deadline for one request, body transfer included
    pub request_timeout: Duration,
}

impl HttpClientConfig {
    /// Profile for small JSON calls against the catalog API
    pub fn catalog() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Profile for streaming media bytes into object storage
    pub fn transfer() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10 * 60),
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::catalog()
    }
}

/// Reqwest-based HTTP client implementation
///
/// Provides HTTP operations with:
/// - Connection pooling via reqwest
/// - Streamed file uploads with an explicit `Content-Length`
/// - TLS through rustls
///
/// Each call is a single attempt. Retrying is the caller's decision.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a client with the given timeout profile
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(10)
            .user_agent(concat!("catalog-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                BridgeError::NotAvailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Client tuned for catalog API calls
    pub fn catalog() -> Result<Self> {
        Self::new(HttpClientConfig::catalog())
    }

    /// Client tuned for object storage transfers
    pub fn transfer() -> Result<Self> {
        Self::new(HttpClientConfig::transfer())
    }

    /// Convert bridge HttpMethod to reqwest Method
    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
        }
    }

    /// Build reqwest request from bridge request
    async fn build_request(&self, request: HttpRequest) -> Result<reqwest::RequestBuilder> {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        match request.body {
            Some(HttpBody::Bytes(bytes)) => {
                req = req.body(bytes);
            }
            Some(HttpBody::File { path, len }) => {
                let file = tokio::fs::File::open(&path).await.map_err(|e| {
                    BridgeError::OperationFailed(format!(
                        "Failed to open {} for upload: {}",
                        path.display(),
                        e
                    ))
                })?;
                req = req
                    .header(reqwest::header::CONTENT_LENGTH, len)
                    .body(reqwest::Body::wrap_stream(ReaderStream::new(file)));
            }
            None => {}
        }

        Ok(req)
    }

    fn map_error(url: &str, error: reqwest::Error) -> BridgeError {
        if error.is_timeout() {
            BridgeError::Timeout(format!("{}: {}", url, error))
        } else if error.is_connect() {
            BridgeError::Connection(format!("{}: {}", url, error))
        } else {
            BridgeError::OperationFailed(format!("{}: {}", url, error))
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        debug!(method = request.method.as_str(), url = %url, "Executing HTTP request");

        let response = self
            .build_request(request)
            .await?
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                Self::map_error(&url, e)
            })?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(&url, e))?;

        debug!(url = %url, status, bytes = body.len(), "HTTP response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{body_bytes, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_timeout_profiles() {
        let catalog = HttpClientConfig::catalog();
        assert_eq!(catalog.request_timeout, Duration::from_secs(30));

        let transfer = HttpClientConfig::transfer();
        assert_eq!(transfer.connect_timeout, Duration::from_secs(5));
        assert_eq!(transfer.request_timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Get),
            reqwest::Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Patch),
            reqwest::Method::PATCH
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::catalog().unwrap();
        let response = client
            .execute(HttpRequest::new(
                HttpMethod::Get,
                format!("{}/missing", server.uri()),
            ))
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_success());
        assert_eq!(response.body, "not here");
    }

    #[tokio::test]
    async fn test_file_body_is_streamed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"frame data").unwrap();

        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/upload"))
            .and(header("content-length", "10"))
            .and(body_bytes(b"frame data".to_vec()))
            .respond_with(ResponseTemplate::new(200).insert_header("ETag", "\"abc\""))
            .expect(1)
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::transfer().unwrap();
        let request = HttpRequest::new(HttpMethod::Put, format!("{}/upload", server.uri()))
            .file_body(file.path(), 10);
        let response = client.execute(request).await.unwrap();

        assert!(response.is_success());
        assert_eq!(response.header("etag"), Some("\"abc\""));
    }

    #[tokio::test]
    async fn test_missing_file_body_fails_before_sending() {
        let client = ReqwestHttpClient::transfer().unwrap();
        let request = HttpRequest::new(HttpMethod::Put, "http://127.0.0.1:9/upload")
            .file_body("/definitely/not/here.bin", 3);

        let result = client.execute(request).await;
        assert!(matches!(result, Err(BridgeError::OperationFailed(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_connection_error() {
        let client = ReqwestHttpClient::catalog().unwrap();
        let result = client
            .execute(HttpRequest::new(HttpMethod::Get, "http://127.0.0.1:9/"))
            .await;

        assert!(matches!(result, Err(BridgeError::Connection(_))));
    }
}
