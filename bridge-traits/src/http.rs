//! HTTP Client Abstraction
//!
//! Provides async request/response HTTP operations used by the catalog client
//! and the storage backends. Implementations own connection pooling and
//! timeouts; retry policy is left to callers.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{BridgeError, Result};

/// HTTP method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }
}

/// Request payload
///
/// `File` bodies are streamed from disk by the client implementation so large
/// media files never have to be buffered in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpBody {
    Bytes(Bytes),
    File { path: PathBuf, len: u64 },
}

impl HttpBody {
    /// Length of the payload in bytes
    pub fn len(&self) -> u64 {
        match self {
            Self::Bytes(bytes) => bytes.len() as u64,
            Self::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// HTTP request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<HttpBody>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let json = serde_json::to_vec(body).map_err(|e| {
            BridgeError::OperationFailed(format!("JSON serialization failed: {}", e))
        })?;
        self.body = Some(HttpBody::Bytes(Bytes::from(json)));
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(HttpBody::Bytes(body));
        self
    }

    /// Stream the file at `path` as the request body
    pub fn file_body(mut self, path: impl Into<PathBuf>, len: u64) -> Self {
        self.body = Some(HttpBody::File {
            path: path.into(),
            len,
        });
        self
    }

}

/// HTTP response
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Async HTTP client trait
///
/// Implementations perform exactly one attempt per call and surface transport
/// failures (connect, TLS, timeout) as [`BridgeError`]. Non-2xx responses are
/// returned as `Ok` so callers can read the body.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::{HttpClient, HttpRequest, HttpMethod};
///
/// async fn fetch(client: &dyn HttpClient) -> Result<String> {
///     let request = HttpRequest::new(HttpMethod::Get, "https://catalog.example.com/API/")
///         .header("App-ID", "app");
///
///     let response = client.execute(request).await?;
///     response.text()
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network connection fails
    /// - TLS validation fails
    /// - Request times out
    /// - A file body cannot be opened
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_request_builder() {
        let request = HttpRequest::new(HttpMethod::Post, "https://example.com/API/assets/v1/")
            .header("App-ID", "app")
            .header("Auth-Token", "secret");

        assert_eq!(request.url, "https://example.com/API/assets/v1/");
        assert_eq!(request.headers.get("App-ID"), Some(&"app".to_string()));
        assert!(request.body.is_none());
    }

    #[test]
    fn test_json_body_sets_content_type() {
        #[derive(Serialize)]
        struct Body {
            title: &'static str,
        }

        let request = HttpRequest::new(HttpMethod::Post, "https://example.com")
            .json(&Body { title: "photos" })
            .unwrap();

        assert_eq!(
            request.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
        assert_eq!(
            request.body,
            Some(HttpBody::Bytes(Bytes::from_static(br#"{"title":"photos"}"#)))
        );
    }

    #[test]
    fn test_file_body_reports_length() {
        let request =
            HttpRequest::new(HttpMethod::Put, "https://example.com").file_body("/tmp/a.jpg", 42);

        let body = request.body.unwrap();
        assert_eq!(body.len(), 42);
        assert!(!body.is_empty());
    }

    #[test]
    fn test_http_response_status_checks() {
        let response = HttpResponse {
            status: 201,
            headers: HashMap::new(),
            body: Bytes::from("test"),
        };

        assert!(response.is_success());
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut headers = HashMap::new();
        headers.insert("x-guploader-uploadid".to_string(), "upload-1".to_string());
        let response = HttpResponse {
            status: 201,
            headers,
            body: Bytes::new(),
        };

        assert_eq!(response.header("X-GUploader-UploadID"), Some("upload-1"));
        assert_eq!(response.header("Location"), None);
    }
}
