//! HTTP client abstraction for testability.
//!
//! All cloud traffic goes through the [`AsyncHttpClient`] trait so tests
//! can inject mock clients instead of hitting the Neato endpoints.

use std::future::Future;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Errors raised by the HTTP layer.
///
/// Status-code failures are kept separate from transport failures so the
/// API layer can distinguish "re-authenticate" (401/403) from "retry
/// later" (network trouble, 5xx).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    /// Network-level failure: DNS, connect, timeout, aborted body read.
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered with a non-success status code.
    #[error("HTTP {code} from {url}")]
    Status { code: u16, url: String },
}

impl HttpError {
    /// True when the failure indicates an invalid or expired credential.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, HttpError::Status { code: 401 | 403, .. })
    }
}

/// Trait for asynchronous HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests. It uses non-blocking I/O via
/// async/await.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request with Bearer token authentication.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `bearer_token` - The bearer token for the Authorization header
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error.
    fn get_with_bearer(
        &self,
        url: &str,
        bearer_token: &str,
    ) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;

    /// Performs an async HTTP POST request with a JSON body and custom headers.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `json_body` - JSON body as a string
    /// * `headers` - Slice of (header_name, header_value) tuples
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error.
    fn post_json(
        &self,
        url: &str,
        json_body: &str,
        headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;

    /// Performs an async HTTP POST request with a url-encoded form body.
    ///
    /// Used by the OAuth2 token endpoint and the legacy session login.
    fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;
}

/// Default request timeout for cloud calls.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(concat!("botvaclink/", env!("CARGO_PKG_VERSION")))
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| HttpError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn read_response(
        url: &str,
        response: reqwest::Response,
    ) -> Result<Vec<u8>, HttpError> {
        let status = response.status();
        if !status.is_success() {
            warn!(url = url, status = status.as_u16(), "HTTP error status");
            return Err(HttpError::Status {
                code: status.as_u16(),
                url: url.to_string(),
            });
        }

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) => {
                warn!(url = url, error = %e, "failed to read response body");
                Err(HttpError::Transport(format!(
                    "failed to read response: {}",
                    e
                )))
            }
        }
    }

    fn send_error(url: &str, e: reqwest::Error) -> HttpError {
        warn!(
            url = url,
            error = %e,
            is_connect = e.is_connect(),
            is_timeout = e.is_timeout(),
            "HTTP request failed"
        );
        HttpError::Transport(format!("request failed: {}", e))
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get_with_bearer(&self, url: &str, bearer_token: &str) -> Result<Vec<u8>, HttpError> {
        trace!(url = url, "HTTP GET request starting");
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", bearer_token))
            .send()
            .await
            .map_err(|e| Self::send_error(url, e))?;

        debug!(url = url, status = response.status().as_u16(), "HTTP response received");
        Self::read_response(url, response).await
    }

    async fn post_json(
        &self,
        url: &str,
        json_body: &str,
        headers: &[(&str, &str)],
    ) -> Result<Vec<u8>, HttpError> {
        trace!(url = url, "HTTP POST request starting");
        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(json_body.to_string());

        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| Self::send_error(url, e))?;
        debug!(url = url, status = response.status().as_u16(), "HTTP response received");
        Self::read_response(url, response).await
    }

    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Vec<u8>, HttpError> {
        trace!(url = url, "HTTP POST form request starting");
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| Self::send_error(url, e))?;

        debug!(url = url, status = response.status().as_u16(), "HTTP response received");
        Self::read_response(url, response).await
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Mock async HTTP client for testing.
    ///
    /// Returns a canned response for every request and counts calls so
    /// tests can assert how many requests actually went out.
    #[derive(Clone)]
    pub struct MockAsyncHttpClient {
        pub response: Result<Vec<u8>, HttpError>,
        pub calls: Arc<AtomicUsize>,
    }

    impl MockAsyncHttpClient {
        pub fn new(response: Result<Vec<u8>, HttpError>) -> Self {
            Self {
                response,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        async fn get_with_bearer(
            &self,
            _url: &str,
            _bearer_token: &str,
        ) -> Result<Vec<u8>, HttpError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }

        async fn post_json(
            &self,
            _url: &str,
            _json_body: &str,
            _headers: &[(&str, &str)],
        ) -> Result<Vec<u8>, HttpError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }

        async fn post_form(
            &self,
            _url: &str,
            _form: &[(&str, &str)],
        ) -> Result<Vec<u8>, HttpError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockAsyncHttpClient::new(Ok(vec![1, 2, 3, 4]));

        let result = mock.get_with_bearer("http://example.com", "token").await;
        assert_eq!(result.unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let mock = MockAsyncHttpClient::new(Err(HttpError::Transport("test error".to_string())));

        let result = mock.post_json("http://example.com", "{}", &[]).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_auth_failure_detection() {
        let unauthorized = HttpError::Status {
            code: 401,
            url: "http://example.com".to_string(),
        };
        let forbidden = HttpError::Status {
            code: 403,
            url: "http://example.com".to_string(),
        };
        let server_error = HttpError::Status {
            code: 503,
            url: "http://example.com".to_string(),
        };
        let transport = HttpError::Transport("connection refused".to_string());

        assert!(unauthorized.is_auth_failure());
        assert!(forbidden.is_auth_failure());
        assert!(!server_error.is_auth_failure());
        assert!(!transport.is_auth_failure());
    }

    #[test]
    fn test_http_error_display() {
        let err = HttpError::Status {
            code: 429,
            url: "https://nucleo.neatocloud.com".to_string(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("nucleo.neatocloud.com"));
    }
}
