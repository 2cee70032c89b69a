//! Outbound API transport port

use async_trait::async_trait;
use warden_domain::AuthResult;

/// HTTP methods used against the backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP DELETE.
    Delete,
}

/// An outbound API call as it moves through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: ApiMethod,
    /// Path relative to the configured base URL.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
    /// Bearer credential stamped by the pipeline before transmission.
    pub bearer: Option<String>,
    /// How many times this request has been retried after an
    /// authentication failure. Checked before the coordinator decision
    /// point; a request is retried at most once.
    pub attempt: u8,
}

impl ApiRequest {
    /// Creates a GET request for the given path.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(ApiMethod::Get, path, None)
    }

    /// Creates a POST request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(ApiMethod::Post, path, Some(body))
    }

    fn new(method: ApiMethod, path: impl Into<String>, body: Option<serde_json::Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
            bearer: None,
            attempt: 0,
        }
    }
}

/// A response as seen by the pipeline: status plus parsed JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body parsed as JSON (`null` when the body was empty or
    /// not JSON).
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// Returns true for an authentication-failure response.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Port for transmitting API requests.
///
/// A 401 is a *response*, not an error: the transport only fails for
/// connectivity problems (`Network`, `Timeout`), which are never routed
/// into the refresh coordinator.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Transmits the request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns `Network` or `Timeout` when the request could not
    /// complete.
    async fn send(&self, request: &ApiRequest) -> AuthResult<ApiResponse>;
}
