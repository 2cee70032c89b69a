//! API transport implementation using reqwest.
//!
//! Implements the `ApiTransport` port. Connectivity failures map to
//! `Network`/`Timeout`; HTTP error statuses (including 401) come back as
//! ordinary responses for the pipeline to interpret.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use url::Url;
use warden_application::ports::{ApiMethod, ApiRequest, ApiResponse, ApiTransport};
use warden_domain::{AuthError, AuthResult};

use crate::config::ApiConfig;

/// Fixed per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `ApiTransport` implementation over `reqwest::Client`.
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Creates a transport for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns a `Network` error if the underlying client cannot be
    /// constructed.
    pub fn new(config: &ApiConfig) -> AuthResult<Self> {
        let client = Client::builder()
            .user_agent("Warden/0.1.0")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AuthError::Network {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    const fn to_reqwest_method(method: ApiMethod) -> Method {
        match method {
            ApiMethod::Get => Method::GET,
            ApiMethod::Post => Method::POST,
            ApiMethod::Put => Method::PUT,
            ApiMethod::Delete => Method::DELETE,
        }
    }

    /// Resolves a request path against the base URL. Leading slashes are
    /// trimmed so paths always append to the configured prefix.
    fn endpoint(&self, path: &str) -> AuthResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| AuthError::Network {
                message: format!("invalid request URL {path:?}: {e}"),
            })
    }

    /// Maps reqwest errors to the domain taxonomy. Timeouts are kept
    /// distinct from other connectivity failures; neither is an
    /// authentication failure.
    fn map_error(error: &reqwest::Error) -> AuthError {
        if error.is_timeout() {
            return AuthError::Timeout;
        }
        AuthError::Network {
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl ApiTransport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> AuthResult<ApiResponse> {
        let url = self.endpoint(&request.path)?;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url);

        if let Some(bearer) = &request.bearer {
            builder = builder.bearer_auth(bearer);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| Self::map_error(&e))?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| Self::map_error(&e))?;
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn transport() -> ReqwestTransport {
        let config = ApiConfig::new(Url::parse("https://api.example.com/v1").unwrap());
        ReqwestTransport::new(&config).unwrap()
    }

    #[test]
    fn to_reqwest_method_covers_the_verbs() {
        assert_eq!(
            ReqwestTransport::to_reqwest_method(ApiMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestTransport::to_reqwest_method(ApiMethod::Post),
            Method::POST
        );
        assert_eq!(
            ReqwestTransport::to_reqwest_method(ApiMethod::Put),
            Method::PUT
        );
        assert_eq!(
            ReqwestTransport::to_reqwest_method(ApiMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn endpoint_appends_to_the_base_prefix() {
        let url = transport().endpoint("/auth/login").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/auth/login");
    }

    #[test]
    fn endpoint_without_leading_slash_resolves_the_same() {
        let url = transport().endpoint("auth/login").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/auth/login");
    }
}
