//! Authenticated request pipeline.
//!
//! Every outbound call passes through [`ApiClient::execute`]: the current
//! access token is stamped as a bearer credential, the response envelope
//! is unwrapped, and a 401 is recovered from by asking the
//! [`RefreshCoordinator`] for a token and retrying the call exactly once.
//! Callers only ever see success or a final failure; a recovered 401 is
//! invisible to them.

mod refresh;

pub use refresh::RefreshCoordinator;

use std::sync::Arc;

use serde::Deserialize;
use warden_domain::{AuthError, AuthResult};

use crate::ports::{ApiRequest, ApiResponse, ApiTransport};
use crate::session::SessionStore;

/// The backend's response envelope. A `success: false` envelope is a
/// domain error even on HTTP 200.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    message: Option<String>,
}

/// Authenticated API client: bearer stamping plus 401 recovery.
pub struct ApiClient {
    transport: Arc<dyn ApiTransport>,
    store: SessionStore,
    coordinator: Arc<RefreshCoordinator>,
}

impl ApiClient {
    /// Creates a client over the given transport, store, and coordinator.
    #[must_use]
    pub fn new(
        transport: Arc<dyn ApiTransport>,
        store: SessionStore,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            transport,
            store,
            coordinator,
        }
    }

    /// Executes a request and returns the envelope's `data` payload.
    ///
    /// On a first 401 the request waits for the (possibly shared) token
    /// refresh and is retried once with the new token. A 401 on the
    /// retried request is terminal and never re-enters the coordinator.
    ///
    /// # Errors
    ///
    /// Returns `Network`/`Timeout` for connectivity failures,
    /// `Validation` for 400-class rejections, `Api` for server failures
    /// or `success: false` envelopes, `Unauthorized` when authentication
    /// could not be recovered, and the coordinator's error when the
    /// refresh itself failed.
    pub async fn execute(&self, request: ApiRequest) -> AuthResult<serde_json::Value> {
        let mut request = request;
        request.bearer = self.store.access_token();

        let response = self.transport.send(&request).await?;
        if !response.is_unauthorized() {
            return Self::unwrap_envelope(&response);
        }

        if request.attempt > 0 {
            // Single-retry guarantee: a request that already went through
            // one refresh cycle surfaces its failure to the caller.
            return Err(AuthError::Unauthorized {
                message: "request was rejected again after a token refresh".to_string(),
            });
        }

        tracing::debug!(path = %request.path, "authentication failure, entering refresh path");
        let token = self.coordinator.refreshed_token().await?;

        request.attempt += 1;
        request.bearer = Some(token);
        let retried = self.transport.send(&request).await?;
        if retried.is_unauthorized() {
            return Err(AuthError::Unauthorized {
                message: "request was rejected again after a token refresh".to_string(),
            });
        }
        Self::unwrap_envelope(&retried)
    }

    fn unwrap_envelope(response: &ApiResponse) -> AuthResult<serde_json::Value> {
        let envelope: Option<Envelope> = serde_json::from_value(response.body.clone()).ok();

        match response.status {
            200..=299 => match envelope {
                Some(Envelope {
                    success: true,
                    data,
                    ..
                }) => Ok(data),
                Some(Envelope {
                    success: false,
                    message,
                    ..
                }) => Err(AuthError::Api {
                    message: message.unwrap_or_else(|| "request failed".to_string()),
                }),
                None => Err(AuthError::Api {
                    message: "response envelope was malformed".to_string(),
                }),
            },
            400..=499 => Err(AuthError::Validation {
                message: envelope
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "request was rejected by the backend".to_string()),
            }),
            _ => Err(AuthError::Api {
                message: envelope
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "backend failure".to_string()),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use warden_domain::{
        AuthorizationExtras, Credentials, DeviceInfo, Session, UserProfile,
    };

    use super::*;
    use crate::ports::{AuthGateway, Clock, KeyValueStorage, Navigator, RefreshOutcome};
    use crate::testing::{MemoryStorage, MockClock, RecordingNavigator};

    const FRESH_ACCESS: &str = "fresh-access";

    fn token_expiring_at(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
        let body = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#).as_bytes());
        format!("{header}.{body}.sig")
    }

    /// Transport that 401s any bearer other than `FRESH_ACCESS`.
    struct StubTransport {
        sends: AtomicUsize,
    }

    #[async_trait]
    impl ApiTransport for StubTransport {
        async fn send(&self, request: &ApiRequest) -> AuthResult<ApiResponse> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            if request.bearer.as_deref() == Some(FRESH_ACCESS) {
                Ok(ApiResponse {
                    status: 200,
                    body: json!({"success": true, "data": {"ok": true}, "message": null}),
                })
            } else {
                Ok(ApiResponse {
                    status: 401,
                    body: json!({"success": false, "data": null, "message": "expired"}),
                })
            }
        }
    }

    /// Gateway whose refresh yields `FRESH_ACCESS` after a short pause,
    /// so concurrent failures overlap one refresh cycle.
    struct CountingGateway {
        refresh_calls: AtomicUsize,
    }

    #[async_trait]
    impl AuthGateway for CountingGateway {
        async fn login(&self, _: &Credentials, _: &DeviceInfo) -> AuthResult<Session> {
            panic!("login is not exercised by these tests");
        }

        async fn refresh(&self, _: &str, _: &DeviceInfo) -> AuthResult<RefreshOutcome> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(RefreshOutcome {
                access_token: FRESH_ACCESS.to_string(),
                refresh_token: None,
            })
        }

        async fn logout(&self, _: &str) -> AuthResult<()> {
            Ok(())
        }
    }

    struct Fixture {
        client: ApiClient,
        transport: Arc<StubTransport>,
        gateway: Arc<CountingGateway>,
        navigator: Arc<RecordingNavigator>,
    }

    fn fixture(stored_refresh_exp: i64) -> Fixture {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(Arc::clone(&storage) as Arc<dyn KeyValueStorage>);
        store.save(&Session {
            // Access token expired 10 minutes before the mock clock.
            access_token: token_expiring_at(400),
            refresh_token: token_expiring_at(stored_refresh_exp),
            user: UserProfile {
                id: "u-1".to_string(),
                display_name: "Ada".to_string(),
                role: "ADMIN".to_string(),
            },
            extras: AuthorizationExtras::default(),
        });

        let transport = Arc::new(StubTransport {
            sends: AtomicUsize::new(0),
        });
        let gateway = Arc::new(CountingGateway {
            refresh_calls: AtomicUsize::new(0),
        });
        let navigator = Arc::new(RecordingNavigator::new());
        let clock = Arc::new(MockClock::at(Utc.timestamp_opt(1_000, 0).single().unwrap()));

        let coordinator = Arc::new(RefreshCoordinator::new(
            store.clone(),
            Arc::clone(&gateway) as Arc<dyn AuthGateway>,
            Arc::clone(&navigator) as Arc<dyn Navigator>,
            Arc::clone(&clock) as Arc<dyn Clock>,
            DeviceInfo::new("test"),
        ));
        let client = ApiClient::new(
            Arc::clone(&transport) as Arc<dyn ApiTransport>,
            store,
            coordinator,
        );
        Fixture {
            client,
            transport,
            gateway,
            navigator,
        }
    }

    #[tokio::test]
    async fn recovered_401_is_invisible_to_the_caller() {
        // Refresh token has days of validity left.
        let fx = fixture(200_000);

        let data = fx.client.execute(ApiRequest::get("/screens")).await.unwrap();

        assert_eq!(data, json!({"ok": true}));
        // Original send, then one retry.
        assert_eq!(fx.transport.sends.load(Ordering::SeqCst), 2);
        assert_eq!(fx.gateway.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn five_concurrent_failures_share_one_refresh() {
        let fx = fixture(200_000);

        let (a, b, c, d, e) = tokio::join!(
            fx.client.execute(ApiRequest::get("/screens")),
            fx.client.execute(ApiRequest::get("/messages")),
            fx.client.execute(ApiRequest::get("/stats")),
            fx.client.execute(ApiRequest::get("/history")),
            fx.client.execute(ApiRequest::get("/config")),
        );

        for result in [a, b, c, d, e] {
            assert_eq!(result.unwrap(), json!({"ok": true}));
        }
        assert_eq!(fx.gateway.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_refresh_token_makes_failure_terminal() {
        // Refresh token expired before the mock clock's 1_000s.
        let fx = fixture(500);

        let result = fx.client.execute(ApiRequest::get("/screens")).await;

        assert_eq!(result, Err(AuthError::RefreshTokenExpired));
        assert_eq!(fx.gateway.refresh_calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.navigator.redirects(), 1);
    }

    #[tokio::test]
    async fn retried_request_never_reenters_the_coordinator() {
        let fx = fixture(200_000);

        // Simulate a request that already consumed its retry.
        let mut request = ApiRequest::get("/screens");
        request.attempt = 1;
        let result = fx.client.execute(request).await;

        assert!(matches!(result, Err(AuthError::Unauthorized { .. })));
        assert_eq!(fx.gateway.refresh_calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.transport.sends.load(Ordering::SeqCst), 1);
    }

    struct CannedTransport {
        response: ApiResponse,
    }

    #[async_trait]
    impl ApiTransport for CannedTransport {
        async fn send(&self, _: &ApiRequest) -> AuthResult<ApiResponse> {
            Ok(self.response.clone())
        }
    }

    fn canned_client(response: ApiResponse) -> ApiClient {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(Arc::clone(&storage) as Arc<dyn KeyValueStorage>);
        let gateway = Arc::new(CountingGateway {
            refresh_calls: AtomicUsize::new(0),
        });
        let navigator = Arc::new(RecordingNavigator::new());
        let clock = Arc::new(MockClock::at(Utc.timestamp_opt(0, 0).single().unwrap()));
        let coordinator = Arc::new(RefreshCoordinator::new(
            store.clone(),
            gateway as Arc<dyn AuthGateway>,
            navigator as Arc<dyn Navigator>,
            clock as Arc<dyn Clock>,
            DeviceInfo::new("test"),
        ));
        ApiClient::new(
            Arc::new(CannedTransport { response }) as Arc<dyn ApiTransport>,
            store,
            coordinator,
        )
    }

    #[tokio::test]
    async fn success_false_envelope_is_an_api_error_even_on_200() {
        let client = canned_client(ApiResponse {
            status: 200,
            body: json!({"success": false, "data": null, "message": "quota exceeded"}),
        });

        let result = client.execute(ApiRequest::get("/stats")).await;

        assert_eq!(
            result,
            Err(AuthError::Api {
                message: "quota exceeded".to_string()
            })
        );
    }

    #[tokio::test]
    async fn backend_validation_message_is_surfaced() {
        let client = canned_client(ApiResponse {
            status: 400,
            body: json!({"success": false, "data": null, "message": "name is required"}),
        });

        let result = client.execute(ApiRequest::post("/screens", json!({}))).await;

        assert_eq!(
            result,
            Err(AuthError::Validation {
                message: "name is required".to_string()
            })
        );
    }

    #[tokio::test]
    async fn server_failure_maps_to_api_error() {
        let client = canned_client(ApiResponse {
            status: 503,
            body: serde_json::Value::Null,
        });

        let result = client.execute(ApiRequest::get("/stats")).await;

        assert_eq!(
            result,
            Err(AuthError::Api {
                message: "backend failure".to_string()
            })
        );
    }
}
