//! Authentication gateway over the backend's `/auth` endpoints.
//!
//! Wire DTOs mirror the backend's camelCase JSON and its
//! `{success, data, message}` envelope.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use warden_application::ports::{ApiRequest, ApiResponse, ApiTransport, AuthGateway, RefreshOutcome};
use warden_domain::{
    AuthError, AuthResult, AuthorizationExtras, Credentials, DeviceInfo, Session, UserProfile,
};

use crate::http::ReqwestTransport;

/// Response envelope for the auth endpoints.
#[derive(Debug, Deserialize)]
struct WireEnvelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUser {
    id: String,
    display_name: String,
    role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    access_token: String,
    refresh_token: String,
    user: WireUser,
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshData {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// `AuthGateway` implementation over the HTTP transport.
pub struct HttpAuthGateway {
    transport: ReqwestTransport,
}

impl HttpAuthGateway {
    /// Creates a gateway using the given transport.
    #[must_use]
    pub const fn new(transport: ReqwestTransport) -> Self {
        Self { transport }
    }

    fn device_json(device: &DeviceInfo) -> serde_json::Value {
        json!({
            "deviceId": device.device_id.to_string(),
            "platform": device.platform,
        })
    }

    /// Unwraps a `{success, data, message}` envelope into its payload.
    fn unwrap_data<T: for<'de> Deserialize<'de>>(response: &ApiResponse) -> AuthResult<T> {
        let envelope: Option<WireEnvelope<T>> =
            serde_json::from_value(response.body.clone()).ok();
        let message = envelope
            .as_ref()
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| "request failed".to_string());

        match response.status {
            200..=299 => match envelope {
                Some(WireEnvelope {
                    success: true,
                    data: Some(data),
                    ..
                }) => Ok(data),
                Some(WireEnvelope { success: true, .. }) | None => Err(AuthError::Api {
                    message: "response envelope was malformed".to_string(),
                }),
                Some(WireEnvelope { success: false, .. }) => Err(AuthError::Api { message }),
            },
            401 => Err(AuthError::Unauthorized { message }),
            400..=499 => Err(AuthError::Validation { message }),
            _ => Err(AuthError::Api { message }),
        }
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, credentials: &Credentials, device: &DeviceInfo) -> AuthResult<Session> {
        let body = json!({
            "username": credentials.username,
            "password": credentials.password,
            "rememberMe": credentials.remember_me,
            "deviceInfo": Self::device_json(device),
        });

        let response = self
            .transport
            .send(&ApiRequest::post("/auth/login", body))
            .await?;
        let data: LoginData = Self::unwrap_data(&response)?;

        Ok(Session {
            access_token: data.access_token,
            refresh_token: data.refresh_token,
            user: UserProfile {
                id: data.user.id,
                display_name: data.user.display_name,
                role: data.user.role,
            },
            extras: AuthorizationExtras {
                sector: data.sector,
                permissions: data.permissions,
            },
        })
    }

    async fn refresh(
        &self,
        refresh_token: &str,
        device: &DeviceInfo,
    ) -> AuthResult<RefreshOutcome> {
        let body = json!({
            "refreshToken": refresh_token,
            "deviceInfo": Self::device_json(device),
        });

        let response = self
            .transport
            .send(&ApiRequest::post("/auth/refresh", body))
            .await?;

        match Self::unwrap_data::<RefreshData>(&response) {
            Ok(data) => Ok(RefreshOutcome {
                access_token: data.access_token,
                refresh_token: data.refresh_token,
            }),
            // Connectivity failures keep their identity; anything the
            // backend rejected is a refresh failure.
            Err(error @ (AuthError::Network { .. } | AuthError::Timeout)) => Err(error),
            Err(error) => Err(AuthError::RefreshFailed {
                message: error.to_string(),
            }),
        }
    }

    async fn logout(&self, refresh_token: &str) -> AuthResult<()> {
        let body = json!({ "refreshToken": refresh_token });
        let response = self
            .transport
            .send(&ApiRequest::post("/auth/logout", body))
            .await?;

        // The response body is ignored; only transport-level success
        // matters to the caller, and even that is best-effort.
        if (200..=299).contains(&response.status) {
            Ok(())
        } else {
            Err(AuthError::Api {
                message: format!("logout rejected with status {}", response.status),
            })
        }
    }
}
