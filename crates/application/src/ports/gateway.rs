//! Authentication gateway port

use async_trait::async_trait;
use warden_domain::{AuthResult, Credentials, DeviceInfo, Session};

/// Result of a successful token refresh.
///
/// The rotated refresh token is optional: some backends rotate on every
/// refresh, others keep the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// The new access token.
    pub access_token: String,
    /// A rotated refresh token, when the backend issued one.
    pub refresh_token: Option<String>,
}

/// Port for the backend authentication endpoints.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchanges credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns the backend failure as-is (`Unauthorized` for rejected
    /// credentials, `Validation` for malformed payloads, `Network` or
    /// `Timeout` for connectivity failures).
    async fn login(&self, credentials: &Credentials, device: &DeviceInfo) -> AuthResult<Session>;

    /// Exchanges a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns `RefreshFailed` when the backend rejects the token, or a
    /// connectivity error when the call cannot complete.
    async fn refresh(&self, refresh_token: &str, device: &DeviceInfo)
    -> AuthResult<RefreshOutcome>;

    /// Invalidates a refresh token server-side.
    ///
    /// # Errors
    ///
    /// Returns a connectivity or backend error; callers treat this call
    /// as best-effort and never let a failure block local logout.
    async fn logout(&self, refresh_token: &str) -> AuthResult<()>;
}
