//! Session bundle and login types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated identity bundle.
///
/// Exactly one `Session` is persisted at a time; it is written on login or
/// refresh and erased on logout or terminal refresh failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived bearer credential attached to API calls.
    pub access_token: String,
    /// Longer-lived credential exchanged for new access tokens.
    pub refresh_token: String,
    /// Profile of the authenticated user.
    pub user: UserProfile,
    /// Authorization extras granted at login.
    pub extras: AuthorizationExtras,
}

impl Session {
    /// Replaces the access token, and the refresh token when the backend
    /// rotated it. Rotation is opportunistic; an absent rotated token
    /// keeps the previous one.
    #[must_use]
    pub fn with_tokens(mut self, access_token: String, rotated_refresh: Option<String>) -> Self {
        self.access_token = access_token;
        if let Some(refresh) = rotated_refresh {
            self.refresh_token = refresh;
        }
        self
    }
}

/// Profile record of the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend identifier.
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Role name used by the facade's role checks.
    pub role: String,
}

/// Authorization extras carried alongside the user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AuthorizationExtras {
    /// Sector or scope the session is bound to, if any.
    #[serde(default)]
    pub sector: Option<String>,
    /// Permission set granted at login.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Login credentials supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
    /// Whether the backend should issue a long-lived refresh token.
    pub remember_me: bool,
}

impl Credentials {
    /// Creates credentials without the remember-me flag.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            remember_me: false,
        }
    }

    /// Sets the remember-me flag.
    #[must_use]
    pub const fn remembered(mut self) -> Self {
        self.remember_me = true;
        self
    }
}

/// Device descriptor sent with login and refresh calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Stable identifier for this client instance.
    pub device_id: Uuid,
    /// Platform label (e.g. operating system name).
    pub platform: String,
}

impl DeviceInfo {
    /// Creates a device descriptor with a fresh v7 identifier.
    #[must_use]
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            device_id: Uuid::now_v7(),
            platform: platform.into(),
        }
    }
}
