//! Shared authentication error taxonomy

use thiserror::Error;

/// Errors surfaced by the session subsystem.
///
/// The enum is `Clone` on purpose: a single refresh outcome is fanned out
/// to every request that was waiting on it, so the error must be cheap to
/// duplicate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The request could not complete (DNS, connection, protocol failure).
    #[error("network error: {message}")]
    Network {
        /// Connectivity description from the transport.
        message: String,
    },

    /// The request did not complete within the transport timeout.
    #[error("request timed out")]
    Timeout,

    /// The backend rejected the credentials (HTTP 401), and recovery was
    /// not possible or not permitted.
    #[error("not authenticated: {message}")]
    Unauthorized {
        /// Backend-supplied detail, if any.
        message: String,
    },

    /// The refresh call itself failed, or no refresh token was stored.
    #[error("token refresh failed: {message}")]
    RefreshFailed {
        /// Failure description.
        message: String,
    },

    /// The stored refresh token is expired by its own claims; no network
    /// call was attempted.
    #[error("refresh token expired")]
    RefreshTokenExpired,

    /// The backend rejected the request payload (HTTP 400-class).
    #[error("validation failed: {message}")]
    Validation {
        /// Backend-supplied message, surfaced as-is.
        message: String,
    },

    /// A server-side failure, or a `success: false` response envelope.
    #[error("API error: {message}")]
    Api {
        /// Backend-supplied message, if any.
        message: String,
    },
}

/// Result type alias for session operations.
pub type AuthResult<T> = Result<T, AuthError>;
