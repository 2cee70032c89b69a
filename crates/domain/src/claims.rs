//! Unverified bearer-token claim inspection.
//!
//! Decodes the payload segment of a `.`-joined base64url token (the
//! standard JWT shape) without verifying its signature. This answers
//! "what does the token claim", never "is the token trustworthy" — the
//! backend independently rejects expired or forged tokens. Any token that
//! cannot be decoded is treated as already expired (fail closed).

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Claims embedded in a bearer token payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Claims {
    /// Subject the token was issued to.
    #[serde(default, rename = "sub")]
    pub subject: Option<String>,
    /// Expiry instant as seconds since the Unix epoch.
    #[serde(default, rename = "exp")]
    pub expires_at: Option<i64>,
}

/// Failure to decode a token's claims.
///
/// Never surfaced across the public session API; expiry checks collapse
/// every variant into "expired".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimError {
    /// The token is not composed of three `.`-joined segments.
    #[error("token is not a three-segment bearer token")]
    MalformedToken,

    /// The payload segment is not valid base64url.
    #[error("payload segment is not valid base64url: {0}")]
    InvalidEncoding(String),

    /// The decoded payload is not a valid claims record.
    #[error("payload is not a valid claims record: {0}")]
    InvalidPayload(String),
}

/// Decodes the unverified claims of a bearer token.
///
/// The payload alphabet is normalized to base64url and padding is
/// stripped before decoding, so tokens minted with either base64 alphabet
/// are accepted.
///
/// # Errors
///
/// Returns a [`ClaimError`] if the token shape, encoding, or payload JSON
/// is invalid.
pub fn decode(token: &str) -> Result<Claims, ClaimError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(ClaimError::MalformedToken);
    };

    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD
        .decode(normalized)
        .map_err(|e| ClaimError::InvalidEncoding(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| ClaimError::InvalidPayload(e.to_string()))
}

/// Returns true if the token is expired at `now`.
///
/// A token that cannot be decoded, or that carries no expiry claim, counts
/// as expired.
#[must_use]
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    match decode(token) {
        Ok(Claims {
            expires_at: Some(exp),
            ..
        }) => now.timestamp() >= exp,
        _ => true,
    }
}

/// Whole minutes remaining until the token expires, clamped to zero.
///
/// Missing or undecodable tokens yield zero.
#[must_use]
pub fn remaining_minutes(token: &str, now: DateTime<Utc>) -> i64 {
    match decode(token) {
        Ok(Claims {
            expires_at: Some(exp),
            ..
        }) => ((exp - now.timestamp()) / 60).max(0),
        _ => 0,
    }
}
