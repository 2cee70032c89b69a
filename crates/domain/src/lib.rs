//! Warden Domain - Core session types
//!
//! This crate defines the domain model for the Warden session client.
//! All types here are pure Rust with no I/O dependencies.

pub mod claims;
pub mod error;
pub mod session;

pub use claims::{ClaimError, Claims, decode, is_expired, remaining_minutes};
pub use error::{AuthError, AuthResult};
pub use session::{AuthorizationExtras, Credentials, DeviceInfo, Session, UserProfile};
