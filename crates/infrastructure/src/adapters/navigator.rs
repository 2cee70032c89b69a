//! Navigation adapter for headless consumers

use warden_application::ports::Navigator;

/// `Navigator` that records the redirect as a tracing event.
///
/// The headless binary has no login screen to navigate to; front ends
/// embedding the core supply their own `Navigator` implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNavigator;

impl TracingNavigator {
    /// Creates the navigator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Navigator for TracingNavigator {
    fn to_login(&self) {
        tracing::warn!("session ended, user must log in again");
    }
}
