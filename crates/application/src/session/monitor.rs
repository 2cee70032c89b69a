//! Background session expiration monitor.
//!
//! A low-frequency task that re-validates the stored session and pushes
//! signals to whoever is listening. It never navigates and never clears
//! the store — consumers decide what an expired session means for them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use warden_domain::claims;

use crate::ports::Clock;
use crate::session::SessionStore;

/// How often the stored session is re-validated.
const CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Near-expiry warnings are evaluated on every Nth validation tick.
const WARNING_CADENCE_TICKS: u64 = 2;

/// Remaining minutes at or below which a near-expiry warning fires.
const NEAR_EXPIRY_THRESHOLD_MINUTES: i64 = 5;

/// Push-style signals emitted by the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    /// A previously authenticated session is no longer valid.
    Expired,
    /// The access token expires soon but is still valid.
    NearExpiry {
        /// Whole minutes until expiry (positive, at most the threshold).
        minutes_left: i64,
    },
}

/// Cancellable background monitor over the session store.
///
/// Stopped explicitly via [`SessionMonitor::stop`] or implicitly on drop,
/// so a consumer tearing down cannot leak the periodic task.
pub struct SessionMonitor {
    handle: Option<JoinHandle<()>>,
}

impl SessionMonitor {
    /// Starts monitoring with the default interval.
    #[must_use]
    pub fn start(
        store: SessionStore,
        clock: Arc<dyn Clock>,
        signals: mpsc::UnboundedSender<SessionSignal>,
    ) -> Self {
        Self::start_with_interval(store, clock, signals, CHECK_INTERVAL)
    }

    /// Starts monitoring with a custom validation interval.
    #[must_use]
    pub fn start_with_interval(
        store: SessionStore,
        clock: Arc<dyn Clock>,
        signals: mpsc::UnboundedSender<SessionSignal>,
        period: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; use it to take the
            // baseline instead of signalling.
            ticker.tick().await;
            let mut was_authenticated = session_is_valid(&store, clock.as_ref());
            let mut tick: u64 = 0;

            loop {
                ticker.tick().await;
                tick += 1;

                let authenticated = session_is_valid(&store, clock.as_ref());
                if was_authenticated && !authenticated {
                    tracing::info!("monitored session expired");
                    if signals.send(SessionSignal::Expired).is_err() {
                        break;
                    }
                }
                was_authenticated = authenticated;

                if authenticated
                    && tick.is_multiple_of(WARNING_CADENCE_TICKS)
                    && let Some(minutes_left) = minutes_until_expiry(&store, clock.as_ref())
                    && minutes_left > 0
                    && minutes_left <= NEAR_EXPIRY_THRESHOLD_MINUTES
                {
                    tracing::debug!(minutes_left, "session nearing expiry");
                    if signals
                        .send(SessionSignal::NearExpiry { minutes_left })
                        .is_err()
                    {
                        break;
                    }
                }
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    /// Returns true while the monitoring task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancels the monitoring task.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for SessionMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Absent, malformed, and expired sessions all count as invalid.
fn session_is_valid(store: &SessionStore, clock: &dyn Clock) -> bool {
    store
        .access_token()
        .is_some_and(|token| !claims::is_expired(&token, clock.now()))
}

fn minutes_until_expiry(store: &SessionStore, clock: &dyn Clock) -> Option<i64> {
    store
        .access_token()
        .map(|token| claims::remaining_minutes(&token, clock.now()))
}
