//! Refresh coordination state machine.
//!
//! Collapses every concurrent authentication failure into at most one
//! refresh call. The first caller to observe a 401 becomes the leader:
//! it installs a shared outcome channel, performs the refresh, and
//! publishes the result. Every caller that arrives while the refresh is
//! in flight awaits that same outcome instead of starting another call —
//! a second refresh could invalidate a rotated refresh token and log the
//! user out for no reason.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use warden_domain::{AuthError, AuthResult, DeviceInfo, claims};

use crate::ports::{AuthGateway, Clock, Navigator};
use crate::session::SessionStore;

/// The shared outcome of one refresh cycle, as seen by waiters.
type SharedOutcome = watch::Receiver<Option<AuthResult<String>>>;

/// Coordinator state. `Refreshing` holds the outcome channel every
/// waiter subscribes to; failure is a published outcome, not a resting
/// state, so the coordinator always returns to `Idle` once a cycle
/// settles.
enum RefreshState {
    Idle,
    Refreshing(SharedOutcome),
}

/// Role a caller takes after the check-then-set transition.
enum Role {
    Leader(watch::Sender<Option<AuthResult<String>>>),
    Waiter(SharedOutcome),
}

/// De-duplicates concurrent token refreshes into one shared operation.
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    store: SessionStore,
    gateway: Arc<dyn AuthGateway>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    device: DeviceInfo,
}

impl RefreshCoordinator {
    /// Creates a coordinator in the `Idle` state.
    #[must_use]
    pub fn new(
        store: SessionStore,
        gateway: Arc<dyn AuthGateway>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
        device: DeviceInfo,
    ) -> Self {
        Self {
            state: Mutex::new(RefreshState::Idle),
            store,
            gateway,
            navigator,
            clock,
            device,
        }
    }

    /// Returns an access token obtained by the current refresh cycle,
    /// starting one if none is in flight.
    ///
    /// Callers that observe a refresh already in progress receive the
    /// same outcome as every other waiter. On terminal failure the
    /// session is cleared and the navigator fired exactly once, by the
    /// leader.
    ///
    /// # Errors
    ///
    /// Returns `RefreshTokenExpired` when the stored refresh token is
    /// absent or expired by its own claims (no network call is made), or
    /// the gateway's error when the refresh call itself fails.
    pub async fn refreshed_token(&self) -> AuthResult<String> {
        // The check-then-set must complete before any suspension point;
        // the lock is released before the first await.
        let role = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match &*state {
                RefreshState::Refreshing(outcome) => Role::Waiter(outcome.clone()),
                RefreshState::Idle => {
                    let (tx, rx) = watch::channel(None);
                    *state = RefreshState::Refreshing(rx);
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Waiter(outcome) => Self::await_shared(outcome).await,
            Role::Leader(tx) => self.lead_refresh(tx).await,
        }
    }

    async fn await_shared(mut outcome: SharedOutcome) -> AuthResult<String> {
        tracing::debug!("refresh already in flight, awaiting shared outcome");
        let settled = outcome
            .wait_for(Option::is_some)
            .await
            .map_err(|_| Self::abandoned())?;
        (*settled).clone().unwrap_or_else(|| Err(Self::abandoned()))
    }

    async fn lead_refresh(&self, tx: watch::Sender<Option<AuthResult<String>>>) -> AuthResult<String> {
        let outcome = self.perform_refresh().await;

        if let Err(error) = &outcome {
            tracing::warn!(%error, "token refresh failed, clearing session");
            self.store.clear();
            self.navigator.to_login();
        }

        // Reset before publishing: once waiters wake, a fresh 401 must
        // start a new cycle instead of joining this finished one.
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            *state = RefreshState::Idle;
        }
        let _ = tx.send(Some(outcome.clone()));

        outcome
    }

    async fn perform_refresh(&self) -> AuthResult<String> {
        let Some(refresh_token) = self.store.refresh_token() else {
            return Err(AuthError::RefreshTokenExpired);
        };

        // Local claim check saves a round trip to a backend that would
        // reject the token anyway.
        if claims::is_expired(&refresh_token, self.clock.now()) {
            tracing::warn!("stored refresh token is expired by claim, skipping refresh call");
            return Err(AuthError::RefreshTokenExpired);
        }

        let outcome = self.gateway.refresh(&refresh_token, &self.device).await?;
        self.store
            .update_tokens(&outcome.access_token, outcome.refresh_token.as_deref());
        tracing::info!(
            rotated = outcome.refresh_token.is_some(),
            "access token refreshed"
        );
        Ok(outcome.access_token)
    }

    fn abandoned() -> AuthError {
        AuthError::RefreshFailed {
            message: "refresh operation was abandoned".to_string(),
        }
    }
}
