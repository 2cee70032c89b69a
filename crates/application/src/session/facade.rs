//! Public session surface.
//!
//! What UI-level collaborators (forms, route guards) consume: login,
//! logout, authentication and role checks. Everything else in the
//! subsystem is reached through this facade or the request pipeline.

use std::sync::Arc;

use warden_domain::{AuthResult, Credentials, DeviceInfo, Session, claims};

use crate::ports::{AuthGateway, Clock};
use crate::session::SessionStore;

/// Aggregated session operations for external collaborators.
pub struct SessionFacade {
    store: SessionStore,
    gateway: Arc<dyn AuthGateway>,
    clock: Arc<dyn Clock>,
    device: DeviceInfo,
}

impl SessionFacade {
    /// Creates a facade over the store and gateway.
    #[must_use]
    pub fn new(
        store: SessionStore,
        gateway: Arc<dyn AuthGateway>,
        clock: Arc<dyn Clock>,
        device: DeviceInfo,
    ) -> Self {
        Self {
            store,
            gateway,
            clock,
            device,
        }
    }

    /// Performs the network login and persists the resulting session.
    ///
    /// # Errors
    ///
    /// Surfaces the gateway's error as-is; nothing is persisted on
    /// failure.
    pub async fn login(&self, credentials: &Credentials) -> AuthResult<Session> {
        let session = self.gateway.login(credentials, &self.device).await?;
        self.store.save(&session);
        tracing::info!(user = %session.user.id, "login succeeded, session persisted");
        Ok(session)
    }

    /// Logs out: best-effort server-side invalidation of the refresh
    /// token, then an unconditional local clear.
    ///
    /// The network call failing never blocks logout — an unreachable
    /// server must not keep a user logged in.
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.store.refresh_token()
            && let Err(error) = self.gateway.logout(&refresh_token).await
        {
            tracing::warn!(%error, "server-side logout failed, clearing local session anyway");
        }
        self.store.clear();
        tracing::info!("session cleared");
    }

    /// Returns true when a stored, unexpired session exists.
    ///
    /// Self-healing: a stored session whose access token is expired (or
    /// undecodable) is cleared as a side effect.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        let Some(access_token) = self.store.access_token() else {
            return false;
        };
        if claims::is_expired(&access_token, self.clock.now()) {
            tracing::debug!("stored access token is expired, clearing session");
            self.store.clear();
            return false;
        }
        true
    }

    /// Returns true when the stored user's role equals `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.store.load().is_some_and(|s| s.user.role == role)
    }

    /// Returns true when the stored user's role is one of `roles`.
    #[must_use]
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        self.store
            .load()
            .is_some_and(|s| roles.contains(&s.user.role.as_str()))
    }
}
