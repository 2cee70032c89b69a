//! Persistent session store.
//!
//! Owns the single persisted [`Session`]: four fixed keys in the injected
//! key-value storage, written on login or refresh and removed as a unit
//! on logout or terminal refresh failure.

use std::sync::Arc;

use warden_domain::{AuthorizationExtras, Session, UserProfile};

use crate::ports::KeyValueStorage;

const KEY_ACCESS_TOKEN: &str = "warden.access_token";
const KEY_REFRESH_TOKEN: &str = "warden.refresh_token";
const KEY_USER: &str = "warden.user";
const KEY_EXTRAS: &str = "warden.extras";

/// Store for the persisted session bundle.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionStore {
    /// Creates a store over the given storage port.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Persists the session under the fixed keys.
    ///
    /// Both serialized records are produced before anything is written,
    /// so a serialization failure never leaves a half-written session.
    pub fn save(&self, session: &Session) {
        let (Ok(user), Ok(extras)) = (
            serde_json::to_string(&session.user),
            serde_json::to_string(&session.extras),
        ) else {
            tracing::error!("session could not be serialized, nothing persisted");
            return;
        };

        self.storage.set(KEY_ACCESS_TOKEN, &session.access_token);
        self.storage.set(KEY_REFRESH_TOKEN, &session.refresh_token);
        self.storage.set(KEY_USER, &user);
        self.storage.set(KEY_EXTRAS, &extras);
    }

    /// Loads the persisted session, if a usable one exists.
    ///
    /// A corrupted user record makes the session unusable: the entry is
    /// removed as a repair side effect and `None` is returned. Corrupted
    /// or missing extras are repaired to their defaults; the session
    /// itself survives.
    #[must_use]
    pub fn load(&self) -> Option<Session> {
        let access_token = self.storage.get(KEY_ACCESS_TOKEN)?;
        let refresh_token = self.storage.get(KEY_REFRESH_TOKEN)?;
        let raw_user = self.storage.get(KEY_USER)?;

        let user: UserProfile = match serde_json::from_str(&raw_user) {
            Ok(user) => user,
            Err(error) => {
                tracing::warn!(%error, "stored user record is corrupted, removing it");
                self.storage.remove(KEY_USER);
                return None;
            }
        };

        let extras = self
            .storage
            .get(KEY_EXTRAS)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(extras) => Some(extras),
                Err(error) => {
                    tracing::warn!(%error, "stored extras record is corrupted, removing it");
                    self.storage.remove(KEY_EXTRAS);
                    None
                }
            })
            .unwrap_or_else(AuthorizationExtras::default);

        Some(Session {
            access_token,
            refresh_token,
            user,
            extras,
        })
    }

    /// Removes every session key. Partial clears are not permitted.
    pub fn clear(&self) {
        self.storage.remove(KEY_ACCESS_TOKEN);
        self.storage.remove(KEY_REFRESH_TOKEN);
        self.storage.remove(KEY_USER);
        self.storage.remove(KEY_EXTRAS);
    }

    /// Returns the stored access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.storage.get(KEY_ACCESS_TOKEN)
    }

    /// Returns the stored refresh token, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.storage.get(KEY_REFRESH_TOKEN)
    }

    /// Writes a refreshed access token, rotating the refresh token when
    /// the backend issued a new one. The two writes happen back to back
    /// with no suspension point between them.
    pub fn update_tokens(&self, access_token: &str, rotated_refresh: Option<&str>) {
        self.storage.set(KEY_ACCESS_TOKEN, access_token);
        if let Some(refresh) = rotated_refresh {
            self.storage.set(KEY_REFRESH_TOKEN, refresh);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::MemoryStorage;

    fn sample_session() -> Session {
        Session {
            access_token: "access-1".to_string(),
            refresh_token: "refresh-1".to_string(),
            user: UserProfile {
                id: "u-1".to_string(),
                display_name: "Ada".to_string(),
                role: "ADMIN".to_string(),
            },
            extras: AuthorizationExtras {
                sector: Some("north".to_string()),
                permissions: vec!["screens:write".to_string()],
            },
        }
    }

    fn store() -> (Arc<MemoryStorage>, SessionStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(Arc::clone(&storage) as Arc<dyn KeyValueStorage>);
        (storage, store)
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_, store) = store();
        let session = sample_session();
        store.save(&session);
        assert_eq!(store.load(), Some(session));
    }

    #[test]
    fn load_returns_none_when_empty() {
        let (_, store) = store();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn corrupted_user_is_repaired_and_session_absent() {
        let (storage, store) = store();
        store.save(&sample_session());
        storage.set("warden.user", "{not json");

        assert_eq!(store.load(), None);
        assert_eq!(storage.get("warden.user"), None);
    }

    #[test]
    fn corrupted_extras_fall_back_to_defaults() {
        let (storage, store) = store();
        store.save(&sample_session());
        storage.set("warden.extras", "][");

        let loaded = store.load().unwrap();
        assert_eq!(loaded.extras, AuthorizationExtras::default());
        assert_eq!(storage.get("warden.extras"), None);
    }

    #[test]
    fn clear_removes_every_key() {
        let (storage, store) = store();
        store.save(&sample_session());
        store.clear();
        assert!(storage.is_empty());
    }

    #[test]
    fn update_tokens_keeps_refresh_unless_rotated() {
        let (_, store) = store();
        store.save(&sample_session());

        store.update_tokens("access-2", None);
        assert_eq!(store.access_token().as_deref(), Some("access-2"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-1"));

        store.update_tokens("access-3", Some("refresh-2"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-2"));
    }
}
