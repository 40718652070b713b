use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use models::{Profile, User};

use super::keys;
use super::memory::MemorySessionStore;
use super::{SessionError, SessionStore};

const EVENT_CAPACITY: usize = 32;

/// Notifications fanned out to every subscriber of a [`SessionContext`].
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    SignedIn { email: String },
    SignedOut,
    ProfileSaved(Profile),
    OpenSidebar,
}

/// Identity cached at sign-in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionIdentity {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// What identity displays are rebuilt from: the cached profile plus the
/// cached email.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentitySnapshot {
    pub profile: Option<Profile>,
    pub email: Option<String>,
}

/// Typed, injectable handle over a [`SessionStore`].
///
/// Cloning is cheap; clones share the store and the event channel.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { store, events }
    }

    pub fn in_memory() -> Self { Self::new(Arc::new(MemorySessionStore::new())) }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> { self.events.subscribe() }

    pub fn publish(&self, event: SessionEvent) {
        // 没有订阅者时 send 会返回 Err，忽略即可
        if self.events.send(event).is_err() {
            debug!("session event dropped: no subscribers");
        }
    }

    /// Re-read the backing store.
    pub async fn refresh(&self) -> Result<(), SessionError> { self.store.refresh().await }

    pub async fn is_authenticated(&self) -> Result<bool, SessionError> {
        Ok(self.store.get(keys::IS_AUTHENTICATED).await?.as_deref() == Some("true"))
    }

    pub async fn identity(&self) -> Result<SessionIdentity, SessionError> {
        Ok(SessionIdentity {
            id: self.store.get(keys::USER_ID).await?,
            name: self.store.get(keys::USER_NAME).await?,
            email: self.store.get(keys::USER_EMAIL).await?,
        })
    }

    pub async fn sign_in(&self, user: &User) -> Result<(), SessionError> {
        self.store.set(keys::IS_AUTHENTICATED, "true".into()).await?;
        self.store.set(keys::USER_EMAIL, user.email.clone()).await?;
        self.store.set(keys::USER_NAME, user.name.clone()).await?;
        self.store.set(keys::USER_ID, user.id.clone()).await?;
        info!(user_id = %user.id, email = %user.email, "signed_in");
        self.publish(SessionEvent::SignedIn { email: user.email.clone() });
        Ok(())
    }

    /// Drop the auth flag and cached identity. Profile and sidebar settings stay.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.store
            .remove_many(&[keys::IS_AUTHENTICATED, keys::USER_EMAIL, keys::USER_NAME, keys::USER_ID])
            .await?;
        info!("signed_out");
        self.publish(SessionEvent::SignedOut);
        Ok(())
    }

    /// The cached profile; a malformed entry is logged and treated as absent.
    pub async fn cached_profile(&self) -> Result<Option<Profile>, SessionError> {
        self.get_json(keys::USER_PROFILE).await
    }

    pub async fn store_profile(&self, profile: &Profile) -> Result<(), SessionError> {
        self.set_json(keys::USER_PROFILE, profile).await?;
        if !profile.email.trim().is_empty() {
            self.store.set(keys::USER_EMAIL, profile.email.clone()).await?;
        }
        self.publish(SessionEvent::ProfileSaved(profile.clone()));
        Ok(())
    }

    pub async fn snapshot(&self) -> Result<IdentitySnapshot, SessionError> {
        Ok(IdentitySnapshot {
            profile: self.cached_profile().await?,
            email: self.store.get(keys::USER_EMAIL).await?,
        })
    }

    pub async fn sidebar_open(&self) -> Result<bool, SessionError> {
        Ok(self.get_json(keys::SIDEBAR_OPEN).await?.unwrap_or(false))
    }

    pub async fn set_sidebar_open(&self, open: bool) -> Result<(), SessionError> {
        self.set_json(keys::SIDEBAR_OPEN, &open).await
    }

    pub async fn sidebar_collapsed(&self) -> Result<bool, SessionError> {
        Ok(self.get_json(keys::SIDEBAR_COLLAPSED).await?.unwrap_or(false))
    }

    pub async fn set_sidebar_collapsed(&self, collapsed: bool) -> Result<(), SessionError> {
        self.set_json(keys::SIDEBAR_COLLAPSED, &collapsed).await
    }

    /// Read a JSON-encoded value. Unparsable values are logged and read as `None`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                warn!(key, error = %e, "ignoring malformed session value");
                Ok(None)
            }
        }
    }

    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), SessionError> {
        let raw = serde_json::to_string(value).map_err(|e| SessionError::Malformed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.store.set(key, raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::seed::seed_users;

    #[tokio::test]
    async fn sign_in_then_out_keeps_profile() {
        let ctx = SessionContext::in_memory();
        let mut rx = ctx.subscribe();
        assert!(!ctx.is_authenticated().await.unwrap());

        let tj = seed_users().remove(1);
        ctx.sign_in(&tj).await.unwrap();
        assert!(ctx.is_authenticated().await.unwrap());
        let id = ctx.identity().await.unwrap();
        assert_eq!(id.email.as_deref(), Some("tj@example.com"));
        assert_eq!(id.id.as_deref(), Some("2"));
        assert_eq!(rx.recv().await.unwrap(), SessionEvent::SignedIn { email: "tj@example.com".into() });

        let profile = Profile { name: "TJ".into(), ..Profile::derived_from_email("tj@example.com") };
        ctx.store_profile(&profile).await.unwrap();
        ctx.set_sidebar_collapsed(true).await.unwrap();

        ctx.sign_out().await.unwrap();
        assert!(!ctx.is_authenticated().await.unwrap());
        assert_eq!(ctx.identity().await.unwrap(), SessionIdentity::default());
        assert_eq!(ctx.cached_profile().await.unwrap(), Some(profile));
        assert!(ctx.sidebar_collapsed().await.unwrap());
    }

    #[tokio::test]
    async fn malformed_profile_reads_as_none() {
        let ctx = SessionContext::in_memory();
        ctx.store.set(keys::USER_PROFILE, "{broken".into()).await.unwrap();
        assert_eq!(ctx.cached_profile().await.unwrap(), None);
        assert!(!ctx.sidebar_open().await.unwrap());
    }

    #[tokio::test]
    async fn store_profile_with_blank_email_keeps_cached_email() {
        let ctx = SessionContext::in_memory();
        ctx.sign_in(&seed_users().remove(0)).await.unwrap();
        ctx.store_profile(&Profile { name: "Boss".into(), ..Profile::default() }).await.unwrap();
        let snap = ctx.snapshot().await.unwrap();
        assert_eq!(snap.email.as_deref(), Some("admin@example.com"));
        assert_eq!(snap.profile.map(|p| p.name), Some("Boss".to_string()));
    }
}
