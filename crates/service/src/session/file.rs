use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tracing::debug;

use crate::storage::json_map_store::JsonMapStore;

use super::{SessionError, SessionStore};

/// Session persisted as a flat JSON object on disk, surviving restarts the
/// way browser local storage does.
pub struct FileSessionStore {
    map: Arc<JsonMapStore<String, String>>,
}

impl FileSessionStore {
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, SessionError> {
        let path = path.into();
        debug!(path = %path.display(), "opening session file");
        Ok(Self { map: JsonMapStore::new(path).await? })
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.map.get(&key.to_string()).await)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), SessionError> {
        Ok(self.map.insert(key.to_string(), value).await?)
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.map.remove(&key.to_string()).await?;
        Ok(())
    }

    /// One write for all keys, so a reader in another process never sees a
    /// half-cleared session.
    async fn remove_many(&self, keys: &[&str]) -> Result<(), SessionError> {
        self.map
            .update_map(|m| {
                for key in keys {
                    m.remove(*key);
                }
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn refresh(&self) -> Result<(), SessionError> { Ok(self.map.reload().await?) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::keys;

    #[tokio::test]
    async fn values_survive_reopen() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("session_{}.json", uuid::Uuid::new_v4()));
        let store = FileSessionStore::open(&tmp).await?;
        store.set(keys::USER_EMAIL, "tj@example.com".into()).await?;
        store.set(keys::IS_AUTHENTICATED, "true".into()).await?;
        store.remove(keys::IS_AUTHENTICATED).await?;

        let again = FileSessionStore::open(&tmp).await?;
        assert_eq!(again.get(keys::USER_EMAIL).await?.as_deref(), Some("tj@example.com"));
        assert_eq!(again.get(keys::IS_AUTHENTICATED).await?, None);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn sign_out_clears_identity_in_one_write() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("session_{}.json", uuid::Uuid::new_v4()));
        let ctx = crate::session::SessionContext::new(Arc::new(FileSessionStore::open(&tmp).await?));
        ctx.sign_in(&models::seed::seed_users().remove(0)).await?;
        ctx.set_sidebar_open(true).await?;

        ctx.sign_out().await?;
        let on_disk: std::collections::BTreeMap<String, String> =
            serde_json::from_slice(&tokio::fs::read(&tmp).await?)?;
        assert_eq!(on_disk.keys().collect::<Vec<_>>(), vec![keys::SIDEBAR_OPEN]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
