use std::{collections::BTreeMap, path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};
use tracing::{debug, warn};

use crate::errors::ServiceError;
use super::write_atomic;

/// JSON file-backed key-value map.
///
/// Persists a `BTreeMap<K, V>` as a single JSON object so the file stays
/// stable between writes. A file that fails to parse is logged and treated
/// as empty; the next write replaces it.
pub struct JsonMapStore<K, V> {
    inner: RwLock<BTreeMap<K, V>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Ord + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty map if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: BTreeMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %file_path.display(), error = %e, "unreadable map file; starting empty");
                BTreeMap::new()
            }),
            Err(_) => {
                let empty: BTreeMap<K, V> = BTreeMap::new();
                write_atomic(&file_path, serde_json::to_vec(&empty).map_err(ServiceError::storage)?).await?;
                empty
            }
        };
        debug!(path = %file_path.display(), entries = map.len(), "map store loaded");

        Ok(Arc::new(Self { inner: RwLock::new(map), file_path }))
    }

    async fn save(&self, map: &BTreeMap<K, V>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(map).map_err(ServiceError::storage)?;
        write_atomic(&self.file_path, data).await
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Insert or update a value by key and persist.
    pub async fn insert(&self, key: K, value: V) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        map.insert(key, value);
        self.save(&map).await
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &K) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        let existed = map.remove(key).is_some();
        if existed {
            self.save(&map).await?;
        }
        Ok(existed)
    }

    /// Apply a mutation to the underlying map and persist while holding the write lock.
    pub async fn update_map<F>(&self, f: F) -> Result<(), ServiceError>
    where
        F: FnOnce(&mut BTreeMap<K, V>) -> Result<(), ServiceError>,
    {
        let mut map = self.inner.write().await;
        f(&mut map)?;
        self.save(&map).await
    }

    /// Re-read the file, picking up writes made by another process.
    pub async fn reload(&self) -> Result<(), ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(ServiceError::storage(e)),
        };
        let fresh: BTreeMap<K, V> = if bytes.iter().all(u8::is_ascii_whitespace) {
            BTreeMap::new()
        } else {
            serde_json::from_slice(&bytes).map_err(ServiceError::storage)?
        };
        *self.inner.write().await = fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn json_map_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let store = JsonMapStore::<String, String>::new(&tmp).await?;

        assert_eq!(tokio::fs::read_to_string(&tmp).await?, "{}");

        store.insert("b".into(), "2".into()).await?;
        store.insert("a".into(), "1".into()).await?;
        assert_eq!(store.get(&"a".into()).await.as_deref(), Some("1"));
        let on_disk: BTreeMap<String, String> = serde_json::from_slice(&tokio::fs::read(&tmp).await?)?;
        assert_eq!(on_disk.keys().collect::<Vec<_>>(), vec!["a", "b"]);

        store
            .update_map(|m| {
                if let Some(v) = m.get_mut("a") { *v = "10".into(); }
                Ok(())
            })
            .await?;
        assert_eq!(store.get(&"a".into()).await.as_deref(), Some("10"));

        assert!(store.remove(&"b".into()).await?);
        assert!(!store.remove(&"b".into()).await?);
        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(reloaded.get(&"a".into()).await.as_deref(), Some("10"));
        assert!(reloaded.get(&"b".into()).await.is_none());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_starts_empty_and_reload_sees_other_writer() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        tokio::fs::write(&tmp, b"{not json").await?;
        let store = JsonMapStore::<String, String>::new(&tmp).await?;
        assert!(store.get(&"k".into()).await.is_none());

        let other = JsonMapStore::<String, String>::new(&tmp).await?;
        other.insert("k".into(), "v".into()).await?;
        assert!(store.get(&"k".into()).await.is_none());
        store.reload().await?;
        assert_eq!(store.get(&"k".into()).await.as_deref(), Some("v"));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
