use std::{path::PathBuf, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use models::{Record, User};

use crate::errors::ServiceError;
use super::write_atomic;

/// An item kept in a [`JsonCollectionStore`], addressed by a string id.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name used in logs and error messages.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

impl Resource for Record {
    const COLLECTION: &'static str = "records";
    fn id(&self) -> &str { &self.id }
}

impl Resource for User {
    const COLLECTION: &'static str = "users";
    fn id(&self) -> &str { &self.id }
}

/// Ordered JSON-array collection persisted to one file.
///
/// Insertion order is preserved, so listing returns records in the order
/// they were created.
pub struct JsonCollectionStore<T> {
    inner: RwLock<Vec<T>>,
    file_path: PathBuf,
}

impl<T: Resource> JsonCollectionStore<T> {
    /// Open the collection, creating an empty file if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        Self::open(path.into(), Vec::new()).await
    }

    /// Open the collection; when the file is missing or holds no items, start from `seed`.
    pub async fn new_seeded<P: Into<PathBuf>>(path: P, seed: Vec<T>) -> Result<Arc<Self>, ServiceError> {
        Self::open(path.into(), seed).await
    }

    async fn open(file_path: PathBuf, seed: Vec<T>) -> Result<Arc<Self>, ServiceError> {
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let existing: Vec<T> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                warn!(collection = T::COLLECTION, path = %file_path.display(), error = %e, "collection file is not a JSON array");
                ServiceError::storage(e)
            })?,
            Err(_) => Vec::new(),
        };

        let store = Self { inner: RwLock::new(Vec::new()), file_path };
        let items = if existing.is_empty() && !seed.is_empty() {
            info!(collection = T::COLLECTION, count = seed.len(), "seeding empty collection");
            seed
        } else {
            existing
        };
        store.save(&items).await?;
        debug!(collection = T::COLLECTION, count = items.len(), "collection loaded");
        *store.inner.write().await = items;
        Ok(Arc::new(store))
    }

    async fn save(&self, items: &[T]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(items).map_err(ServiceError::storage)?;
        write_atomic(&self.file_path, data).await
    }

    /// All items in insertion order.
    pub async fn list(&self) -> Vec<T> {
        self.inner.read().await.clone()
    }

    /// Items matching a predicate, in insertion order.
    pub async fn find<F>(&self, pred: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.inner.read().await.iter().filter(|t| pred(t)).cloned().collect()
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        self.inner.read().await.iter().find(|t| t.id() == id).cloned()
    }

    /// An id not yet used in this collection.
    pub async fn fresh_id(&self) -> String {
        let items = self.inner.read().await;
        loop {
            let candidate = Uuid::new_v4().simple().to_string()[..8].to_string();
            if !items.iter().any(|t| t.id() == candidate) {
                return candidate;
            }
        }
    }

    /// Append a new item. Fails with `Conflict` when the id is taken.
    pub async fn insert(&self, item: T) -> Result<T, ServiceError> {
        let mut items = self.inner.write().await;
        if items.iter().any(|t| t.id() == item.id()) {
            return Err(ServiceError::Conflict(format!("{} id '{}' already exists", T::COLLECTION, item.id())));
        }
        items.push(item.clone());
        self.save(&items).await?;
        Ok(item)
    }

    /// Replace the item stored under `id` in place.
    pub async fn replace(&self, id: &str, item: T) -> Result<T, ServiceError> {
        let mut items = self.inner.write().await;
        let slot = items
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or_else(|| ServiceError::not_found(T::COLLECTION))?;
        *slot = item.clone();
        self.save(&items).await?;
        Ok(item)
    }

    /// Remove by id and persist; returns whether it existed.
    pub async fn remove(&self, id: &str) -> Result<bool, ServiceError> {
        let mut items = self.inner.write().await;
        let before = items.len();
        items.retain(|t| t.id() != id);
        let existed = items.len() != before;
        if existed {
            self.save(&items).await?;
        }
        Ok(existed)
    }
}
