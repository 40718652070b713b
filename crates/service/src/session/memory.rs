use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SessionError, SessionStore};

/// Process-local session; gone when the process exits.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.inner.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), SessionError> {
        self.inner.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.inner.write().await.remove(key);
        Ok(())
    }
}
