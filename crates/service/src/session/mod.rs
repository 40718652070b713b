//! Session state: the authentication flag, cached identity, cached profile
//! and sidebar preferences.
//!
//! [`SessionStore`] is the raw string key-value seam (file or memory);
//! [`SessionContext`] is the typed view the rest of the crate talks to.

pub mod context;
pub mod file;
pub mod memory;
pub mod watch;

use async_trait::async_trait;
use thiserror::Error;

use crate::errors::ServiceError;

pub use context::{SessionContext, SessionEvent, SessionIdentity};
pub use file::FileSessionStore;
pub use memory::MemorySessionStore;
pub use watch::{IdentityFeed, PollingFeed, PushFeed};

/// Keys as they appear in the session file.
pub mod keys {
    pub const IS_AUTHENTICATED: &str = "isAuthenticated";
    pub const USER_EMAIL: &str = "userEmail";
    pub const USER_NAME: &str = "userName";
    pub const USER_ID: &str = "userId";
    pub const USER_PROFILE: &str = "userProfile";
    pub const SIDEBAR_OPEN: &str = "sidebarOpen";
    pub const SIDEBAR_COLLAPSED: &str = "sidebarCollapsed";
    pub const SIDEBAR_MENU_ITEMS: &str = "sidebarMenuItems";
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("session storage error: {0}")]
    Storage(String),
    #[error("session value for '{key}' is malformed: {reason}")]
    Malformed { key: String, reason: String },
}

impl From<ServiceError> for SessionError {
    fn from(e: ServiceError) -> Self { SessionError::Storage(e.to_string()) }
}

/// String key-value storage behind a session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    async fn set(&self, key: &str, value: String) -> Result<(), SessionError>;
    async fn remove(&self, key: &str) -> Result<(), SessionError>;

    /// Remove several keys. Stores that can do it in one write override this.
    async fn remove_many(&self, keys: &[&str]) -> Result<(), SessionError> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }

    /// Pick up changes made by another writer. No-op for stores that have none.
    async fn refresh(&self) -> Result<(), SessionError> { Ok(()) }
}
