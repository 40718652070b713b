//! Resource client: CRUD against the `records` and `users` collections.
//!
//! The traits are the seam between the service layer and the transport;
//! [`http::ResourceClient`] talks to the REST store, [`memory::InMemoryResources`]
//! backs tests and the offline seed directory.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use models::{Record, RecordInput, User, UserInput};

pub use http::ResourceClient;
pub use memory::InMemoryResources;

/// Transport-level failure of a resource call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClientError {
    /// The store answered with a non-2xx status.
    #[error("API Error: {status} {status_text}")]
    Status { status: u16, status_text: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool { self.status() == Some(404) }
}

#[async_trait]
pub trait RecordsApi: Send + Sync {
    async fn list_records(&self) -> Result<Vec<Record>, ClientError>;
    async fn get_record(&self, id: &str) -> Result<Record, ClientError>;
    async fn create_record(&self, input: &RecordInput) -> Result<Record, ClientError>;
    async fn update_record(&self, id: &str, input: &RecordInput) -> Result<Record, ClientError>;
    async fn delete_record(&self, id: &str) -> Result<(), ClientError>;
}

#[async_trait]
pub trait UsersApi: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, ClientError>;
    async fn find_users_by_email(&self, email: &str) -> Result<Vec<User>, ClientError>;
    async fn create_user(&self, input: &UserInput) -> Result<User, ClientError>;
}
