use std::sync::atomic::{AtomicU16, AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::RwLock;
use tracing::debug;

use models::seed::{seed_records, seed_users};
use models::{Record, RecordInput, User, UserInput};

use super::{ClientError, RecordsApi, UsersApi};

/// In-process stand-in for the REST store.
///
/// Used by tests and as the static user directory when no server is
/// reachable. `fail_with(status)` makes every subsequent call answer with
/// that status until `recover()` is called.
#[derive(Default)]
pub struct InMemoryResources {
    records: RwLock<Vec<Record>>,
    users: RwLock<Vec<User>>,
    next_id: AtomicU64,
    failing: AtomicU16,
}

impl InMemoryResources {
    pub fn new(records: Vec<Record>, users: Vec<User>) -> Self {
        Self {
            records: RwLock::new(records),
            users: RwLock::new(users),
            next_id: AtomicU64::new(100),
            failing: AtomicU16::new(0),
        }
    }

    /// Preloaded with the bundled seed users and records.
    pub fn seeded() -> Self { Self::new(seed_records(), seed_users()) }

    pub fn fail_with(&self, status: u16) { self.failing.store(status, Ordering::SeqCst); }

    pub fn recover(&self) { self.failing.store(0, Ordering::SeqCst); }

    fn check(&self) -> Result<(), ClientError> {
        match self.failing.load(Ordering::SeqCst) {
            0 => Ok(()),
            status => Err(ClientError::Status {
                status,
                status_text: reason(status).to_string(),
            }),
        }
    }

    fn fresh_id(&self) -> String { self.next_id.fetch_add(1, Ordering::SeqCst).to_string() }
}

fn reason(status: u16) -> &'static str {
    StatusCode::from_u16(status).ok().and_then(|s| s.canonical_reason()).unwrap_or("Error")
}

fn not_found() -> ClientError {
    ClientError::Status { status: 404, status_text: reason(404).to_string() }
}

#[async_trait]
impl RecordsApi for InMemoryResources {
    async fn list_records(&self) -> Result<Vec<Record>, ClientError> {
        self.check()?;
        Ok(self.records.read().await.clone())
    }

    async fn get_record(&self, id: &str) -> Result<Record, ClientError> {
        self.check()?;
        self.records.read().await.iter().find(|r| r.id == id).cloned().ok_or_else(not_found)
    }

    async fn create_record(&self, input: &RecordInput) -> Result<Record, ClientError> {
        self.check()?;
        let record = Record::from_input(self.fresh_id(), input.clone());
        debug!(id = %record.id, "memory: record created");
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn update_record(&self, id: &str, input: &RecordInput) -> Result<Record, ClientError> {
        self.check()?;
        let mut records = self.records.write().await;
        let slot = records.iter_mut().find(|r| r.id == id).ok_or_else(not_found)?;
        *slot = Record::from_input(id.to_string(), input.clone());
        Ok(slot.clone())
    }

    async fn delete_record(&self, id: &str) -> Result<(), ClientError> {
        self.check()?;
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}

#[async_trait]
impl UsersApi for InMemoryResources {
    async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.check()?;
        Ok(self.users.read().await.clone())
    }

    async fn find_users_by_email(&self, email: &str) -> Result<Vec<User>, ClientError> {
        self.check()?;
        Ok(self.users.read().await.iter().filter(|u| u.email == email).cloned().collect())
    }

    async fn create_user(&self, input: &UserInput) -> Result<User, ClientError> {
        self.check()?;
        let id = input.id.clone().unwrap_or_else(|| self.fresh_id());
        let user = User::from_input(id, input.clone());
        self.users.write().await.push(user.clone());
        Ok(user)
    }
}
