use std::sync::Arc;

use dashmap::DashSet;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use models::{Record, RecordInput};

use crate::client::RecordsApi;
use crate::errors::ServiceError;

/// Locally held copy of the records list.
///
/// Every load takes a generation number; a load result is applied only if
/// no newer load has started since, so a slow response cannot overwrite a
/// fresher one.
#[derive(Debug, Default)]
pub struct RecordsView {
    records: Vec<Record>,
    generation: u64,
}

impl RecordsView {
    pub fn records(&self) -> &[Record] { &self.records }

    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Returns whether the result was applied.
    pub fn finish_load(&mut self, generation: u64, records: Vec<Record>) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding stale records load");
            return false;
        }
        self.records = records;
        true
    }
}

/// Marks one id as being deleted; released on drop, including when the
/// delete future is cancelled.
struct DeleteSlot<'a> {
    set: &'a DashSet<String>,
    id: String,
}

impl<'a> DeleteSlot<'a> {
    fn claim(set: &'a DashSet<String>, id: &str) -> Option<Self> {
        set.insert(id.to_string()).then(|| Self { set, id: id.to_string() })
    }
}

impl Drop for DeleteSlot<'_> {
    fn drop(&mut self) { self.set.remove(&self.id); }
}

/// Records list backed by the resource store.
pub struct RecordsService {
    api: Arc<dyn RecordsApi>,
    view: RwLock<RecordsView>,
    deleting: DashSet<String>,
}

impl RecordsService {
    pub fn new(api: Arc<dyn RecordsApi>) -> Self {
        Self { api, view: RwLock::new(RecordsView::default()), deleting: DashSet::new() }
    }

    pub async fn records(&self) -> Vec<Record> { self.view.read().await.records().to_vec() }

    /// Re-read the authoritative list. Returns the list as it stands afterwards.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Vec<Record>, ServiceError> {
        let generation = self.view.write().await.begin_load();
        let fresh = self.api.list_records().await?;
        let mut view = self.view.write().await;
        if view.finish_load(generation, fresh) {
            debug!(count = view.records().len(), "records loaded");
        }
        Ok(view.records().to_vec())
    }

    pub async fn get(&self, id: &str) -> Result<Record, ServiceError> {
        self.api.get_record(id).await.map_err(|e| {
            if e.is_not_found() { ServiceError::not_found("record") } else { e.into() }
        })
    }

    #[instrument(skip(self, input), fields(plate = %input.car_plate))]
    pub async fn create(&self, input: RecordInput) -> Result<Record, ServiceError> {
        input.validate()?;
        let created = self.api.create_record(&input).await?;
        self.view.write().await.records.push(created.clone());
        info!(id = %created.id, "record created");
        Ok(created)
    }

    /// Delete one record. A second delete of the same id while the first is
    /// running fails with `Busy`. On failure the list is re-fetched.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let Some(slot) = DeleteSlot::claim(&self.deleting, id) else {
            return Err(ServiceError::Busy(format!("record {id} is already being deleted")));
        };
        let outcome = self.api.delete_record(id).await;
        drop(slot);

        match outcome {
            Ok(()) => {
                self.view.write().await.records.retain(|r| r.id != id);
                info!(id, "record deleted");
                Ok(())
            }
            Err(e) => {
                warn!(id, error = %e, "delete failed; reloading records");
                if let Err(reload) = self.refresh().await {
                    warn!(error = %reload, "reload after failed delete also failed");
                }
                Err(e.into())
            }
        }
    }

    pub fn is_deleting(&self, id: &str) -> bool { self.deleting.contains(id) }
}
