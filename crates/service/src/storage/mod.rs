//! Storage abstractions for service layer
//!
//! Reusable file-backed stores: an ordered collection of resources (the
//! mock REST store) and a flat key-value map (the session store).

pub mod json_collection_store;
pub mod json_map_store;

use std::path::Path;

use tokio::fs;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Write `data` next to `path` and rename over it so readers never see a torn file.
/// Each call gets its own temp file; several processes may share `path`.
pub(crate) async fn write_atomic(path: &Path, data: Vec<u8>) -> Result<(), ServiceError> {
    let tmp = path.with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));
    fs::write(&tmp, data).await.map_err(ServiceError::storage)?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(ServiceError::storage(e));
    }
    Ok(())
}
