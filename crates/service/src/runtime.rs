//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binary crates can import
//! `service::runtime::*` without depending directly on `common`.

use std::path::Path;

/// Ensure the store's data directory exists.
pub async fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    common::env::ensure_data_dir(data_dir).await
}

/// Ensure the directory holding the session file exists.
pub async fn ensure_session_dir(session_file: &str) -> anyhow::Result<()> {
    common::env::ensure_parent_dir(Path::new(session_file)).await
}
