//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{debug, warn};

/// Ensure the data directory exists; create it when missing.
pub async fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(data_dir).await.is_err() {
        warn!(%data_dir, "data directory not found; creating it");
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    Ok(())
}

/// Ensure the parent directory of a file path exists.
pub async fn ensure_parent_dir(file: &Path) -> anyhow::Result<()> {
    if let Some(parent) = file.parent() {
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        debug!(dir = %parent.display(), "ensuring parent directory");
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_nested_parent_dirs() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("env_{}", uuid::Uuid::new_v4()));
        let file = root.join("a/b/session.json");
        ensure_parent_dir(&file).await?;
        assert!(tokio::fs::metadata(root.join("a/b")).await.is_ok());
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn bare_file_name_needs_no_parent() -> anyhow::Result<()> {
        ensure_parent_dir(Path::new("session.json")).await
    }
}
