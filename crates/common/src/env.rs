//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::warn;

/// Warn when the static asset directory is missing; the landing page will 404.
pub async fn check_static_dir(static_dir: &str) {
    if tokio::fs::metadata(static_dir).await.is_err() {
        warn!(%static_dir, "static assets directory not found; landing page may 404");
    }
}

/// Create the parent directory of a file-backed database if it is missing.
pub async fn ensure_parent_dir(file_path: &str) -> anyhow::Result<()> {
    let parent = match Path::new(file_path).parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(()),
    };
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    Ok(())
}
