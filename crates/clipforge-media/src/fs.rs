//! Filesystem helpers.

use std::path::Path;
use tracing::{debug, warn};

/// Best-effort, idempotent file removal.
///
/// Returns `true` when a file was actually removed. Missing files and
/// removal errors are not failures; the caller's cleanup discipline must
/// hold on every exit path and cannot afford to propagate here.
pub async fn remove_if_exists(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();

    if !path.exists() {
        return false;
    }

    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed {}", path.display());
            true
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to remove file");
            false
        }
    }
}
