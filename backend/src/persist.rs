use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::time::{interval, Duration};
use tracing::{debug, error, info};
use crate::store::{PollStore, StoreError};

/// Writes the store to `path` if it changed since the last flush.
///
/// Returns whether anything was written. A failed write leaves the store
/// dirty so the next flush retries.
pub async fn flush(store: &Mutex<PollStore>, path: &Path) -> Result<bool, StoreError> {
    let snapshot = {
        let mut store = store.lock()
            .map_err(|e| StoreError::Io(format!("store lock poisoned: {e}")))?;
        store.take_snapshot()?
    };
    let Some(json) = snapshot else { return Ok(false) };

    if let Err(e) = write_replacing(path, &json).await {
        if let Ok(mut store) = store.lock() {
            store.mark_dirty();
        }
        return Err(e);
    }
    debug!("Flushed polls to {}", path.display());
    Ok(true)
}

async fn write_replacing(path: &Path, json: &str) -> Result<(), StoreError> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, json).await.map_err(|e| StoreError::Io(e.to_string()))?;
    tokio::fs::rename(&tmp, path).await.map_err(|e| StoreError::Io(e.to_string()))
}

pub async fn run_persist_task(store: Arc<Mutex<PollStore>>, path: std::path::PathBuf, every: Duration) {
    let mut interval = interval(every);
    info!("💾 Persistence task started, writing to {}", path.display());

    loop {
        interval.tick().await;
        if let Err(e) = flush(&store, &path).await {
            error!("Persisting polls failed: {}", e);
        }
    }
}
