//! Periodic snapshot task
//!
//! A background timer that dumps the engine state to disk at a fixed
//! interval, independent of request handling. A failed write is logged and
//! the next tick retries from scratch; there is no backoff and no persisted
//! failure state.

use super::codec;
use crate::store::StoreEngine;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Configuration for the periodic snapshot task
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// File the snapshot is written to
    pub path: PathBuf,

    /// Interval between dumps
    pub interval: Duration,
}

/// Handle to the running snapshot task
///
/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct SnapshotTask {
    shutdown_tx: watch::Sender<bool>,
}

impl SnapshotTask {
    /// Start the snapshot task as a background tokio task
    pub fn start(engine: Arc<StoreEngine>, config: SnapshotConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            path = %config.path.display(),
            interval_secs = config.interval.as_secs(),
            "Periodic snapshot task started"
        );
        tokio::spawn(snapshot_loop(engine, config, shutdown_rx));

        SnapshotTask { shutdown_tx }
    }

    /// Stop the snapshot task
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for SnapshotTask {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn snapshot_loop(
    engine: Arc<StoreEngine>,
    config: SnapshotConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(config.interval);
    // The first tick of a tokio interval fires immediately; skip it so the
    // first dump happens one full interval after startup.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Snapshot task received shutdown signal");
                    return;
                }
            }
        }

        match codec::dump_to_file(&engine, &config.path) {
            Ok(()) => info!(
                path = %config.path.display(),
                keys = engine.key_count(),
                "Snapshot written"
            ),
            Err(e) => warn!(
                path = %config.path.display(),
                error = %e,
                "Snapshot dump failed, retrying next tick"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_task_writes_snapshot_on_tick() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");

        let engine = Arc::new(StoreEngine::new());
        engine.set("k", vec!["v".to_string()]);

        let _task = SnapshotTask::start(
            Arc::clone(&engine),
            SnapshotConfig {
                path: path.clone(),
                interval: Duration::from_millis(20),
            },
        );

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(path.exists());

        let restored = StoreEngine::new();
        codec::load_from_dump(&restored, &path).unwrap();
        assert_eq!(restored.get("k").unwrap(), vec!["v".to_string()]);
    }

    #[tokio::test]
    async fn test_task_stops_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");

        let engine = Arc::new(StoreEngine::new());
        {
            let _task = SnapshotTask::start(
                Arc::clone(&engine),
                SnapshotConfig {
                    path: path.clone(),
                    interval: Duration::from_millis(10),
                },
            );
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        // After the handle is dropped, no further dumps happen
        std::fs::remove_file(&path).ok();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!path.exists());
    }
}
