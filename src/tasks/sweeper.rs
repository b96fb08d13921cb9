//! Expiry Sweeper Task
//!
//! Background task that periodically reclaims expired entries from the
//! backend. Expired entries are already logically absent on read; the
//! sweep just returns their memory. Backends that expire server-side
//! (Redis) report zero removals and the loop stays idle.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::store::StoreBackend;

/// Spawns the sweep loop. Returns a JoinHandle used to abort the task
/// during graceful shutdown.
pub fn spawn_sweeper_task(
    backend: Arc<dyn StoreBackend>,
    sweep_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweeper with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            match backend.sweep_expired().await {
                Ok(removed) if removed > 0 => {
                    info!("Expiry sweep removed {} entries", removed);
                }
                Ok(_) => {
                    debug!("Expiry sweep found nothing to remove");
                }
                Err(e) => {
                    // The store stays correct without the sweep; reads
                    // treat expired entries as absent regardless.
                    warn!(error = %e, "Expiry sweep failed, will retry");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;

    #[tokio::test]
    async fn test_sweeper_removes_expired_entries() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .set("expire_soon", b"v".to_vec(), 1)
            .await
            .unwrap();
        backend.set("long_lived", b"v".to_vec(), 3600).await.unwrap();

        let handle = spawn_sweeper_task(backend.clone(), 1);

        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(backend.len(), 1);
        assert!(backend.get("long_lived").await.unwrap().is_some());

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweeper_can_be_aborted() {
        let backend = Arc::new(MemoryBackend::new());

        let handle = spawn_sweeper_task(backend, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "task should be finished after abort");
    }
}
