//! Sync Context
//!
//! Background tasks that forward the remote live feeds into the local
//! stores. The handle owns the tasks; dropping it or calling `stop`
//! unsubscribes.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::Entity;
use crate::repository::Subscription;
use crate::store::Store;

/// Owner of the live sync tasks
pub struct SyncHandle {
    tasks: Vec<JoinHandle<()>>,
    status: watch::Sender<Option<String>>,
}

impl SyncHandle {
    pub fn new() -> Self {
        let (status, _rx) = watch::channel(None);
        Self {
            tasks: Vec::new(),
            status,
        }
    }

    /// Apply every snapshot from `feed` to `store`, last one wins
    pub fn forward<T: Entity>(&mut self, label: &'static str, mut feed: Subscription<Vec<T>>, store: Arc<Store<T>>) {
        let status = self.status.clone();
        let task = tokio::spawn(async move {
            while let Some(result) = feed.next().await {
                match result {
                    Ok(items) => {
                        log::info!("{} snapshot: {} records", label, items.len());
                        store.replace_all(items);
                        status.send_if_modified(|s| s.take().is_some());
                    }
                    Err(e) => {
                        log::error!("Error listening to {}: {}", label, e);
                        status.send_replace(Some(format!("{}: {}", label, e)));
                    }
                }
            }
            log::info!("{} feed closed", label);
        });
        self.tasks.push(task);
    }

    /// Latest feed error, cleared by the next good snapshot
    pub fn status(&self) -> watch::Receiver<Option<String>> {
        self.status.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.tasks.iter().any(|t| !t.is_finished())
    }

    pub fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Default for SyncHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
