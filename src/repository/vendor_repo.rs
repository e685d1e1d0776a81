//! Vendor Repository
//!
//! Create, live-read, update and delete vendors. Independent of the idea
//! gateway and store.

use std::sync::Arc;

use crate::domain::{DomainResult, Vendor, VendorUpdate};
use super::idea_repo::SessionClock;
use super::subscription::Subscription;
use super::traits::{from_snapshots, log_failure, to_document, DocumentStore, OrderBy};

pub const VENDORS_COLLECTION: &str = "vendors";

#[derive(Clone)]
pub struct VendorRepository {
    store: Arc<dyn DocumentStore>,
    clock: Arc<SessionClock>,
}

impl VendorRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SessionClock::default()),
        }
    }

    /// Persist a new vendor; any id on the input is ignored
    pub async fn create(&self, vendor: &Vendor) -> DomainResult<String> {
        let mut doc = to_document(vendor)?;
        doc.remove("id");
        doc.insert("createdAt".to_string(), self.clock.now().into());

        let id = log_failure(
            "Error adding vendor",
            self.store.add(VENDORS_COLLECTION, doc).await,
        )?;
        log::info!("Vendor added with ID: {}", id);
        Ok(id)
    }

    /// Live feed of all vendors, newest first
    pub fn subscribe(&self) -> Subscription<Vec<Vendor>> {
        self.store
            .watch(VENDORS_COLLECTION, OrderBy::desc("createdAt"))
            .map(|docs| from_snapshots(VENDORS_COLLECTION, docs))
    }

    pub async fn update(&self, id: &str, update: &VendorUpdate) -> DomainResult<()> {
        if update.is_empty() {
            return Ok(());
        }
        let doc = to_document(update)?;
        log_failure(
            "Error updating vendor",
            self.store.update(VENDORS_COLLECTION, id, doc).await,
        )
    }

    pub async fn delete(&self, id: &str) -> DomainResult<()> {
        log_failure(
            "Error deleting vendor",
            self.store.delete(VENDORS_COLLECTION, id).await,
        )?;
        log::info!("Vendor deleted: {}", id);
        Ok(())
    }

    /// Update a persisted vendor or create an unsaved one; returns its id
    pub async fn save(&self, vendor: &Vendor) -> DomainResult<String> {
        match vendor.id.as_deref() {
            Some(id) => {
                self.update(id, &VendorUpdate::from_vendor(vendor)).await?;
                Ok(id.to_string())
            }
            None => self.create(vendor).await,
        }
    }
}
