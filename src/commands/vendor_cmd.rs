//! Vendor Commands

use crate::domain::Vendor;
use crate::vendor_matrix::{filter_vendors, parse_vendor_import, VendorDraft};
use crate::AppState;
use super::report;

/// Save the edit dialog; updates a persisted vendor, creates a new one otherwise
///
/// On error the caller keeps the dialog open with the draft intact.
pub async fn save_vendor(state: &AppState, draft: &VendorDraft, original: Option<&Vendor>) -> Result<String, String> {
    let base = original.cloned().unwrap_or_default();
    let vendor = draft.apply(&base);
    state
        .vendor_repo
        .save(&vendor)
        .await
        .map_err(|e| report("Saving vendor", e))
}

/// Remove locally right away, then delete remotely
pub async fn delete_vendor(state: &AppState, id: &str) -> Result<(), String> {
    state.vendors.remove(id);
    state
        .vendor_repo
        .delete(id)
        .await
        .map_err(|e| report("Deleting vendor", e))
}

/// Create every vendor in a pasted JSON array; returns how many were added
///
/// Stops at the first failed write. Vendors created before it stay saved and
/// the message says how many.
pub async fn import_vendors(state: &AppState, payload: &str) -> Result<usize, String> {
    let vendors = parse_vendor_import(payload).map_err(|e| report("Importing vendors", e))?;

    let mut imported = 0;
    for vendor in &vendors {
        if let Err(e) = state.vendor_repo.create(vendor).await {
            let message = report("Importing vendors", e);
            return Err(format!("Imported {} of {} vendors: {}", imported, vendors.len(), message));
        }
        imported += 1;
    }
    log::info!("Imported {} vendors", imported);
    Ok(imported)
}

/// Vendors in store order matching the search box
pub fn filtered_vendors(state: &AppState, search: &str) -> Vec<Vendor> {
    let vendors = state.vendors.snapshot();
    filter_vendors(&vendors, search).into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::domain::VendorStatus;
    use crate::domain::{DomainError, DomainResult};
    use crate::repository::{Document, DocumentSnapshot, DocumentStore, MemoryDocumentStore, OrderBy, Subscription, VENDORS_COLLECTION};
    use crate::tracker::IssueExporter;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Memory store that rejects every create after the first `limit`
    struct LimitedStore {
        inner: MemoryDocumentStore,
        limit: usize,
        adds: AtomicUsize,
    }

    #[async_trait]
    impl DocumentStore for LimitedStore {
        async fn add(&self, collection: &str, data: Document) -> DomainResult<String> {
            if self.adds.fetch_add(1, Ordering::SeqCst) >= self.limit {
                return Err(DomainError::remote("quota exceeded"));
            }
            self.inner.add(collection, data).await
        }

        async fn update(&self, collection: &str, id: &str, data: Document) -> DomainResult<()> {
            self.inner.update(collection, id, data).await
        }

        async fn array_union(&self, collection: &str, id: &str, field: &str, values: Vec<Value>) -> DomainResult<()> {
            self.inner.array_union(collection, id, field, values).await
        }

        async fn delete(&self, collection: &str, id: &str) -> DomainResult<()> {
            self.inner.delete(collection, id).await
        }

        async fn query(&self, collection: &str, order: &OrderBy) -> DomainResult<Vec<DocumentSnapshot>> {
            self.inner.query(collection, order).await
        }

        fn watch(&self, collection: &str, order: OrderBy) -> Subscription {
            self.inner.watch(collection, order)
        }
    }

    fn setup() -> (MemoryDocumentStore, AppState) {
        let documents = MemoryDocumentStore::new();
        let state = AppState::new(
            Arc::new(documents.clone()),
            IssueExporter::disabled(),
            AppConfig::default(),
        );
        (documents, state)
    }

    async fn refresh(state: &AppState) {
        let vendors = state.vendor_repo.subscribe().next().await.unwrap().unwrap();
        state.vendors.replace_all(vendors);
    }

    #[tokio::test]
    async fn test_save_new_then_edit() {
        let (documents, state) = setup();
        let mut draft = VendorDraft {
            name: "Orion".to_string(),
            vendor_type: "Portfolio".to_string(),
            ..Default::default()
        };
        draft.add_category("Billing");

        let id = save_vendor(&state, &draft, None).await.unwrap();
        refresh(&state).await;

        let saved = state.vendors.get(&id).unwrap();
        assert_eq!(saved.categories["Billing"].status, VendorStatus::Green);

        let mut edit = VendorDraft::from_vendor(&saved);
        edit.add_category("Trading");
        assert_eq!(save_vendor(&state, &edit, Some(&saved)).await.unwrap(), id);

        let doc = documents.get(VENDORS_COLLECTION, &id).await.unwrap();
        assert!(doc["categories"]["Trading"].is_object());
    }

    #[tokio::test]
    async fn test_delete_is_optimistic() {
        let (documents, state) = setup();
        let id = state.vendor_repo.create(&Vendor::new("Orion", "Portfolio")).await.unwrap();
        refresh(&state).await;

        documents.set_offline(true);
        assert!(delete_vendor(&state, &id).await.is_err());
        assert!(state.vendors.get(&id).is_none());
    }

    #[tokio::test]
    async fn test_import_and_filter() {
        let (_, state) = setup();
        let payload = r#"[{"name": "Wealthbox", "type": "CRM"}, {"name": "Holistiplan", "type": "Tax"}]"#;

        assert_eq!(import_vendors(&state, payload).await.unwrap(), 2);
        refresh(&state).await;

        let found = filtered_vendors(&state, "crm");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Wealthbox");
        assert_eq!(filtered_vendors(&state, "").len(), 2);
    }

    #[tokio::test]
    async fn test_import_rejects_bad_json() {
        let (_, state) = setup();
        let err = import_vendors(&state, "not json").await.unwrap_err();
        assert!(err.starts_with("Invalid input"));
    }

    #[tokio::test]
    async fn test_import_reports_partial_progress() {
        let documents = MemoryDocumentStore::new();
        let limited = LimitedStore {
            inner: documents.clone(),
            limit: 2,
            adds: AtomicUsize::new(0),
        };
        let state = AppState::new(Arc::new(limited), IssueExporter::disabled(), AppConfig::default());
        let payload = r#"[{"name": "Orion"}, {"name": "Wealthbox"}, {"name": "Altruist"}]"#;

        let err = import_vendors(&state, payload).await.unwrap_err();

        assert!(err.starts_with("Imported 2 of 3 vendors"), "{err}");
        assert!(err.contains("quota exceeded"));
        let saved = documents.query(VENDORS_COLLECTION, &OrderBy::desc("createdAt")).await.unwrap();
        assert_eq!(saved.len(), 2);
    }
}
