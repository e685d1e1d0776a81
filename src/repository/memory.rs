//! In-Memory Document Store
//!
//! Process-local stand-in for the remote database, used headless and in
//! tests. Every write bumps a change counter that live feeds listen to.
//! The store can be switched offline to exercise failure paths.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{watch, Mutex};

use crate::domain::{DomainError, DomainResult};
use super::subscription::{feed, Subscription};
use super::traits::{Document, DocumentSnapshot, DocumentStore, OrderBy};

type Collection = BTreeMap<String, Document>;

struct Inner {
    collections: Mutex<HashMap<String, Collection>>,
    changes: watch::Sender<u64>,
    offline: AtomicBool,
}

/// Shared in-memory document store; clones see the same data
#[derive(Clone)]
pub struct MemoryDocumentStore {
    inner: Arc<Inner>,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        let (changes, _rx) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                collections: Mutex::new(HashMap::new()),
                changes,
                offline: AtomicBool::new(false),
            }),
        }
    }

    /// Simulate losing (or regaining) the connection
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, AtomicOrdering::SeqCst);
        self.bump();
    }

    /// Read a single document
    pub async fn get(&self, collection: &str, id: &str) -> Option<Document> {
        let collections = self.inner.collections.lock().await;
        collections.get(collection)?.get(id).cloned()
    }

    fn bump(&self) {
        self.inner.changes.send_modify(|version| *version += 1);
    }

    fn check_online(&self) -> DomainResult<()> {
        if self.inner.offline.load(AtomicOrdering::SeqCst) {
            return Err(DomainError::remote("document store unavailable"));
        }
        Ok(())
    }
}

/// Firestore-style auto id
fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..20].to_string()
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over field values: by type first, then by value
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn sorted(collection: &Collection, order: &OrderBy) -> Vec<DocumentSnapshot> {
    let mut docs: Vec<DocumentSnapshot> = collection
        .iter()
        .filter(|(_, data)| data.contains_key(&order.field))
        .map(|(id, data)| DocumentSnapshot {
            id: id.clone(),
            data: data.clone(),
        })
        .collect();

    docs.sort_by(|a, b| {
        let by_field = compare_values(&a.data[&order.field], &b.data[&order.field]);
        let by_field = if order.descending { by_field.reverse() } else { by_field };
        by_field.then_with(|| a.id.cmp(&b.id))
    });
    docs
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn add(&self, collection: &str, data: Document) -> DomainResult<String> {
        self.check_online()?;
        let id = new_document_id();
        {
            let mut collections = self.inner.collections.lock().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.clone(), data);
        }
        self.bump();
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, data: Document) -> DomainResult<()> {
        self.check_online()?;
        {
            let mut collections = self.inner.collections.lock().await;
            let doc = collections
                .get_mut(collection)
                .and_then(|c| c.get_mut(id))
                .ok_or_else(|| DomainError::NotFound(format!("{}/{}", collection, id)))?;
            for (field, value) in data {
                doc.insert(field, value);
            }
        }
        self.bump();
        Ok(())
    }

    async fn array_union(&self, collection: &str, id: &str, field: &str, values: Vec<Value>) -> DomainResult<()> {
        self.check_online()?;
        {
            let mut collections = self.inner.collections.lock().await;
            let doc = collections
                .get_mut(collection)
                .and_then(|c| c.get_mut(id))
                .ok_or_else(|| DomainError::NotFound(format!("{}/{}", collection, id)))?;

            let slot = doc
                .entry(field.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if !slot.is_array() {
                *slot = Value::Array(Vec::new());
            }
            if let Value::Array(items) = slot {
                for value in values {
                    if !items.contains(&value) {
                        items.push(value);
                    }
                }
            }
        }
        self.bump();
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> DomainResult<()> {
        self.check_online()?;
        let removed = {
            let mut collections = self.inner.collections.lock().await;
            collections
                .get_mut(collection)
                .and_then(|c| c.remove(id))
                .is_some()
        };
        if removed {
            self.bump();
        }
        Ok(())
    }

    async fn query(&self, collection: &str, order: &OrderBy) -> DomainResult<Vec<DocumentSnapshot>> {
        self.check_online()?;
        let collections = self.inner.collections.lock().await;
        Ok(collections
            .get(collection)
            .map(|c| sorted(c, order))
            .unwrap_or_default())
    }

    fn watch(&self, collection: &str, order: OrderBy) -> Subscription {
        let (sender, subscription) = feed();
        let store = self.clone();
        let collection = collection.to_string();
        let mut changes = self.inner.changes.subscribe();

        tokio::spawn(async move {
            let mut last: Option<DomainResult<Vec<DocumentSnapshot>>> = None;
            loop {
                changes.mark_unchanged();
                let current = store.query(&collection, &order).await;
                if last.as_ref() != Some(&current) {
                    last = Some(current.clone());
                    if !sender.send(current).await {
                        break;
                    }
                }

                tokio::select! {
                    _ = sender.closed() => break,
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            log::debug!("Feed on {} ({}) closed", collection, order);
        });

        subscription
    }
}
