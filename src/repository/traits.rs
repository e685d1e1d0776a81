//! Repository Layer - Core Traits
//!
//! Defines the abstract interface to the remote document database.
//! Implementations can talk to Firestore, keep data in memory, etc.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::{DomainError, DomainResult};
use super::subscription::Subscription;

/// Raw document body: top-level field name -> JSON value
pub type Document = Map<String, Value>;

/// A document as read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub id: String,
    pub data: Document,
}

/// Sort order of a collection query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, if self.descending { "desc" } else { "asc" })
    }
}

/// Document database client
///
/// All operations are async; none are retried.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document and return the id the store assigned
    async fn add(&self, collection: &str, data: Document) -> DomainResult<String>;

    /// Overwrite the given top-level fields of an existing document
    async fn update(&self, collection: &str, id: &str, data: Document) -> DomainResult<()>;

    /// Append values missing from an array field of an existing document
    async fn array_union(&self, collection: &str, id: &str, field: &str, values: Vec<Value>) -> DomainResult<()>;

    /// Delete a document; deleting a missing document succeeds
    async fn delete(&self, collection: &str, id: &str) -> DomainResult<()>;

    /// Read the collection ordered by `order`; documents lacking the field are left out
    async fn query(&self, collection: &str, order: &OrderBy) -> DomainResult<Vec<DocumentSnapshot>>;

    /// Live feed of the ordered collection
    ///
    /// The current snapshot is delivered first, then a new one after every
    /// change. Feed failures arrive as `Err` items. Dropping the returned
    /// subscription stops the feed.
    fn watch(&self, collection: &str, order: OrderBy) -> Subscription;
}

/// Serialize a record into a document body
pub fn to_document<T: serde::Serialize>(record: &T) -> DomainResult<Document> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(DomainError::InvalidInput(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// Decode a snapshot into records, skipping documents that do not fit `T`
pub fn from_snapshots<T: serde::de::DeserializeOwned>(collection: &str, docs: Vec<DocumentSnapshot>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| {
            let mut data = doc.data;
            data.insert("id".to_string(), Value::String(doc.id.clone()));
            match serde_json::from_value(Value::Object(data)) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping malformed {} document {}: {}", collection, doc.id, e);
                    None
                }
            }
        })
        .collect()
}

/// Log a failed gateway call and hand the error back
pub(crate) fn log_failure<T>(context: &str, result: DomainResult<T>) -> DomainResult<T> {
    if let Err(e) = &result {
        log::error!("{}: {}", context, e);
    }
    result
}
