//! Idea Repository
//!
//! Translates idea operations to document store calls and turns the live
//! collection feed back into `Idea` records.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::domain::{DomainError, DomainResult, Idea, NewIdea, Note};
use super::subscription::Subscription;
use super::traits::{from_snapshots, log_failure, to_document, DocumentStore, OrderBy};

pub const IDEAS_COLLECTION: &str = "ideas";

/// Wall-clock milliseconds that never go backwards within a session
#[derive(Debug, Default)]
pub struct SessionClock {
    last: AtomicI64,
}

impl SessionClock {
    pub fn now(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let previous = self.last.fetch_max(now, Ordering::SeqCst);
        previous.max(now)
    }
}

/// Remote-backed idea gateway
#[derive(Clone)]
pub struct IdeaRepository {
    store: Arc<dyn DocumentStore>,
    clock: Arc<SessionClock>,
}

impl IdeaRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SessionClock::default()),
        }
    }

    /// Persist a new idea stamped with the current time; returns its id
    pub async fn create(&self, idea: &NewIdea) -> DomainResult<String> {
        let mut doc = to_document(idea)?;
        doc.insert("timestamp".to_string(), self.clock.now().into());

        let id = log_failure(
            "Error adding idea",
            self.store.add(IDEAS_COLLECTION, doc).await,
        )?;
        log::info!("Idea written with ID: {}", id);
        Ok(id)
    }

    /// Live feed of all ideas, newest first
    pub fn subscribe(&self) -> Subscription<Vec<Idea>> {
        self.store
            .watch(IDEAS_COLLECTION, OrderBy::desc("timestamp"))
            .map(|docs| from_snapshots(IDEAS_COLLECTION, docs))
    }

    /// Append a new note to an idea's thread
    pub async fn add_note(&self, idea_id: &str, text: &str) -> DomainResult<Note> {
        if text.trim().is_empty() {
            return Err(DomainError::InvalidInput("note text is empty".to_string()));
        }
        let note = Note::new(text.to_string(), self.clock.now());
        self.persist_note(idea_id, &note).await?;
        Ok(note)
    }

    /// Store a note built elsewhere (e.g. already shown optimistically)
    pub async fn persist_note(&self, idea_id: &str, note: &Note) -> DomainResult<()> {
        let value = serde_json::to_value(note)?;
        log_failure(
            "Error adding note",
            self.store
                .array_union(IDEAS_COLLECTION, idea_id, "notes", vec![value])
                .await,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_clock_is_monotonic() {
        let clock = SessionClock::default();
        clock.last.store(i64::MAX - 1, Ordering::SeqCst);
        assert_eq!(clock.now(), i64::MAX - 1);

        let clock = SessionClock::default();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
