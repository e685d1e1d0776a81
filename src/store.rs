//! Replica State Store
//!
//! In-memory copy of a remote collection. Views subscribe to it and are
//! notified after every effective mutation. The store is owned by the
//! application session and passed around explicitly.

use std::collections::HashSet;

use tokio::sync::watch;

use crate::domain::{Entity, Idea, IdeaUpdate, Note, Vendor};

/// Reactive list of entities
#[derive(Debug)]
pub struct Store<T> {
    tx: watch::Sender<Vec<T>>,
}

pub type IdeaStore = Store<Idea>;
pub type VendorStore = Store<Vendor>;

impl<T: Entity> Default for Store<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Entity> Store<T> {
    pub fn new(initial: Vec<T>) -> Self {
        let (tx, _rx) = watch::channel(dedup(initial));
        Self { tx }
    }

    /// Subscribe to changes; the receiver sees the current list immediately
    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.tx.subscribe()
    }

    /// Copy of the current list
    pub fn snapshot(&self) -> Vec<T> {
        self.tx.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.tx.borrow().iter().find(|e| e.id() == Some(id)).cloned()
    }

    /// Replace the whole list with a fresh snapshot
    pub fn replace_all(&self, items: Vec<T>) {
        let items = dedup(items);
        self.tx.send_modify(|current| *current = items);
    }

    /// Append a record (optimistic insert before remote confirmation)
    pub fn add(&self, item: T) {
        self.tx.send_modify(|current| current.push(item));
    }

    /// Modify the record with `id` in place; returns false if absent
    pub fn update_with(&self, id: &str, f: impl FnOnce(&mut T)) -> bool {
        self.tx.send_if_modified(|current| {
            match current.iter_mut().find(|e| e.id() == Some(id)) {
                Some(entity) => {
                    f(entity);
                    true
                }
                None => false,
            }
        })
    }

    /// Remove the record with `id`; returns false if absent
    pub fn remove(&self, id: &str) -> bool {
        self.tx.send_if_modified(|current| {
            let before = current.len();
            current.retain(|e| e.id() != Some(id));
            current.len() != before
        })
    }
}

impl Store<Idea> {
    pub fn update_fields(&self, id: &str, update: &IdeaUpdate) -> bool {
        self.update_with(id, |idea| update.apply(idea))
    }

    /// Append a note with a fresh id and the current time
    ///
    /// Unknown ids and blank text are ignored.
    pub fn add_note(&self, idea_id: &str, text: &str) -> Option<Note> {
        if text.trim().is_empty() {
            return None;
        }
        let note = Note::new(text.to_string(), chrono::Utc::now().timestamp_millis());
        self.append_note(idea_id, note.clone()).then_some(note)
    }

    /// Append an already built note
    pub fn append_note(&self, idea_id: &str, note: Note) -> bool {
        self.update_with(idea_id, |idea| {
            if !idea.notes.iter().any(|n| n.id == note.id) {
                idea.notes.push(note);
            }
        })
    }
}

/// Drop records whose id was already seen; unsaved records are kept
fn dedup<T: Entity>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|e| match e.id() {
            Some(id) => seen.insert(id.to_string()),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, IdeaType, NewIdea};

    fn idea(id: &str, text: &str) -> Idea {
        NewIdea::new(text.to_string(), Category::D, IdeaType::Idea).into_idea(id.to_string(), 1)
    }

    #[test]
    fn test_replace_all_is_idempotent() {
        let store = IdeaStore::default();
        let snapshot = vec![idea("1", "a"), idea("2", "b")];

        store.replace_all(snapshot.clone());
        let first = store.snapshot();
        store.replace_all(snapshot);

        assert_eq!(store.snapshot(), first);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_replace_all_removes_duplicate_ids() {
        let store = IdeaStore::default();
        store.replace_all(vec![idea("1", "first"), idea("1", "second"), idea("2", "b")]);

        let ideas = store.snapshot();
        assert_eq!(ideas.len(), 2);
        assert_eq!(ideas[0].text, "first");
    }

    #[test]
    fn test_add_note_unknown_id_is_noop() {
        let store = IdeaStore::new(vec![idea("1", "a")]);
        let mut rx = store.subscribe();
        rx.mark_unchanged();

        assert!(store.add_note("missing", "hello").is_none());
        assert!(!rx.has_changed().unwrap());
        assert!(store.get("1").unwrap().notes.is_empty());
    }

    #[test]
    fn test_add_note_blank_text_is_noop() {
        let store = IdeaStore::new(vec![idea("1", "a")]);
        let mut rx = store.subscribe();
        rx.mark_unchanged();

        assert!(store.add_note("1", "").is_none());
        assert!(store.add_note("1", "  \t").is_none());
        assert!(!rx.has_changed().unwrap());
        assert!(store.get("1").unwrap().notes.is_empty());
    }

    #[test]
    fn test_add_note_appends_in_order() {
        let store = IdeaStore::new(vec![idea("1", "a")]);

        let first = store.add_note("1", "one").unwrap();
        let second = store.add_note("1", "two").unwrap();

        let notes = store.get("1").unwrap().notes;
        assert_eq!(notes, vec![first, second]);
    }

    #[test]
    fn test_append_note_ignores_repeated_id() {
        let store = IdeaStore::new(vec![idea("1", "a")]);
        let note = Note::new("x".to_string(), 5);

        store.append_note("1", note.clone());
        store.append_note("1", note);

        assert_eq!(store.get("1").unwrap().notes.len(), 1);
    }

    #[test]
    fn test_update_and_remove() {
        let store = IdeaStore::new(vec![idea("1", "a"), idea("2", "b")]);

        let update = IdeaUpdate {
            text: Some("changed".to_string()),
            ..Default::default()
        };
        assert!(store.update_fields("2", &update));
        assert!(!store.update_fields("3", &update));
        assert_eq!(store.get("2").unwrap().text, "changed");

        assert!(store.remove("1"));
        assert!(!store.remove("1"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_see_mutations() {
        let store = IdeaStore::default();
        let mut rx = store.subscribe();

        store.add(idea("1", "a"));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);
    }

    #[test]
    fn test_unsaved_vendors_are_kept() {
        let store = VendorStore::default();
        store.replace_all(vec![Vendor::new("a", "x"), Vendor::new("b", "y")]);
        assert_eq!(store.len(), 2);
    }
}
