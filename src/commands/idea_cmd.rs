//! Idea Commands
//!
//! Capture confirmation, note threads and issue export.

use crate::capture::PendingCapture;
use crate::dashboard::issue_description;
use crate::domain::{DomainError, Note};
use crate::tracker::{CreatedIssue, NOT_CONFIGURED};
use crate::AppState;
use super::report;

/// Persist a confirmed capture; the live feed brings it into the store
pub async fn confirm_capture(
    state: &AppState,
    pending: &PendingCapture,
    refinement: &str,
) -> Result<String, String> {
    let idea = pending.accept(refinement);
    state
        .idea_repo
        .create(&idea)
        .await
        .map_err(|e| report("Saving idea", e))
}

/// Append a note locally, then persist it
///
/// The local note is kept even if the write fails.
pub async fn add_note(state: &AppState, idea_id: &str, text: &str) -> Result<Note, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("Note text is empty".to_string());
    }

    let note = state
        .ideas
        .add_note(idea_id, text)
        .ok_or_else(|| report("Adding note", DomainError::NotFound(format!("idea {}", idea_id))))?;

    state
        .idea_repo
        .persist_note(idea_id, &note)
        .await
        .map_err(|e| report("Adding note", e))?;
    Ok(note)
}

/// Create a tracker issue from an idea and its notes
pub async fn export_idea(state: &AppState, idea_id: &str) -> Result<CreatedIssue, String> {
    if !state.exporter.is_configured() {
        return Err(NOT_CONFIGURED.to_string());
    }

    let idea = state
        .ideas
        .get(idea_id)
        .ok_or_else(|| report("Exporting idea", DomainError::NotFound(format!("idea {}", idea_id))))?;

    state
        .exporter
        .create_issue(&idea.text, &issue_description(&idea))
        .await
        .map_err(|e| report("Exporting idea", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureInput;
    use crate::config::AppConfig;
    use crate::domain::{Category, IdeaType, NewIdea};
    use crate::repository::MemoryDocumentStore;
    use crate::tracker::IssueExporter;
    use std::sync::Arc;

    fn setup() -> (MemoryDocumentStore, AppState) {
        let documents = MemoryDocumentStore::new();
        let state = AppState::new(
            Arc::new(documents.clone()),
            IssueExporter::disabled(),
            AppConfig::default(),
        );
        (documents, state)
    }

    async fn seed(state: &AppState, text: &str) -> String {
        let id = state
            .idea_repo
            .create(&NewIdea::new(text.to_string(), Category::A, IdeaType::Idea))
            .await
            .unwrap();
        let snapshot = state.idea_repo.subscribe().next().await.unwrap().unwrap();
        state.ideas.replace_all(snapshot);
        id
    }

    #[tokio::test]
    async fn test_confirm_capture_persists() {
        let (_, state) = setup();
        let pending = CaptureInput::headless().submit("Client portal").unwrap();

        let id = confirm_capture(&state, &pending, "with SSO").await.unwrap();

        let ideas = state.idea_repo.subscribe().next().await.unwrap().unwrap();
        assert_eq!(ideas[0].id, id);
        assert_eq!(ideas[0].text, "Client portal (with SSO)");
        assert!(ideas[0].is_refined());
    }

    #[tokio::test]
    async fn test_add_note_is_optimistic() {
        let (documents, state) = setup();
        let id = seed(&state, "Portal").await;

        documents.set_offline(true);
        let err = add_note(&state, &id, "check custodian").await.unwrap_err();

        assert!(!err.is_empty());
        let local = state.ideas.get(&id).unwrap();
        assert_eq!(local.notes.len(), 1);
        assert_eq!(local.notes[0].text, "check custodian");
    }

    #[tokio::test]
    async fn test_add_note_unknown_idea() {
        let (_, state) = setup();
        assert!(add_note(&state, "ghost", "hello").await.is_err());
        assert!(add_note(&state, "ghost", "  ").await.is_err());
        assert!(state.ideas.is_empty());
    }

    #[tokio::test]
    async fn test_export_requires_configuration() {
        let (_, state) = setup();
        let id = seed(&state, "Portal").await;

        assert_eq!(export_idea(&state, &id).await.unwrap_err(), NOT_CONFIGURED);
    }
}
