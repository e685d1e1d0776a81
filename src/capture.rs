//! Capture Flow
//!
//! Typed or spoken text goes through the classifier and becomes a pending
//! capture: the challenge dialog state the user confirms, optionally with a
//! refinement, before anything is persisted.

use async_trait::async_trait;

use crate::analyzer::{analyze_idea, Analysis};
use crate::domain::{Category, IdeaType, NewIdea};

/// Optional speech-to-text capability
#[async_trait]
pub trait SpeechInput: Send + Sync {
    fn is_supported(&self) -> bool;

    /// One recognized utterance, or `None` when nothing was heard
    async fn listen(&self) -> Option<String>;
}

/// Speech backend for environments without a microphone
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpeech;

#[async_trait]
impl SpeechInput for NoSpeech {
    fn is_supported(&self) -> bool {
        false
    }

    async fn listen(&self) -> Option<String> {
        None
    }
}

/// Capture bar state
pub struct CaptureInput {
    speech: Box<dyn SpeechInput>,
    voice_supported: bool,
}

impl CaptureInput {
    pub fn new(speech: Box<dyn SpeechInput>) -> Self {
        let voice_supported = speech.is_supported();
        if !voice_supported {
            log::info!("Speech recognition unavailable; voice capture disabled");
        }
        Self { speech, voice_supported }
    }

    pub fn headless() -> Self {
        Self::new(Box::new(NoSpeech))
    }

    pub fn voice_supported(&self) -> bool {
        self.voice_supported
    }

    /// Classify typed text; blank input is ignored
    pub fn submit(&self, text: &str) -> Option<PendingCapture> {
        if text.trim().is_empty() {
            return None;
        }
        Some(PendingCapture::new(text))
    }

    /// Listen once and classify the transcript like typed text
    pub async fn listen(&self) -> Option<PendingCapture> {
        if !self.voice_supported {
            return None;
        }
        let transcript = self.speech.listen().await?;
        self.submit(&transcript)
    }
}

/// A classified capture waiting for confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCapture {
    pub text: String,
    pub challenge: String,
    pub category: Category,
    pub idea_type: IdeaType,
    pub analysis: Analysis,
}

impl PendingCapture {
    pub fn new(text: &str) -> Self {
        let analysis = analyze_idea(text);
        Self {
            text: text.to_string(),
            challenge: analysis.challenge_question.to_string(),
            category: analysis.suggested_category,
            idea_type: analysis.idea_type,
            analysis,
        }
    }

    /// Captured text with the refinement appended in parentheses
    pub fn final_text(&self, refinement: &str) -> String {
        let refinement = refinement.trim();
        if refinement.is_empty() {
            self.text.clone()
        } else {
            format!("{} ({})", self.text, refinement)
        }
    }

    /// Build the record to persist
    pub fn accept(&self, refinement: &str) -> NewIdea {
        let text = self.final_text(refinement);
        let refined = text != self.text;

        let mut idea = NewIdea::new(text, self.category, self.idea_type);
        idea.refined = Some(refined);
        idea.challenge_response = Some(self.challenge.clone());
        idea
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::DEFAULT_CHALLENGE;

    struct ScriptedSpeech(Option<&'static str>);

    #[async_trait]
    impl SpeechInput for ScriptedSpeech {
        fn is_supported(&self) -> bool {
            true
        }

        async fn listen(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let input = CaptureInput::headless();
        assert!(input.submit("").is_none());
        assert!(input.submit("   \n").is_none());
    }

    #[test]
    fn test_submit_classifies() {
        let input = CaptureInput::headless();
        let pending = input.submit("Will clients use a mobile app to upload documents?").unwrap();

        assert_eq!(pending.idea_type, IdeaType::Question);
        assert_eq!(pending.category, Category::A);
        assert!(pending.challenge.contains("client portal or mobile app"));
    }

    #[test]
    fn test_accept_without_refinement() {
        let pending = PendingCapture::new("Quarterly newsletter");
        let idea = pending.accept("  ");

        assert_eq!(idea.text, "Quarterly newsletter");
        assert_eq!(idea.refined, Some(false));
        assert_eq!(idea.challenge_response.as_deref(), Some(DEFAULT_CHALLENGE));
        assert_eq!(idea.category, Category::D);
        assert!(idea.notes.is_empty());
    }

    #[test]
    fn test_accept_with_refinement() {
        let pending = PendingCapture::new("Client portal");
        let idea = pending.accept(" tie into custodian login ");

        assert_eq!(idea.text, "Client portal (tie into custodian login)");
        assert_eq!(idea.refined, Some(true));
        assert_eq!(idea.category, Category::A);
    }

    #[tokio::test]
    async fn test_voice_unsupported_yields_nothing() {
        let input = CaptureInput::headless();
        assert!(!input.voice_supported());
        assert!(input.listen().await.is_none());
    }

    #[tokio::test]
    async fn test_transcript_is_submitted_like_text() {
        let input = CaptureInput::new(Box::new(ScriptedSpeech(Some("Run a postcard campaign"))));
        assert!(input.voice_supported());

        let pending = input.listen().await.unwrap();
        assert_eq!(pending.category, Category::C);
        assert!(pending.challenge.starts_with("Is there a multi-touch"));

        let silent = CaptureInput::new(Box::new(ScriptedSpeech(Some("  "))));
        assert!(silent.listen().await.is_none());
    }
}
