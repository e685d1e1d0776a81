//! Idea Entity
//!
//! A captured idea or question sorted into one of four strategic quadrants,
//! with an append-only thread of notes.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Strategic quadrant an idea belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Category {
    /// Client experience
    A,
    /// Value proposition
    B,
    /// Marketing
    C,
    /// Miscellaneous
    #[default]
    D,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::A, Category::B, Category::C, Category::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::A => "A",
            Category::B => "B",
            Category::C => "C",
            Category::D => "D",
        }
    }
}

/// Whether the capture was phrased as an idea or a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdeaType {
    #[default]
    Idea,
    Question,
}

impl IdeaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdeaType::Idea => "idea",
            IdeaType::Question => "question",
        }
    }
}

/// Timestamped comment appended to an idea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Client-generated, unique within the parent idea
    pub id: String,
    pub text: String,
    /// Epoch milliseconds
    pub timestamp: i64,
}

impl Note {
    /// Create a note with a fresh id
    pub fn new(text: String, timestamp: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            timestamp,
        }
    }
}

/// A persisted idea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    /// Document id assigned by the remote store
    pub id: String,
    pub text: String,
    pub category: Category,
    /// Epoch milliseconds
    pub timestamp: i64,
    /// True when the confirmed text differs from the captured text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refined: Option<bool>,
    /// Challenge prompt shown at capture time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_response: Option<String>,
    #[serde(rename = "type", default)]
    pub idea_type: IdeaType,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Idea {
    pub fn is_refined(&self) -> bool {
        self.refined.unwrap_or(false)
    }

    pub fn is_question(&self) -> bool {
        self.idea_type == IdeaType::Question
    }
}

impl Entity for Idea {
    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

/// An idea before the remote store has assigned it an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIdea {
    pub text: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refined: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge_response: Option<String>,
    #[serde(rename = "type")]
    pub idea_type: IdeaType,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl NewIdea {
    pub fn new(text: String, category: Category, idea_type: IdeaType) -> Self {
        Self {
            text,
            category,
            refined: None,
            challenge_response: None,
            idea_type,
            notes: Vec::new(),
        }
    }

    /// Attach the persisted id and creation time
    pub fn into_idea(self, id: String, timestamp: i64) -> Idea {
        Idea {
            id,
            text: self.text,
            category: self.category,
            timestamp,
            refined: self.refined,
            challenge_response: self.challenge_response,
            idea_type: self.idea_type,
            notes: self.notes,
        }
    }
}

/// Partial field update for an idea; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdeaUpdate {
    pub text: Option<String>,
    pub category: Option<Category>,
    pub refined: Option<bool>,
    pub challenge_response: Option<String>,
    pub idea_type: Option<IdeaType>,
}

impl IdeaUpdate {
    pub fn apply(&self, idea: &mut Idea) {
        if let Some(text) = &self.text {
            idea.text = text.clone();
        }
        if let Some(category) = self.category {
            idea.category = category;
        }
        if let Some(refined) = self.refined {
            idea.refined = Some(refined);
        }
        if let Some(challenge) = &self.challenge_response {
            idea.challenge_response = Some(challenge.clone());
        }
        if let Some(idea_type) = self.idea_type {
            idea.idea_type = idea_type;
        }
    }
}
