//! Dashboard
//!
//! Read-only projections of the idea store: quadrant columns, card badges,
//! the note thread of the detail view and the exported issue body.

use chrono::{DateTime, Utc};

use crate::domain::{Category, Idea, Note};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quadrant {
    pub category: Category,
    pub title: &'static str,
    pub description: &'static str,
}

pub static QUADRANTS: [Quadrant; 4] = [
    Quadrant {
        category: Category::A,
        title: "Client Experience",
        description: "The \"How\" - Service & Delivery",
    },
    Quadrant {
        category: Category::B,
        title: "The UVP",
        description: "The \"Why\" - Flat Fee & High Tech",
    },
    Quadrant {
        category: Category::C,
        title: "Marketing",
        description: "The \"Hook\" - Growth & Outreach",
    },
    Quadrant {
        category: Category::D,
        title: "Miscellaneous",
        description: "Future Models & Expansion",
    },
];

pub fn quadrant(category: Category) -> &'static Quadrant {
    match category {
        Category::A => &QUADRANTS[0],
        Category::B => &QUADRANTS[1],
        Category::C => &QUADRANTS[2],
        Category::D => &QUADRANTS[3],
    }
}

/// Badge data for one idea card
#[derive(Debug, Clone, PartialEq)]
pub struct IdeaCard {
    pub id: String,
    pub text: String,
    pub marker: char,
    pub note_count: usize,
    pub refined: bool,
}

impl From<&Idea> for IdeaCard {
    fn from(idea: &Idea) -> Self {
        Self {
            id: idea.id.clone(),
            text: idea.text.clone(),
            marker: if idea.is_question() { '?' } else { '!' },
            note_count: idea.notes.len(),
            refined: idea.is_refined(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuadrantColumn {
    pub quadrant: &'static Quadrant,
    pub cards: Vec<IdeaCard>,
}

impl QuadrantColumn {
    pub fn count(&self) -> usize {
        self.cards.len()
    }
}

/// Group ideas into the four quadrants, keeping store order within each
pub fn quadrant_columns(ideas: &[Idea]) -> Vec<QuadrantColumn> {
    QUADRANTS
        .iter()
        .map(|quadrant| QuadrantColumn {
            quadrant,
            cards: ideas
                .iter()
                .filter(|idea| idea.category == quadrant.category)
                .map(IdeaCard::from)
                .collect(),
        })
        .collect()
}

/// Notes oldest first; equal timestamps keep insertion order
pub fn sorted_notes(idea: &Idea) -> Vec<&Note> {
    let mut notes: Vec<&Note> = idea.notes.iter().collect();
    notes.sort_by_key(|n| n.timestamp);
    notes
}

fn format_time(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Markdown body used when exporting an idea to the issue tracker
pub fn issue_description(idea: &Idea) -> String {
    let challenge = idea.challenge_response.as_deref().unwrap_or("N/A");

    let notes = sorted_notes(idea);
    let notes = if notes.is_empty() {
        "None".to_string()
    } else {
        notes
            .iter()
            .map(|n| format!("- {} ({})", n.text, format_time(n.timestamp)))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "**Original Idea:**\n{}\n\n**Gap Analysis Challenge:**\n{}\n\n**Notes:**\n{}",
        idea.text, challenge, notes
    )
}
