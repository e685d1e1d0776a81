//! Keyword Classifier
//!
//! Static keyword tables that turn captured text into a suggested quadrant,
//! an idea/question type, a UVP alignment hint and a gap-analysis challenge.

use crate::domain::{Category, IdeaType};

/// Phrases that signal fit with the "Flat Fee/High Tech" value proposition
const UVP_KEYWORDS: &[&str] = &[
    "flat fee", "1200", "transparent", "subscription",
    "cfa", "cfp", "fiduciary", "credential",
    "institutional", "process", "asset allocation", "risk management",
    "ai", "efficiency", "workflow", "automation",
    "interactive", "planning", "scenario", "dashboard",
];

/// Gap-analysis challenges, first match wins
const CHALLENGES: &[(&[&str], &str)] = &[
    (
        &["portal", "app", "mobile", "login", "digital"],
        "Does this integrate seamlessly with the client portal or mobile app to meet digital expectations?",
    ),
    (
        &["compliance", "adv", "regulation", "contract", "agreement"],
        "Has this been reviewed for compliance (ADV, advertising rules) to avoid regulatory issues?",
    ),
    (
        &["marketing", "mail", "postcard", "campaign", "lead"],
        "Is there a multi-touch follow-up strategy (e.g., calls, emails) to convert these leads?",
    ),
    (
        &["service", "meeting", "communication", "email", "touch"],
        "Does this add a personal touch or proactive communication to differentiate from robo-advisors?",
    ),
    (
        &["scale", "growth", "capacity", "hiring", "volume"],
        "How does this handle capacity if the client count doubles? Is it scalable?",
    ),
];

pub const DEFAULT_CHALLENGE: &str = "How does this specifically automate the workflow or reduce overhead?";

/// Quadrant keyword groups in priority order; anything else lands in D
const QUADRANT_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::A, &["client", "experience", "service", "portal", "onboarding"]),
    (Category::B, &["fee", "price", "value", "credential"]),
    (Category::C, &["market", "lead", "campaign", "growth"]),
];

pub const ALIGNED_FEEDBACK: &str = "This aligns well with your 'Flat Fee/High Tech' UVP.";
pub const UNALIGNED_FEEDBACK: &str = "This might need refinement to fit the 'Flat Fee/High Tech' model.";

/// Result of classifying one capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub aligned: bool,
    pub feedback: &'static str,
    pub suggested_category: Category,
    pub challenge_question: &'static str,
    pub idea_type: IdeaType,
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Detect whether the text reads as a question
pub fn detect_type(text: &str) -> IdeaType {
    let lower = text.to_lowercase();
    let is_question = text.trim().ends_with('?')
        || lower.starts_with("how")
        || lower.starts_with("what")
        || lower.starts_with("why")
        || lower.contains('?');

    if is_question {
        IdeaType::Question
    } else {
        IdeaType::Idea
    }
}

pub fn suggest_category(text: &str) -> Category {
    let lower = text.to_lowercase();
    QUADRANT_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(category, _)| *category)
        .unwrap_or(Category::D)
}

pub fn challenge_for(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    CHALLENGES
        .iter()
        .find(|(keywords, _)| contains_any(&lower, keywords))
        .map(|(_, question)| *question)
        .unwrap_or(DEFAULT_CHALLENGE)
}

pub fn is_aligned(text: &str) -> bool {
    contains_any(&text.to_lowercase(), UVP_KEYWORDS)
}

/// Classify captured text
pub fn analyze_idea(text: &str) -> Analysis {
    let aligned = is_aligned(text);
    Analysis {
        aligned,
        feedback: if aligned { ALIGNED_FEEDBACK } else { UNALIGNED_FEEDBACK },
        suggested_category: suggest_category(text),
        challenge_question: challenge_for(text),
        idea_type: detect_type(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_question_mark() {
        for text in ["Should we hire?", "fees?  ", "Is it ready ?"] {
            assert_eq!(detect_type(text), IdeaType::Question, "{text}");
        }
    }

    #[test]
    fn test_plain_statements_are_ideas() {
        for text in ["Launch a newsletter", "Quarterly review packets", ""] {
            assert_eq!(detect_type(text), IdeaType::Idea, "{text}");
        }
    }

    #[test]
    fn test_question_words_and_inner_question_mark() {
        assert_eq!(detect_type("How do we onboard faster"), IdeaType::Question);
        assert_eq!(detect_type("WHY not both"), IdeaType::Question);
        assert_eq!(detect_type("What if"), IdeaType::Question);
        assert_eq!(detect_type("Pricing? maybe later"), IdeaType::Question);
    }

    #[test]
    fn test_onboarding_goes_to_client_experience() {
        assert_eq!(suggest_category("Client Onboarding flow"), Category::A);
        assert_eq!(suggest_category("smoother onboarding"), Category::A);
    }

    #[test]
    fn test_client_group_wins_over_fee_group() {
        assert_eq!(suggest_category("flat fee pricing for new clients"), Category::A);
    }

    #[test]
    fn test_priority_order_between_b_and_c() {
        assert_eq!(suggest_category("price the campaign"), Category::B);
        assert_eq!(suggest_category("lead magnet"), Category::C);
        assert_eq!(suggest_category("office plants"), Category::D);
    }

    #[test]
    fn test_mobile_upload_question() {
        let analysis = analyze_idea("Will clients use a mobile app to upload documents?");
        assert_eq!(analysis.idea_type, IdeaType::Question);
        // "clients" contains "client"
        assert_eq!(analysis.suggested_category, Category::A);
        assert_eq!(analysis.challenge_question, CHALLENGES[0].1);
    }

    #[test]
    fn test_challenge_order_and_default() {
        assert_eq!(challenge_for("new compliance checklist"), CHALLENGES[1].1);
        assert_eq!(challenge_for("Postcard mailer"), CHALLENGES[2].1);
        assert_eq!(challenge_for("weekly meeting notes"), CHALLENGES[3].1);
        assert_eq!(challenge_for("hiring plan"), CHALLENGES[4].1);
        assert_eq!(challenge_for("quiet office"), DEFAULT_CHALLENGE);
        // portal set is checked before the compliance set
        assert_eq!(challenge_for("contract signing in the portal"), CHALLENGES[0].1);
    }

    #[test]
    fn test_alignment_feedback() {
        let aligned = analyze_idea("Transparent flat fee page");
        assert!(aligned.aligned);
        assert_eq!(aligned.feedback, ALIGNED_FEEDBACK);

        let unaligned = analyze_idea("Buy a boat");
        assert!(!unaligned.aligned);
        assert_eq!(unaligned.feedback, UNALIGNED_FEEDBACK);
    }
}
