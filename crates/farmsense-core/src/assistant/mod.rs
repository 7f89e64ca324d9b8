//! Keyword-matched canned advice responder.
//!
//! The assistant is a fixed rule table, not a language model: each rule pairs
//! a keyword family with one canned advice paragraph and a category. The
//! first rule with any keyword found in the message (case-insensitive
//! substring match) wins; a message matching nothing gets the general
//! fallback. Matching is deterministic, so the same message always yields
//! the same reply.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::alerts::AlertCategory;

/// One keyword family with its canned response.
struct ResponderRule {
    category: AlertCategory,
    keywords: &'static [&'static str],
    response: &'static str,
}

/// Rule order is the match precedence. Animal questions are the most common,
/// so that family is checked first.
static RESPONDER_RULES: &[ResponderRule] = &[
    ResponderRule {
        category: AlertCategory::Animal,
        keywords: &["animal", "cow", "cattle", "pig", "bird", "poultry", "livestock"],
        response: "For healthy livestock, check body temperature daily and watch for changes in \
                   appetite or behavior. Normal temperature is 38.0-39.5 \u{b0}C for cattle and \
                   38.7-39.8 \u{b0}C for pigs. Isolate animals showing unusual signs and contact \
                   your veterinarian if symptoms persist beyond 24 hours.",
    },
    ResponderRule {
        category: AlertCategory::Environment,
        keywords: &["environment", "soil", "water", "air"],
        response: "Good farm conditions start with clean water and stable soil. Keep soil pH \
                   between 5.5 and 8.5, test water sources regularly, and ventilate enclosed \
                   spaces to keep air quality up. Take measurements at the same time of day so \
                   readings stay comparable.",
    },
    ResponderRule {
        category: AlertCategory::Human,
        keywords: &["health", "human", "worker", "farmer"],
        response: "Farm workers should check temperature and pulse after heavy work in the heat. \
                   A resting heart rate of 60-100 bpm and a body temperature below 38.5 \u{b0}C \
                   are considered normal. Stay hydrated, take breaks in the shade, and see a \
                   doctor about persistent symptoms.",
    },
    ResponderRule {
        category: AlertCategory::General,
        keywords: &["disease", "symptom", "treatment", "illness"],
        response: "Early signs of illness include fever, reduced appetite, and behavioral \
                   changes. Record symptoms as soon as you notice them, keep affected subjects \
                   separated, and get professional advice before starting any treatment.",
    },
];

/// Reply for messages that match no keyword family.
const FALLBACK_RESPONSE: &str =
    "I can help with questions about animal care, environmental conditions, and farm worker \
     health. Try asking about a specific animal, a measurement, or a symptom you have observed.";

/// A canned assistant reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatReply {
    /// The advice paragraph.
    pub response: String,
    /// Which keyword family matched; `general` for the fallback.
    pub category: AlertCategory,
}

/// Picks the reply for a chat message.
///
/// Scans the rule table in order and returns the first family with any
/// keyword appearing anywhere in the lowercased message. Plain substring
/// matching is intentional: it is what makes "cows" and "cattle feed"
/// match the animal family.
#[must_use]
pub fn respond(message: &str) -> ChatReply {
    let haystack = message.to_lowercase();

    for rule in RESPONDER_RULES {
        if rule.keywords.iter().any(|keyword| haystack.contains(keyword)) {
            return ChatReply {
                response: rule.response.to_string(),
                category: rule.category,
            };
        }
    }

    ChatReply {
        response: FALLBACK_RESPONSE.to_string(),
        category: AlertCategory::General,
    }
}
