//! Confirmation intent classification.
//!
//! Deliberately strict: the utterance is case-folded, trimmed, and matched
//! exactly against two closed word lists. Anything outside the lists is
//! ambiguous and surfaces back to the guest as a re-ask instead of being
//! guessed at.

/// Classified meaning of a reply to a yes/no confirmation prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmationIntent {
    Affirmative,
    Negative,
    Ambiguous,
}

const AFFIRMATIVE_WORDS: &[&str] = &[
    "yeah",
    "yes",
    "agreed",
    "ok",
    "alright",
    "yep",
    "confirm",
    "booked",
    "i agree",
    "okay",
    "sure",
    "everything ok",
    "proceed",
    "confirmed",
];

const NEGATIVE_WORDS: &[&str] = &[
    "no",
    "cancel",
    "nothing",
    "none",
    "nevermind",
    "not coming",
    "cancelled",
    "pleas cancel",
    "nope",
    "sorry",
];

pub fn classify(utterance: &str) -> ConfirmationIntent {
    let normalized = utterance.trim().to_lowercase();
    if AFFIRMATIVE_WORDS.contains(&normalized.as_str()) {
        ConfirmationIntent::Affirmative
    } else if NEGATIVE_WORDS.contains(&normalized.as_str()) {
        ConfirmationIntent::Negative
    } else {
        ConfirmationIntent::Ambiguous
    }
}
