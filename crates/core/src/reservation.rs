//! Reservation slot set and business-rule validation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::CANONICAL_FORMAT;

/// Candidate slot set parsed from the oracle's `save_reservation` tool
/// arguments. The oracle is untrusted, so the fields stay close to the wire:
/// the date is kept as text until validation and the whole set is checked
/// before it is ever shown to the guest for confirmation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReservationDraft {
    pub date: String,
    pub time: String,
    pub guests: i64,
    pub name: String,
    pub contact: String,
}

impl ReservationDraft {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), CANONICAL_FORMAT).ok()
    }

    /// The pending-confirmation question. The ambiguous-reply re-prompt must
    /// restate exactly this question from the stored slots.
    pub fn confirmation_prompt(&self) -> String {
        format!(
            "CONFIRM: Reserve for {} at {} for {} people ?",
            self.date, self.time, self.guests
        )
    }
}

/// Check the candidate slot set against the booking rules. Every violated
/// rule contributes its own message; an empty list means the set is valid.
///
/// Time-window and contact-format rules are enforced through the oracle's
/// system instructions rather than here; see DESIGN.md.
pub fn validate(draft: &ReservationDraft, today: NaiveDate) -> Vec<String> {
    let mut violations = Vec::new();

    match draft.parsed_date() {
        Some(date) if date < today => {
            violations.push("Date cannot be in the past.".to_string());
        }
        Some(_) => {}
        None => {
            violations.push(format!("Date `{}` is not a valid calendar date.", draft.date));
        }
    }

    if draft.guests <= 0 {
        violations.push("Number of guests must be positive.".to_string());
    }

    violations
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationId(pub String);

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated, guest-confirmed reservation, ready to be persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewReservation {
    pub date: NaiveDate,
    pub time: String,
    pub guests: i64,
    pub name: String,
    pub contact: String,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
}
