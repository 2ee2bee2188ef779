//! Domain core for the maitred reservation assistant.
//!
//! Everything in this crate is pure and synchronous: the natural-language
//! date resolver, the confirmation intent classifier, the reservation slot
//! types and validator, the dialogue transcript types, and the shared
//! configuration and error taxonomy. Collaborator boundaries (LLM oracle,
//! persistence, HTTP) live in the `agent`, `db`, and `server` crates.

pub mod config;
pub mod dates;
pub mod dialogue;
pub mod errors;
pub mod intent;
pub mod reservation;

pub use dates::{format_date, resolve_date};
pub use dialogue::{OracleReply, Role, ToolCall, Turn, SAVE_RESERVATION_TOOL};
pub use errors::{ClientError, OracleError};
pub use intent::{classify, ConfirmationIntent};
pub use reservation::{NewReservation, ReservationDraft, ReservationId};
