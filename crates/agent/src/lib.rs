//! Session-scoped dialogue engine for the maitred reservation assistant.
//!
//! This crate owns the two phases of a booking conversation:
//!
//! 1. **Slot filling** (`orchestrator`) - each user message is appended to
//!    the session transcript and sent to the LLM oracle together with the
//!    `save_reservation` tool schema. A tool invocation from the oracle
//!    means all slots have been collected; the set is validated and staged
//!    for confirmation.
//! 2. **Confirmation** (`confirmation`) - the guest's yes/no reply is
//!    classified strictly; an affirmative persists the reservation and
//!    clears the session, a negative cancels, anything ambiguous re-asks.
//!
//! The oracle never decides what is valid or what gets stored. It is a
//! translator; validation and persistence are deterministic and local.

pub mod confirmation;
pub mod oracle;
pub mod orchestrator;
pub mod session;

pub use confirmation::{ConfirmOutcome, ConfirmationHandler};
pub use oracle::{LlmOracle, OpenAiChatOracle, FALLBACK_REPLY};
pub use orchestrator::{ChatOutcome, Orchestrator};
pub use session::{Session, SessionId, SessionStore};
