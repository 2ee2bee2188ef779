//! Slot-filling phase: one dialogue turn from user message to reply.

use std::sync::Arc;

use chrono::Local;

use maitred_core::dialogue::{OracleReply, Turn, SAVE_RESERVATION_TOOL};
use maitred_core::reservation::{validate, ReservationDraft};

use crate::oracle::LlmOracle;
use crate::session::{SessionId, SessionStore};

/// Reply payload for one slot-filling turn. `needs_confirmation` tells the
/// caller that the next message on this session must be a yes/no answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatOutcome {
    pub reply: String,
    pub needs_confirmation: bool,
}

impl ChatOutcome {
    fn reply(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), needs_confirmation: false }
    }
}

pub struct Orchestrator {
    store: Arc<SessionStore>,
    oracle: Arc<dyn LlmOracle>,
}

impl Orchestrator {
    pub fn new(store: Arc<SessionStore>, oracle: Arc<dyn LlmOracle>) -> Self {
        Self { store, oracle }
    }

    /// Run one turn: append the user message, consult the oracle with the
    /// full transcript, and either pass its utterance through or, on a
    /// `save_reservation` tool call, parse and validate the collected slots
    /// and stage them for confirmation.
    ///
    /// The transcript always keeps the turn, even when parsing or
    /// validation fails; only `collected` stays untouched on failure.
    pub async fn handle_message(&self, session_id: &SessionId, message: &str) -> ChatOutcome {
        let mut session = self.store.snapshot(session_id).await;
        session.transcript.push(Turn::user(message));

        let oracle_reply = self.oracle.reply(&session.transcript).await;
        if let Some(content) = oracle_reply.content() {
            session.transcript.push(Turn::assistant(content));
        }

        let outcome = match oracle_reply {
            OracleReply::Text(content) => ChatOutcome::reply(content),
            OracleReply::ToolCall { content, call } if call.name != SAVE_RESERVATION_TOOL => {
                // An unknown tool is treated as a plain conversational turn.
                tracing::warn!(
                    event_name = "dialogue.unknown_tool",
                    session_id = %session_id,
                    tool = %call.name,
                    "oracle invoked an undeclared tool"
                );
                ChatOutcome::reply(content.unwrap_or_default())
            }
            OracleReply::ToolCall { call, .. } => {
                match serde_json::from_str::<ReservationDraft>(&call.arguments) {
                    Err(error) => {
                        tracing::warn!(
                            event_name = "dialogue.tool_arguments_rejected",
                            session_id = %session_id,
                            error = %error,
                            "could not parse save_reservation arguments"
                        );
                        ChatOutcome::reply("Failed to parse reservation data")
                    }
                    Ok(draft) => Self::stage_for_confirmation(&mut session, session_id, draft),
                }
            }
        };

        self.store.replace(session_id, session).await;
        outcome
    }

    fn stage_for_confirmation(
        session: &mut crate::session::Session,
        session_id: &SessionId,
        draft: ReservationDraft,
    ) -> ChatOutcome {
        let today = Local::now().date_naive();
        let violations = validate(&draft, today);
        if !violations.is_empty() {
            tracing::info!(
                event_name = "dialogue.slots_rejected",
                session_id = %session_id,
                violation_count = violations.len(),
                "collected slots failed validation"
            );
            return ChatOutcome::reply(format!("Validation errors: {}", violations.join(", ")));
        }

        tracing::info!(
            event_name = "dialogue.slots_collected",
            session_id = %session_id,
            "all slots collected, awaiting confirmation"
        );
        let prompt = draft.confirmation_prompt();
        session.collected = Some(draft);
        ChatOutcome { reply: prompt, needs_confirmation: true }
    }
}
