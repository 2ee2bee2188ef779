//! Confirmation phase: the yes/no handshake over staged slots.

use std::sync::Arc;

use chrono::Utc;

use maitred_core::intent::{classify, ConfirmationIntent};
use maitred_core::reservation::{NewReservation, ReservationDraft, ReservationId};
use maitred_db::repository::ReservationRepository;

use crate::session::{SessionId, SessionStore};

/// Reply payload for one confirmation turn. `reservation_id` is set only
/// when the booking was durably persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmOutcome {
    pub reply: String,
    pub reservation_id: Option<ReservationId>,
    pub needs_confirmation: bool,
}

impl ConfirmOutcome {
    fn reply(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), reservation_id: None, needs_confirmation: false }
    }
}

pub struct ConfirmationHandler {
    store: Arc<SessionStore>,
    repository: Arc<dyn ReservationRepository>,
}

impl ConfirmationHandler {
    pub fn new(store: Arc<SessionStore>, repository: Arc<dyn ReservationRepository>) -> Self {
        Self { store, repository }
    }

    /// Resolve the guest's answer to the pending-confirmation question.
    ///
    /// - affirmative: persist, clear the session, restate the booking with
    ///   its identifier. A storage failure keeps the session so the guest
    ///   can simply confirm again.
    /// - negative: acknowledge the cancellation and clear the session, so
    ///   the next message starts a fresh conversation.
    /// - ambiguous: re-ask the original question from the stored slots
    ///   without mutating anything.
    pub async fn handle_confirmation(
        &self,
        session_id: &SessionId,
        confirmation: &str,
    ) -> ConfirmOutcome {
        let session = self.store.snapshot(session_id).await;
        let Some(draft) = session.collected else {
            return ConfirmOutcome::reply("No pending reservation");
        };

        match classify(confirmation) {
            ConfirmationIntent::Affirmative => self.persist(session_id, draft).await,
            ConfirmationIntent::Negative => {
                tracing::info!(
                    event_name = "confirmation.cancelled",
                    session_id = %session_id,
                    "reservation cancelled by guest"
                );
                self.store.clear(session_id).await;
                ConfirmOutcome::reply("Reservation cancelled!")
            }
            ConfirmationIntent::Ambiguous => ConfirmOutcome {
                reply: format!("Could not understand, please {}", draft.confirmation_prompt()),
                reservation_id: None,
                needs_confirmation: true,
            },
        }
    }

    async fn persist(&self, session_id: &SessionId, draft: ReservationDraft) -> ConfirmOutcome {
        // The draft was validated before it was staged, so the date parses;
        // if it somehow does not, fail like a storage error and keep the
        // session.
        let Some(date) = draft.parsed_date() else {
            tracing::error!(
                event_name = "confirmation.invalid_staged_date",
                session_id = %session_id,
                date = %draft.date,
                "staged slot set holds an unparseable date"
            );
            return ConfirmOutcome::reply("Failed to save reservation");
        };

        let record = NewReservation {
            date,
            time: draft.time.clone(),
            guests: draft.guests,
            name: draft.name.clone(),
            contact: draft.contact.clone(),
            confirmed: true,
            created_at: Utc::now(),
        };

        match self.repository.save(record).await {
            Ok(reservation_id) => {
                self.store.clear(session_id).await;
                tracing::info!(
                    event_name = "confirmation.persisted",
                    session_id = %session_id,
                    reservation_id = %reservation_id,
                    "reservation persisted and session cleared"
                );
                ConfirmOutcome {
                    reply: format!(
                        "Thank you {}. You have booked a table for {} people on {} at {}. \
                         We'll be reaching out to you at {}. Your reservation reference is {}.",
                        draft.name,
                        draft.guests,
                        draft.date,
                        draft.time,
                        draft.contact,
                        reservation_id
                    ),
                    reservation_id: Some(reservation_id),
                    needs_confirmation: false,
                }
            }
            Err(error) => {
                tracing::error!(
                    event_name = "confirmation.persist_failed",
                    session_id = %session_id,
                    error = %error,
                    "reservation save failed, session kept for retry"
                );
                ConfirmOutcome::reply("Failed to save reservation")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use maitred_core::reservation::ReservationDraft;
    use maitred_db::repository::InMemoryReservationRepository;

    use super::{ConfirmOutcome, ConfirmationHandler};
    use crate::session::{SessionId, SessionStore};

    fn staged_draft() -> ReservationDraft {
        ReservationDraft {
            date: "2099-06-01".to_string(),
            time: "20:00".to_string(),
            guests: 4,
            name: "Ada".to_string(),
            contact: "ada@example.com".to_string(),
        }
    }

    async fn handler_with_staged_slots(
    ) -> (ConfirmationHandler, Arc<SessionStore>, Arc<InMemoryReservationRepository>, SessionId)
    {
        let store = Arc::new(SessionStore::new());
        let repository = Arc::new(InMemoryReservationRepository::new());
        let session_id = SessionId::generate();

        let mut session = store.snapshot(&session_id).await;
        session.collected = Some(staged_draft());
        store.replace(&session_id, session).await;

        (ConfirmationHandler::new(store.clone(), repository.clone()), store, repository, session_id)
    }

    #[tokio::test]
    async fn confirming_without_staged_slots_is_a_guarded_no_op() {
        let store = Arc::new(SessionStore::new());
        let repository = Arc::new(InMemoryReservationRepository::new());
        let handler = ConfirmationHandler::new(store.clone(), repository.clone());
        let session_id = SessionId::generate();

        let outcome = handler.handle_confirmation(&session_id, "yes").await;

        assert_eq!(outcome, ConfirmOutcome::reply("No pending reservation"));
        assert_eq!(repository.save_count(), 0);
    }

    #[tokio::test]
    async fn affirmative_persists_once_clears_the_session_and_reports_the_id() {
        let (handler, store, repository, session_id) = handler_with_staged_slots().await;

        let outcome = handler.handle_confirmation(&session_id, " YES ").await;

        assert_eq!(repository.save_count(), 1);
        let reservation_id = outcome.reservation_id.expect("persisted id");
        assert!(outcome.reply.contains(&reservation_id.0));
        assert!(outcome.reply.contains("4 people"));
        assert!(outcome.reply.contains("2099-06-01"));
        assert!(outcome.reply.contains("20:00"));
        assert!(outcome.reply.contains("ada@example.com"));
        assert!(!store.contains(&session_id).await);

        let saved = repository.saved();
        assert!(saved[0].confirmed);
        assert_eq!(saved[0].guests, 4);
    }

    #[tokio::test]
    async fn save_failure_keeps_the_session_for_retry() {
        let (handler, store, repository, session_id) = handler_with_staged_slots().await;
        repository.fail_next_save();

        let outcome = handler.handle_confirmation(&session_id, "yes").await;

        assert_eq!(outcome, ConfirmOutcome::reply("Failed to save reservation"));
        assert!(store.contains(&session_id).await);
        assert!(store.snapshot(&session_id).await.collected.is_some());

        // The retry goes through against the same staged slots.
        let retried = handler.handle_confirmation(&session_id, "yes").await;
        assert!(retried.reservation_id.is_some());
        assert_eq!(repository.save_count(), 1);
        assert!(!store.contains(&session_id).await);
    }

    #[tokio::test]
    async fn negative_cancels_and_clears_the_session() {
        let (handler, store, repository, session_id) = handler_with_staged_slots().await;

        let outcome = handler.handle_confirmation(&session_id, "no").await;

        assert_eq!(outcome, ConfirmOutcome::reply("Reservation cancelled!"));
        assert_eq!(repository.save_count(), 0);
        assert!(!store.contains(&session_id).await);
    }

    #[tokio::test]
    async fn ambiguous_re_asks_with_the_stored_slots_and_mutates_nothing() {
        let (handler, store, repository, session_id) = handler_with_staged_slots().await;
        let before = store.snapshot(&session_id).await;

        let outcome = handler.handle_confirmation(&session_id, "maybe").await;

        assert!(outcome.needs_confirmation);
        assert_eq!(
            outcome.reply,
            "Could not understand, please CONFIRM: Reserve for 2099-06-01 at 20:00 for 4 people ?"
        );
        assert_eq!(repository.save_count(), 0);
        assert_eq!(store.snapshot(&session_id).await, before);

        // A later unambiguous answer still resolves against the same slots.
        let resolved = handler.handle_confirmation(&session_id, "yes").await;
        assert!(resolved.reservation_id.is_some());
    }
}
