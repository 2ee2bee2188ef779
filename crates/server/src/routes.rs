//! Chat API routes.
//!
//! JSON endpoints, field names matching the browser client:
//! - `POST /api/reservations/create`  takes `{message, sessionId?}` and
//!   returns `{reply, sessionId, needsConfirmation?}`
//! - `POST /api/reservations/confirm` takes `{sessionId, confirmation}` and
//!   returns `{reply, sessionId, reservationId?, needsConfirmation?}`
//!
//! Protocol misuse (empty message, missing sessionId) is rejected with a
//! 400 and an error payload of the same `{reply}` shape the client already
//! renders; it never reaches the oracle or the database.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use maitred_agent::confirmation::ConfirmationHandler;
use maitred_agent::orchestrator::Orchestrator;
use maitred_agent::session::SessionId;
use maitred_core::errors::ClientError;

#[derive(Clone)]
pub struct ChatState {
    pub orchestrator: Arc<Orchestrator>,
    pub confirmation: Arc<ConfirmationHandler>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub confirmation: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub reply: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_confirmation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub reply: String,
}

pub fn router(state: ChatState) -> Router {
    Router::new()
        .route("/api/reservations/create", post(create_or_continue))
        .route("/api/reservations/confirm", post(confirm))
        .with_state(state)
}

fn client_error(error: ClientError) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { reply: error.to_string() }))
}

async fn create_or_continue(
    State(state): State<ChatState>,
    Json(request): Json<CreateRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.message.trim().is_empty() {
        return Err(client_error(ClientError::EmptyMessage));
    }

    let session_id = match request.session_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => SessionId::new(id),
        None => SessionId::generate(),
    };

    let outcome = state.orchestrator.handle_message(&session_id, &request.message).await;

    Ok(Json(ChatResponse {
        reply: outcome.reply,
        session_id: session_id.to_string(),
        needs_confirmation: outcome.needs_confirmation.then_some(true),
        reservation_id: None,
    }))
}

async fn confirm(
    State(state): State<ChatState>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(session_id) = request.session_id.filter(|id| !id.trim().is_empty()) else {
        return Err(client_error(ClientError::MissingSessionId));
    };
    let session_id = SessionId::new(session_id);

    let outcome = state.confirmation.handle_confirmation(&session_id, &request.confirmation).await;

    Ok(Json(ChatResponse {
        reply: outcome.reply,
        session_id: session_id.to_string(),
        needs_confirmation: outcome.needs_confirmation.then_some(true),
        reservation_id: outcome.reservation_id.map(|id| id.0),
    }))
}
