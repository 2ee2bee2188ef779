//! Readiness endpoint.
//!
//! Reports whether the reservation database answers queries and how many
//! dialogue sessions are currently in flight. A failed database probe turns
//! the whole response `degraded` with a 503 so load balancers stop routing
//! bookings here; live sessions are informational only.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use maitred_agent::session::SessionStore;
use maitred_db::DbPool;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    store: Arc<SessionStore>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub active_sessions: usize,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool, store: Arc<SessionStore>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool, store })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database_reachable =
        sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&state.db_pool).await.is_ok();

    let payload = HealthResponse {
        status: if database_reachable { "ready" } else { "degraded" },
        database: if database_reachable { "reachable" } else { "unreachable" },
        active_sessions: state.store.active_count().await,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code =
        if database_reachable { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}
