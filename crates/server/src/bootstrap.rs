use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tower_http::services::ServeDir;
use tracing::info;

use maitred_agent::confirmation::ConfirmationHandler;
use maitred_agent::oracle::OpenAiChatOracle;
use maitred_agent::orchestrator::Orchestrator;
use maitred_agent::session::SessionStore;
use maitred_core::config::{AppConfig, ConfigError, LoadOptions};
use maitred_core::errors::OracleError;
use maitred_db::{connect, migrations, DbPool};

use crate::health;
use crate::routes::{self, ChatState};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub router: Router,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("oracle client construction failed: {0}")]
    Oracle(#[from] OracleError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let oracle = Arc::new(OpenAiChatOracle::new(&config.llm)?);
    let store = Arc::new(SessionStore::new());
    let repository = Arc::new(maitred_db::SqlReservationRepository::new(db_pool.clone()));

    let state = ChatState {
        orchestrator: Arc::new(Orchestrator::new(store.clone(), oracle)),
        confirmation: Arc::new(ConfirmationHandler::new(store.clone(), repository)),
    };

    let router = routes::router(state)
        .merge(health::router(db_pool.clone(), store))
        .fallback_service(ServeDir::new(&config.server.static_dir));

    Ok(Application { config, db_pool, router })
}
