//! Reservation persistence.
//!
//! The confirmation handler owns a finalized record only until it hands it
//! to [`ReservationRepository::save`]; after that the durable copy belongs
//! to the store. A storage failure is signalled as a distinguishable error
//! so the caller can keep the session alive for a retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use maitred_core::reservation::{NewReservation, ReservationId};

use crate::DbPool;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("storage rejected the reservation: {0}")]
    Storage(String),
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Durably store a confirmed reservation, returning its generated
    /// identifier.
    async fn save(&self, reservation: NewReservation) -> Result<ReservationId, RepositoryError>;
}

pub struct SqlReservationRepository {
    pool: DbPool,
}

impl SqlReservationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepository for SqlReservationRepository {
    async fn save(&self, reservation: NewReservation) -> Result<ReservationId, RepositoryError> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO reservations (id, date, time, guests, name, contact, confirmed, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(reservation.date)
        .bind(&reservation.time)
        .bind(reservation.guests)
        .bind(&reservation.name)
        .bind(&reservation.contact)
        .bind(reservation.confirmed)
        .bind(reservation.created_at)
        .execute(&self.pool)
        .await?;

        Ok(ReservationId(id))
    }
}

/// Recording test double. Counts saves and can be armed to fail the next
/// one, which is how the save-failure retry path is exercised.
#[derive(Default)]
pub struct InMemoryReservationRepository {
    saved: Mutex<Vec<NewReservation>>,
    fail_next: AtomicBool,
}

impl InMemoryReservationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_save(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn saved(&self) -> Vec<NewReservation> {
        self.saved.lock().expect("repository lock poisoned").clone()
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().expect("repository lock poisoned").len()
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn save(&self, reservation: NewReservation) -> Result<ReservationId, RepositoryError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Storage("simulated storage failure".to_string()));
        }
        let mut saved = self.saved.lock().expect("repository lock poisoned");
        saved.push(reservation);
        Ok(ReservationId(format!("mem-{}", saved.len())))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use sqlx::Row;

    use maitred_core::config::DatabaseConfig;
    use maitred_core::reservation::NewReservation;

    use super::{
        InMemoryReservationRepository, RepositoryError, ReservationRepository,
        SqlReservationRepository,
    };
    use crate::{connect, migrations};

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            timeout_secs: 5,
        }
    }

    fn sample_reservation() -> NewReservation {
        NewReservation {
            date: NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"),
            time: "20:00".to_string(),
            guests: 4,
            name: "Ada Lovelace".to_string(),
            contact: "ada@example.com".to_string(),
            confirmed: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn sql_repository_persists_and_returns_an_id() {
        let pool = connect(&memory_config()).await.expect("pool should connect");
        migrations::run_pending(&pool).await.expect("migrations should apply");

        let repository = SqlReservationRepository::new(pool.clone());
        let id = repository.save(sample_reservation()).await.expect("save should succeed");
        assert!(!id.0.is_empty());

        let row = sqlx::query("SELECT name, guests, confirmed FROM reservations WHERE id = ?")
            .bind(&id.0)
            .fetch_one(&pool)
            .await
            .expect("row should exist");
        assert_eq!(row.get::<String, _>("name"), "Ada Lovelace");
        assert_eq!(row.get::<i64, _>("guests"), 4);
        assert_eq!(row.get::<bool, _>("confirmed"), true);

        pool.close().await;
    }

    #[tokio::test]
    async fn sql_repository_surfaces_storage_failure() {
        let pool = connect(&memory_config()).await.expect("pool should connect");
        // No migrations: the insert must fail and map into RepositoryError.
        let repository = SqlReservationRepository::new(pool.clone());

        let result = repository.save(sample_reservation()).await;
        assert!(matches!(result, Err(RepositoryError::Database(_))));

        pool.close().await;
    }

    #[tokio::test]
    async fn in_memory_repository_records_saves_and_can_fail_on_demand() {
        let repository = InMemoryReservationRepository::new();

        repository.fail_next_save();
        let failed = repository.save(sample_reservation()).await;
        assert!(matches!(failed, Err(RepositoryError::Storage(_))));
        assert_eq!(repository.save_count(), 0);

        let id = repository.save(sample_reservation()).await.expect("save should succeed");
        assert_eq!(id.0, "mem-1");
        assert_eq!(repository.save_count(), 1);
    }
}
