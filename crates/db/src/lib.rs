//! Persistence collaborator: SQLite pool, migrations, and the reservation
//! repository.

pub mod connection;
pub mod migrations;
pub mod repository;

pub use connection::{connect, DbPool};
pub use repository::{
    InMemoryReservationRepository, RepositoryError, ReservationRepository,
    SqlReservationRepository,
};
