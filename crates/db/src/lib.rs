//! lexnova-db – Session-Registry und Transkript-Speicher
//!
//! Dieses Crate stellt das Repository-Pattern bereit. Die SQLite-Implementierung
//! (`SqliteDb`) deckt sowohl die Session-Registry als auch das
//! append-only Transkript ab.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::DbError;
pub use repository::{
    DatabaseBackend, DatabaseConfig, DbResult, SessionRepository, TranscriptRepository,
};
pub use sqlite::SqliteDb;
