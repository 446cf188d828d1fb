//! SQLite-Backend-Implementierungen fuer alle Repository-Traits

pub mod pool;
pub mod sessions;
pub mod transcripts;

pub use pool::SqliteDb;

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::DbResult;

pub(crate) fn parse_uuid(row: &sqlx::sqlite::SqliteRow, col: &str) -> DbResult<Uuid> {
    let s: String = row.try_get(col)?;
    Uuid::parse_str(&s).map_err(|e| DbError::intern(format!("Ungueltige UUID in '{col}': {e}")))
}

pub(crate) fn parse_datetime(row: &sqlx::sqlite::SqliteRow, col: &str) -> DbResult<DateTime<Utc>> {
    let s: String = row.try_get(col)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::intern(format!("Ungueltige DateTime in '{col}': {e}")))
}

pub(crate) fn parse_opt_datetime(
    row: &sqlx::sqlite::SqliteRow,
    col: &str,
) -> DbResult<Option<DateTime<Utc>>> {
    let s: Option<String> = row.try_get(col)?;
    s.as_deref()
        .map(|v| {
            DateTime::parse_from_rfc3339(v)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| DbError::intern(format!("Ungueltige DateTime in '{col}': {e}")))
        })
        .transpose()
}
