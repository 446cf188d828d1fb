//! SQLite-Implementierung des TranscriptRepository
//!
//! Die Tabelle ist append-only: es gibt weder UPDATE noch DELETE.

use sqlx::Row;
use uuid::Uuid;

use crate::error::{eindeutigkeit_abbilden, DbError};
use crate::models::{NeuerTranskriptEintrag, TranskriptRecord};
use crate::repository::{DbResult, TranscriptRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{parse_datetime, parse_uuid};

impl TranscriptRepository for SqliteDb {
    async fn append(&self, data: NeuerTranskriptEintrag<'_>) -> DbResult<TranskriptRecord> {
        if data.speaker.trim().is_empty() || data.text.trim().is_empty() {
            return Err(DbError::UngueltigeDaten(
                "Sprecher und Text duerfen nicht leer sein".into(),
            ));
        }

        sqlx::query(
            "INSERT INTO transcripts (id, session_id, sequence, speaker, text, source, timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(data.id.to_string())
        .bind(data.session_id.to_string())
        .bind(data.sequence)
        .bind(data.speaker)
        .bind(data.text)
        .bind(data.source.als_str())
        .bind(data.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            eindeutigkeit_abbilden(e, || {
                format!(
                    "Eintrag {} fuer Session {} existiert bereits",
                    data.sequence, data.session_id
                )
            })
        })?;

        Ok(TranskriptRecord {
            id: data.id,
            session_id: data.session_id,
            sequence: data.sequence,
            speaker: data.speaker.to_string(),
            text: data.text.to_string(),
            source: data.source,
            timestamp: data.timestamp,
        })
    }

    async fn get_by_sequence(
        &self,
        session_id: Uuid,
        sequence: i64,
    ) -> DbResult<Option<TranskriptRecord>> {
        let row = sqlx::query(
            "SELECT id, session_id, sequence, speaker, text, source, timestamp
             FROM transcripts WHERE session_id = ? AND sequence = ?",
        )
        .bind(session_id.to_string())
        .bind(sequence)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_eintrag(&r)).transpose()
    }

    async fn list_for_session(&self, session_id: Uuid) -> DbResult<Vec<TranskriptRecord>> {
        let rows = sqlx::query(
            "SELECT id, session_id, sequence, speaker, text, source, timestamp
             FROM transcripts WHERE session_id = ?
             ORDER BY sequence ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_eintrag).collect()
    }

    async fn last_for_session(&self, session_id: Uuid) -> DbResult<Option<TranskriptRecord>> {
        let row = sqlx::query(
            "SELECT id, session_id, sequence, speaker, text, source, timestamp
             FROM transcripts WHERE session_id = ?
             ORDER BY sequence DESC LIMIT 1",
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_eintrag(&r)).transpose()
    }

    async fn count_for_session(&self, session_id: Uuid) -> DbResult<i64> {
        let anzahl: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transcripts WHERE session_id = ?")
                .bind(session_id.to_string())
                .fetch_one(&self.pool)
                .await?;
        Ok(anzahl)
    }
}

fn row_to_eintrag(row: &sqlx::sqlite::SqliteRow) -> DbResult<TranskriptRecord> {
    let source_str: String = row.try_get("source")?;
    Ok(TranskriptRecord {
        id: parse_uuid(row, "id")?,
        session_id: parse_uuid(row, "session_id")?,
        sequence: row.try_get("sequence")?,
        speaker: row.try_get("speaker")?,
        text: row.try_get("text")?,
        source: source_str.parse().map_err(DbError::UngueltigeDaten)?,
        timestamp: parse_datetime(row, "timestamp")?,
    })
}
