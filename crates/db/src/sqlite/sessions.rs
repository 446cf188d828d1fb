//! SQLite-Implementierung des SessionRepository

use chrono::{DateTime, Utc};
use lexnova_core::SessionStatus;
use sqlx::Row;
use uuid::Uuid;

use crate::error::{eindeutigkeit_abbilden, DbError};
use crate::models::{AiConfig, NeueSession, SessionRecord};
use crate::repository::{DbResult, SessionRepository};
use crate::sqlite::pool::SqliteDb;
use crate::sqlite::{parse_datetime, parse_opt_datetime, parse_uuid};

const SESSION_SPALTEN: &str = "id, groom_name, bride_name, date, status, script_content,
    ai_voice_style, ai_strictness, room_name, session_code, session_code_expires,
    created_at, started_at, completed_at";

impl SessionRepository for SqliteDb {
    async fn create(&self, data: NeueSession<'_>) -> DbResult<SessionRecord> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO sessions
               (id, groom_name, bride_name, date, status, script_content, ai_voice_style,
                ai_strictness, room_name, session_code, session_code_expires, created_at)
             VALUES (?, ?, ?, ?, 'pending', NULL, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id_str)
        .bind(data.groom_name)
        .bind(data.bride_name)
        .bind(data.date)
        .bind(data.ai_config.voice_style.als_str())
        .bind(data.ai_config.strictness.als_str())
        // Raumname = Session-ID
        .bind(&id_str)
        .bind(data.session_code)
        .bind(data.session_code_expires.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            eindeutigkeit_abbilden(e, || {
                format!("Session-Code '{}' bereits vergeben", data.session_code)
            })
        })?;

        tracing::debug!(session_id = %id, "Session angelegt");

        Ok(SessionRecord {
            id,
            groom_name: data.groom_name.to_string(),
            bride_name: data.bride_name.to_string(),
            date: data.date.to_string(),
            status: SessionStatus::Pending,
            script_content: None,
            ai_config: data.ai_config,
            room_name: id_str,
            session_code: data.session_code.to_string(),
            session_code_expires: data.session_code_expires,
            created_at: now,
            started_at: None,
            completed_at: None,
        })
    }

    async fn get(&self, id: Uuid) -> DbResult<Option<SessionRecord>> {
        let row = sqlx::query(&format!("SELECT {SESSION_SPALTEN} FROM sessions WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_session(&r)).transpose()
    }

    async fn get_by_code(&self, code: &str) -> DbResult<Option<SessionRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_SPALTEN} FROM sessions WHERE session_code = ?"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_session(&r)).transpose()
    }

    async fn list(&self) -> DbResult<Vec<SessionRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {SESSION_SPALTEN} FROM sessions ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_session).collect()
    }

    async fn list_by_status(&self, status: SessionStatus) -> DbResult<Vec<SessionRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {SESSION_SPALTEN} FROM sessions WHERE status = ? ORDER BY created_at ASC"
        ))
        .bind(status.als_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_session).collect()
    }

    async fn update_script(&self, id: Uuid, script: &str) -> DbResult<SessionRecord> {
        let affected = sqlx::query(
            "UPDATE sessions SET script_content = ?, status = 'ready'
             WHERE id = ? AND status IN ('pending', 'ready')",
        )
        .bind(script)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(self.konflikt_oder_fehlend(id, "pending|ready").await);
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::nicht_gefunden(id.to_string()))
    }

    async fn update_status(
        &self,
        id: Uuid,
        erwartet: SessionStatus,
        neu: SessionStatus,
        zeitpunkt: DateTime<Utc>,
    ) -> DbResult<SessionRecord> {
        let zeit_str = zeitpunkt.to_rfc3339();
        let started = (neu == SessionStatus::Active).then_some(zeit_str.as_str());
        let completed = (neu == SessionStatus::Completed).then_some(zeit_str.as_str());

        // Row-Level Compare-and-Set: nur ein Aufrufer gewinnt
        let affected = sqlx::query(
            "UPDATE sessions
             SET status = ?,
                 started_at = COALESCE(?, started_at),
                 completed_at = COALESCE(?, completed_at)
             WHERE id = ? AND status = ?",
        )
        .bind(neu.als_str())
        .bind(started)
        .bind(completed)
        .bind(id.to_string())
        .bind(erwartet.als_str())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(self.konflikt_oder_fehlend(id, erwartet.als_str()).await);
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::nicht_gefunden(id.to_string()))
    }

    async fn update_code(
        &self,
        id: Uuid,
        code: &str,
        laeuft_ab_am: DateTime<Utc>,
    ) -> DbResult<SessionRecord> {
        let affected = sqlx::query(
            "UPDATE sessions SET session_code = ?, session_code_expires = ? WHERE id = ?",
        )
        .bind(code)
        .bind(laeuft_ab_am.to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| eindeutigkeit_abbilden(e, || format!("Session-Code '{code}' bereits vergeben")))?
        .rows_affected();

        if affected == 0 {
            return Err(DbError::nicht_gefunden(id.to_string()));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::nicht_gefunden(id.to_string()))
    }
}

impl SqliteDb {
    /// Unterscheidet nach einem wirkungslosen UPDATE zwischen fehlender Zeile
    /// und abweichendem Status
    async fn konflikt_oder_fehlend(&self, id: Uuid, erwartet: &str) -> DbError {
        match SessionRepository::get(self, id).await {
            Ok(Some(session)) => DbError::StatusKonflikt {
                erwartet: erwartet.to_string(),
                aktuell: session.status.als_str().to_string(),
            },
            Ok(None) => DbError::nicht_gefunden(id.to_string()),
            Err(e) => e,
        }
    }
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> DbResult<SessionRecord> {
    let status_str: String = row.try_get("status")?;
    let status = status_str
        .parse::<SessionStatus>()
        .map_err(|e| DbError::UngueltigeDaten(e.to_string()))?;

    let style_str: String = row.try_get("ai_voice_style")?;
    let strictness_str: String = row.try_get("ai_strictness")?;
    let ai_config = AiConfig {
        voice_style: style_str.parse().map_err(DbError::UngueltigeDaten)?,
        strictness: strictness_str.parse().map_err(DbError::UngueltigeDaten)?,
    };

    Ok(SessionRecord {
        id: parse_uuid(row, "id")?,
        groom_name: row.try_get("groom_name")?,
        bride_name: row.try_get("bride_name")?,
        date: row.try_get("date")?,
        status,
        script_content: row.try_get("script_content")?,
        ai_config,
        room_name: row.try_get("room_name")?,
        session_code: row.try_get("session_code")?,
        session_code_expires: parse_datetime(row, "session_code_expires")?,
        created_at: parse_datetime(row, "created_at")?,
        started_at: parse_opt_datetime(row, "started_at")?,
        completed_at: parse_opt_datetime(row, "completed_at")?,
    })
}
