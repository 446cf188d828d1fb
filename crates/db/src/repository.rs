//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Interview-Logik von der konkreten
//! Datenbank-Implementierung. Alle Methoden liefern `Send`-Futures, damit
//! die Pipeline einer Session auf einem eigenen tokio-Task laufen kann.

use std::future::Future;

use chrono::{DateTime, Utc};
use lexnova_core::SessionStatus;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NeueSession, NeuerTranskriptEintrag, SessionRecord, TranskriptRecord};

/// Result-Alias fuer alle Repository-Operationen
pub type DbResult<T> = Result<T, DbError>;

/// Unterstuetzte Datenbank-Backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseBackend {
    /// SQLite – Standard fuer Single-Instance-Betrieb
    Sqlite,
}

impl std::fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "SQLite"),
        }
    }
}

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Ausgewaehltes Backend
    pub backend: DatabaseBackend,
    /// Verbindungs-URL (z.B. "sqlite://lexnova.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus bei SQLite aktiviert werden soll
    pub sqlite_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Sqlite,
            url: "sqlite://lexnova.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

/// Session-Registry
pub trait SessionRepository: Send + Sync {
    /// Legt eine neue Session im Status `pending` an
    ///
    /// Ein bereits vergebener Session-Code ergibt `DbError::Eindeutigkeit`.
    fn create(&self, data: NeueSession<'_>) -> impl Future<Output = DbResult<SessionRecord>> + Send;

    /// Laedt eine Session anhand ihrer ID
    fn get(&self, id: Uuid) -> impl Future<Output = DbResult<Option<SessionRecord>>> + Send;

    /// Laedt eine Session anhand ihres (normalisierten) Beitrittscodes
    fn get_by_code(&self, code: &str)
        -> impl Future<Output = DbResult<Option<SessionRecord>>> + Send;

    /// Alle Sessions, neueste zuerst
    fn list(&self) -> impl Future<Output = DbResult<Vec<SessionRecord>>> + Send;

    /// Alle Sessions mit dem angegebenen Status
    fn list_by_status(
        &self,
        status: SessionStatus,
    ) -> impl Future<Output = DbResult<Vec<SessionRecord>>> + Send;

    /// Hinterlegt das Skript und setzt den Status auf `ready`
    ///
    /// Nur aus `pending` oder `ready` erlaubt, sonst `DbError::StatusKonflikt`.
    fn update_script(
        &self,
        id: Uuid,
        script: &str,
    ) -> impl Future<Output = DbResult<SessionRecord>> + Send;

    /// Compare-and-set auf den Status
    ///
    /// Greift nur wenn der aktuelle Status `erwartet` ist. Beim Wechsel nach
    /// `active` wird `started_at`, nach `completed` `completed_at` gestempelt.
    fn update_status(
        &self,
        id: Uuid,
        erwartet: SessionStatus,
        neu: SessionStatus,
        zeitpunkt: DateTime<Utc>,
    ) -> impl Future<Output = DbResult<SessionRecord>> + Send;

    /// Ersetzt Beitrittscode und Ablaufzeitpunkt
    fn update_code(
        &self,
        id: Uuid,
        code: &str,
        laeuft_ab_am: DateTime<Utc>,
    ) -> impl Future<Output = DbResult<SessionRecord>> + Send;
}

/// Append-only Transkript-Speicher
pub trait TranscriptRepository: Send + Sync {
    /// Haengt einen Eintrag an
    ///
    /// `(session_id, sequence)` ist eindeutig; eine Kollision ergibt
    /// `DbError::Eindeutigkeit`.
    fn append(
        &self,
        data: NeuerTranskriptEintrag<'_>,
    ) -> impl Future<Output = DbResult<TranskriptRecord>> + Send;

    /// Laedt den Eintrag mit der angegebenen Sequenznummer
    fn get_by_sequence(
        &self,
        session_id: Uuid,
        sequence: i64,
    ) -> impl Future<Output = DbResult<Option<TranskriptRecord>>> + Send;

    /// Alle Eintraege einer Session in Protokollreihenfolge
    fn list_for_session(
        &self,
        session_id: Uuid,
    ) -> impl Future<Output = DbResult<Vec<TranskriptRecord>>> + Send;

    /// Der zuletzt protokollierte Eintrag einer Session
    fn last_for_session(
        &self,
        session_id: Uuid,
    ) -> impl Future<Output = DbResult<Option<TranskriptRecord>>> + Send;

    /// Anzahl der Eintraege einer Session
    fn count_for_session(&self, session_id: Uuid) -> impl Future<Output = DbResult<i64>> + Send;
}
