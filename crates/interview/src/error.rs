//! Fehlertypen fuer Interview-Lebenszyklus, Pipeline und Commit-Werkzeug

use lexnova_core::SessionStatus;
use thiserror::Error;
use uuid::Uuid;

/// Fehler des Session-Lebenszyklus und der Pipeline
#[derive(Debug, Error)]
pub enum InterviewError {
    #[error("Ungueltiger Zustandsuebergang: Session ist '{aktuell}', erforderlich '{erforderlich}'")]
    UngueltigerZustandsuebergang {
        aktuell: SessionStatus,
        erforderlich: SessionStatus,
    },

    #[error("Session nicht gefunden: {0}")]
    SessionNichtGefunden(Uuid),

    #[error("Feld '{0}' darf nicht leer sein")]
    LeereEingabe(&'static str),

    #[error("Session hat kein Interview-Skript")]
    SkriptFehlt,

    #[error("Interview fuer Session {0} laeuft bereits")]
    BereitsAktiv(Uuid),

    #[error("Transkript-Ledger nicht verfuegbar nach {versuche} Versuchen: {ursache}")]
    LedgerNichtVerfuegbar { versuche: u32, ursache: String },

    #[error("Capability-Fehler: {0}")]
    Capability(#[from] CapabilityError),

    #[error("Datenbankfehler: {0}")]
    Datenbank(#[from] lexnova_db::DbError),

    #[error("Beitritt/Code-Fehler: {0}")]
    Auth(#[from] lexnova_auth::AuthError),

    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl InterviewError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }
}

/// Result-Alias fuer das Interview-Crate
pub type InterviewResult<T> = Result<T, InterviewError>;

/// Fehler eines externen Dienstes (Raum, Erkennung, Engine, Synthese)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityError {
    /// Der aktuelle Zug ist verloren, das Interview kann weiterlaufen
    #[error("voruebergehend: {0}")]
    Voruebergehend(String),

    /// Der Dienst ist fuer diese Session nicht mehr nutzbar
    #[error("dauerhaft: {0}")]
    Dauerhaft(String),
}

impl CapabilityError {
    pub fn voruebergehend(msg: impl Into<String>) -> Self {
        Self::Voruebergehend(msg.into())
    }

    pub fn dauerhaft(msg: impl Into<String>) -> Self {
        Self::Dauerhaft(msg.into())
    }

    pub fn ist_wiederholbar(&self) -> bool {
        matches!(self, Self::Voruebergehend(_))
    }
}

/// Result-Alias fuer Capability-Aufrufe
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Antwort des Commit-Werkzeugs an die Reasoning-Engine
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("Sprecher und Text duerfen nicht leer sein")]
    LeereEingabe,

    #[error("Unbekannter Sprecher '{0}'")]
    UnbekannterSprecher(String),

    #[error("Fuer '{0}' wurde in diesem Zug bereits protokolliert")]
    BereitsProtokolliert(String),

    #[error("In diesem Zug gibt es keine Teilnehmer-Aeusserung")]
    KeineTeilnehmerAeusserung,

    #[error("Transkript-Ledger nicht verfuegbar")]
    LedgerNichtVerfuegbar,
}
