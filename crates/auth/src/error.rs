//! Fehlertypen fuer den Beitritts-Service

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Alle moeglichen Fehler beim Beitritt zu einer Session
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Validierung ---
    #[error("Ungueltiges Code-Format: '{0}' (erwartet: 6 alphanumerische Zeichen)")]
    CodeFormatUngueltig(String),

    #[error("Ungueltige Teilnehmerrolle: '{0}' (erlaubt: groom, bride)")]
    RolleUngueltig(String),

    #[error("Anzeigename darf nicht leer sein")]
    NameUngueltig,

    // --- Code-Lookup ---
    #[error("Session-Code nicht gefunden")]
    CodeNichtGefunden,

    #[error("Session-Code abgelaufen seit {abgelaufen_am}")]
    CodeAbgelaufen { abgelaufen_am: DateTime<Utc> },

    /// Fataler Konfigurationsfehler: Codes kollidieren trotz Wiederholungen
    #[error("Kein freier Session-Code nach {versuche} Versuchen")]
    CodeRaumErschoepft { versuche: u32 },

    // --- Raum-Token ---
    #[error("Raum-Token ungueltig")]
    TokenUngueltig,

    #[error("Raum-Token abgelaufen")]
    TokenAbgelaufen,

    // --- Datenbank ---
    #[error("Datenbankfehler: {0}")]
    Datenbank(#[from] lexnova_db::DbError),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl AuthError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }
}

/// Result-Alias fuer den Beitritts-Service
pub type AuthResult<T> = Result<T, AuthError>;
