//! Fehlertypen fuer LexNova
//!
//! Zentraler Fehler-Enum fuer Werte, die an den Crate-Grenzen geparst werden.
//! Untermodule definieren eigene Fehler und konvertieren via `#[from]`.

use thiserror::Error;

/// Globaler Result-Alias fuer LexNova
pub type Result<T> = std::result::Result<T, LexnovaError>;

/// Fehler beim Parsen und Validieren gemeinsamer Werte
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexnovaError {
    #[error("Ungueltige Teilnehmerrolle: '{0}' (erlaubt: groom, bride)")]
    UngueltigeRolle(String),

    #[error("Unbekannter Session-Status: '{0}'")]
    UngueltigerStatus(String),

    #[error("Ungueltige Konfiguration: {0}")]
    Konfiguration(String),

    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl LexnovaError {
    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Erstellt einen Konfigurationsfehler
    pub fn konfiguration(msg: impl Into<String>) -> Self {
        Self::Konfiguration(msg.into())
    }
}
