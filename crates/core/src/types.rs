//! Gemeinsame Identifikations- und Statustypen fuer LexNova
//!
//! IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! Session- und Eintrags-IDs zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LexnovaError;

/// Sprecher-Bezeichnung des automatisierten Interviewers im Transkript
pub const AI_OFFICER: &str = "AI Officer";

/// Platzhalter fuer Aeusserungen, deren Stream noch keinem Teilnehmer zugeordnet ist
pub const UNBEKANNTER_SPRECHER: &str = "Unknown Speaker";

/// Eindeutige Session-ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Erstellt eine neue zufaellige SessionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SessionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

/// Eindeutige ID eines Transkript-Eintrags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for EntryId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entry:{}", self.0)
    }
}

/// Anonymes Stream-Label, das die Spracherkennung pro Audioquelle vergibt
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreamLabel(pub String);

impl StreamLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn als_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StreamLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rolle eines menschlichen Teilnehmers (festes Zwei-Parteien-Modell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Groom,
    Bride,
}

impl ParticipantRole {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Groom => "groom",
            Self::Bride => "bride",
        }
    }
}

impl std::fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.als_str())
    }
}

impl std::str::FromStr for ParticipantRole {
    type Err = LexnovaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groom" => Ok(Self::Groom),
            "bride" => Ok(Self::Bride),
            _ => Err(LexnovaError::UngueltigeRolle(s.to_string())),
        }
    }
}

/// Lebenszyklus-Status einer Session
///
/// Die Uebergaenge sind strikt einseitig:
/// `Pending -> Ready -> Active -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Angelegt, noch kein Skript
    Pending,
    /// Skript vorhanden, Start moeglich
    Ready,
    /// Pipeline laeuft
    Active,
    /// Pipeline beendet (regulaer, Zeitlimit oder Fehler)
    Completed,
}

impl SessionStatus {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Der einzige Status, aus dem `ziel` erreicht werden darf
    ///
    /// `Ready -> Ready` ist erlaubt (Skript wird ersetzt), sonst gibt es
    /// genau einen Vorgaenger pro Zielstatus.
    pub fn erforderlicher_vorgaenger(ziel: SessionStatus) -> Option<SessionStatus> {
        match ziel {
            Self::Pending => None,
            Self::Ready => Some(Self::Pending),
            Self::Active => Some(Self::Ready),
            Self::Completed => Some(Self::Active),
        }
    }

    /// Prueft ob der Uebergang `self -> ziel` zulaessig ist
    pub fn kann_uebergehen_zu(&self, ziel: SessionStatus) -> bool {
        matches!(
            (self, ziel),
            (Self::Pending, Self::Ready)
                | (Self::Ready, Self::Ready)
                | (Self::Ready, Self::Active)
                | (Self::Active, Self::Completed)
        )
    }

    /// Gibt true zurueck wenn kein weiterer Uebergang moeglich ist
    pub fn ist_endzustand(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.als_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = LexnovaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "ready" => Ok(Self::Ready),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(LexnovaError::UngueltigerStatus(other.to_string())),
        }
    }
}
