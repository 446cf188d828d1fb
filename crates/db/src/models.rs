//! Datenbankmodelle fuer LexNova
//!
//! Diese Typen repraesentieren Datensaetze aus der Datenbank.
//! Sie sind von den Domain-Typen getrennt und dienen als reine Datenuebertragungsobjekte.

use chrono::{DateTime, Utc};
use lexnova_core::SessionStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// KI-Konfiguration
// ---------------------------------------------------------------------------

/// Tonfall des automatisierten Interviewers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceStyle {
    #[default]
    Warm,
    Authoritative,
}

impl VoiceStyle {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Warm => "warm",
            Self::Authoritative => "authoritative",
        }
    }
}

impl std::str::FromStr for VoiceStyle {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warm" => Ok(Self::Warm),
            "authoritative" => Ok(Self::Authoritative),
            other => Err(format!("Unbekannter Stimmstil: {other}")),
        }
    }
}

/// Strenge bei unklaren Antworten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    #[default]
    High,
    Low,
}

impl Strictness {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

impl std::str::FromStr for Strictness {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            other => Err(format!("Unbekannte Strenge: {other}")),
        }
    }
}

/// Stimm- und Strenge-Konfiguration einer Session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AiConfig {
    pub voice_style: VoiceStyle,
    pub strictness: Strictness,
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Session-Datensatz aus der Datenbank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub groom_name: String,
    pub bride_name: String,
    /// Termin wie vom Anwalt eingegeben (Freitext)
    pub date: String,
    pub status: SessionStatus,
    pub script_content: Option<String>,
    pub ai_config: AiConfig,
    pub room_name: String,
    pub session_code: String,
    pub session_code_expires: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Gibt true zurueck wenn ein nicht-leeres Skript hinterlegt ist
    pub fn hat_skript(&self) -> bool {
        self.script_content
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}

/// Daten zum Erstellen einer neuen Session
#[derive(Debug, Clone)]
pub struct NeueSession<'a> {
    pub groom_name: &'a str,
    pub bride_name: &'a str,
    pub date: &'a str,
    pub ai_config: AiConfig,
    pub session_code: &'a str,
    pub session_code_expires: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Transkript
// ---------------------------------------------------------------------------

/// Herkunft eines Transkript-Eintrags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EintragsQuelle {
    /// Von der Pipeline selbst protokolliert (Begruessung)
    Pipeline,
    /// Ueber das Commit-Werkzeug der Reasoning-Engine
    Tool,
    /// Ersatzeintrag, weil die Engine nicht rechtzeitig protokolliert hat
    Fallback,
}

impl EintragsQuelle {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Pipeline => "pipeline",
            Self::Tool => "tool",
            Self::Fallback => "fallback",
        }
    }
}

impl std::str::FromStr for EintragsQuelle {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pipeline" => Ok(Self::Pipeline),
            "tool" => Ok(Self::Tool),
            "fallback" => Ok(Self::Fallback),
            other => Err(format!("Unbekannte Eintragsquelle: {other}")),
        }
    }
}

/// Transkript-Eintrag aus der Datenbank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranskriptRecord {
    pub id: Uuid,
    pub session_id: Uuid,
    pub sequence: i64,
    pub speaker: String,
    pub text: String,
    pub source: EintragsQuelle,
    pub timestamp: DateTime<Utc>,
}

/// Daten zum Anhaengen eines Transkript-Eintrags
///
/// Die ID wird vom Aufrufer vergeben, damit ein Wiederholungsversuch
/// denselben Eintrag adressiert.
#[derive(Debug, Clone)]
pub struct NeuerTranskriptEintrag<'a> {
    pub id: Uuid,
    pub session_id: Uuid,
    pub sequence: i64,
    pub speaker: &'a str,
    pub text: &'a str,
    pub source: EintragsQuelle,
    pub timestamp: DateTime<Utc>,
}
