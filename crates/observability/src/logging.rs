//! Structured Logging Setup via tracing-subscriber
//!
//! Die Werte aus der Konfigurationsdatei koennen per Umgebungsvariable
//! uebersteuert werden:
//! - `LN_LOG_LEVEL`: Filter-Direktive (z.B. `info` oder `lexnova_interview=debug`)
//! - `LN_LOG_FORMAT`: `text` oder `json`
//!
//! Pipelines loggen mit `session_id` als Feld, damit sich alle Zeilen einer
//! Session im JSON-Format filtern lassen.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

const ENV_LEVEL: &str = "LN_LOG_LEVEL";
const ENV_FORMAT: &str = "LN_LOG_FORMAT";

/// Ausgabeformat der Logzeilen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("Unbekanntes Log-Format: {other}")),
        }
    }
}

/// Wirksame Logging-Einstellungen nach Anwendung der Umgebung
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEinstellungen {
    pub filter: String,
    pub format: LogFormat,
}

/// Kombiniert Konfiguration und Umgebung; die Umgebung gewinnt
///
/// Ein unbekanntes Format faellt auf `text` zurueck.
pub fn einstellungen_aufloesen(
    level: &str,
    format: &str,
    env_level: Option<String>,
    env_format: Option<String>,
) -> LogEinstellungen {
    let filter = env_level
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| level.to_string());
    let format = env_format
        .as_deref()
        .unwrap_or(format)
        .parse()
        .unwrap_or(LogFormat::Text);
    LogEinstellungen { filter, format }
}

/// Initialisiert das Logging-System einmalig pro Prozess
pub fn logging_initialisieren(level: &str, format: &str) -> Result<()> {
    let einstellungen = einstellungen_aufloesen(
        level,
        format,
        std::env::var(ENV_LEVEL).ok(),
        std::env::var(ENV_FORMAT).ok(),
    );

    let filter = EnvFilter::try_new(&einstellungen.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let ergebnis = match einstellungen.format {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .try_init(),
        LogFormat::Text => fmt().with_env_filter(filter).with_target(true).try_init(),
    };

    ergebnis.map_err(|e| anyhow!("Logging bereits initialisiert: {e}"))
}

/// Validiert ob ein Log-Level-String gueltig ist
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}
