//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use std::time::Duration;

use lexnova_auth::{CodeConfig, CredentialConfig};
use lexnova_db::{DatabaseBackend, DatabaseConfig};
use lexnova_interview::{HubConfig, LedgerConfig, PipelineConfig};
use lexnova_observability::logging::log_level_gueltig;
use serde::{Deserialize, Serialize};

/// Obergrenze fuer `interview.commit_versuche`
pub const MAX_COMMIT_VERSUCHE: u32 = 10;
/// Obergrenze fuer `interview.commit_backoff_ms`
pub const MAX_COMMIT_BACKOFF_MS: u64 = 10_000;
/// Obergrenze fuer Code- und Credential-Gueltigkeit (ein Jahr)
pub const MAX_GUELTIGKEIT_STUNDEN: i64 = 24 * 365;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Datenbank-Einstellungen
    pub datenbank: DatenbankEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Interview-Ablauf (Zeitlimits, Wiederholungen, Codes)
    pub interview: InterviewEinstellungen,
    /// Raumdienst fuer Audio und Beitritts-Credentials
    pub raum: RaumEinstellungen,
    /// Observability-Einstellungen (Metriken, Health)
    pub observability: ObservabilityEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers
    pub name: String,
    /// Bind-Adresse fuer alle Listener
    pub bind_adresse: String,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "LexNova Interview Server".into(),
            bind_adresse: "0.0.0.0".into(),
        }
    }
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    /// Verbindungs-URL
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
    /// WAL-Modus fuer SQLite
    pub sqlite_wal: bool,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        Self {
            url: "sqlite://lexnova.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Interview-Ablauf
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewEinstellungen {
    /// Maximale Interviewdauer ab Start
    pub max_dauer_minuten: u64,
    /// Frist fuer eine Antwort der Reasoning-Engine
    pub turn_frist_sekunden: u64,
    /// Schreibversuche pro Transkript-Eintrag
    pub commit_versuche: u32,
    /// Wartezeit vor dem zweiten Schreibversuch (verdoppelt sich)
    pub commit_backoff_ms: u64,
    /// Gueltigkeit eines Beitrittscodes
    pub code_gueltigkeit_stunden: i64,
    /// Versuche, einen freien Beitrittscode zu finden
    pub code_generierung_versuche: u32,
    /// Erkennungskonfidenz, unter der eine Aeusserung als unklar gilt
    pub unklar_schwelle: f32,
    /// Voruebergehende Dienstfehler in Folge bis zum Abbruch
    pub max_fehler_in_folge: u32,
    /// Abstand der Bereinigungslaeufe fuer verwaiste Sessions
    pub bereinigung_intervall_sekunden: u64,
}

impl Default for InterviewEinstellungen {
    fn default() -> Self {
        Self {
            max_dauer_minuten: 60,
            turn_frist_sekunden: 30,
            commit_versuche: 3,
            commit_backoff_ms: 100,
            code_gueltigkeit_stunden: 24,
            code_generierung_versuche: 5,
            unklar_schwelle: 0.6,
            max_fehler_in_folge: 3,
            bereinigung_intervall_sekunden: 60,
        }
    }
}

/// Raumdienst (Echtzeit-Audio)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaumEinstellungen {
    /// URL, ueber die Teilnehmer dem Raum beitreten
    pub url: String,
    /// API-Key beim Raumdienst (Token-Issuer)
    pub api_key: String,
    /// Signatur-Secret; ohne Secret werden Mock-Tokens ausgegeben
    pub api_secret: Option<String>,
    /// Gueltigkeit eines Beitritts-Credentials
    pub credential_ttl_stunden: i64,
}

impl Default for RaumEinstellungen {
    fn default() -> Self {
        Self {
            url: "ws://localhost:7880".into(),
            api_key: "devkey".into(),
            api_secret: None,
            credential_ttl_stunden: 2,
        }
    }
}

/// Observability-Einstellungen (Metriken + Health-Check)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityEinstellungen {
    /// Aktiviert den Observability-Server
    pub aktiviert: bool,
    /// Port fuer Metriken und Health (Standard: 9300)
    pub port: u16,
}

impl Default for ObservabilityEinstellungen {
    fn default() -> Self {
        Self {
            aktiviert: true,
            port: 9300,
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Uebernimmt Werte aus der Umgebung; ein gesetztes Secret hat Vorrang
    pub fn umgebung_anwenden(&mut self, api_secret: Option<String>) {
        if let Some(secret) = api_secret.filter(|s| !s.trim().is_empty()) {
            self.raum.api_secret = Some(secret);
        }
    }

    /// Prueft Wertebereiche, die serde nicht abdeckt
    pub fn pruefen(&self) -> anyhow::Result<()> {
        if !log_level_gueltig(&self.logging.level) {
            anyhow::bail!("Ungueltiges Log-Level '{}'", self.logging.level);
        }
        if self.logging.format.parse::<lexnova_observability::LogFormat>().is_err() {
            anyhow::bail!("Ungueltiges Log-Format '{}'", self.logging.format);
        }
        let i = &self.interview;
        if i.max_dauer_minuten == 0 {
            anyhow::bail!("interview.max_dauer_minuten muss groesser als 0 sein");
        }
        if i.commit_versuche == 0 || i.code_generierung_versuche == 0 {
            anyhow::bail!("Anzahl der Versuche muss mindestens 1 sein");
        }
        if i.commit_versuche > MAX_COMMIT_VERSUCHE {
            anyhow::bail!("interview.commit_versuche darf hoechstens {MAX_COMMIT_VERSUCHE} sein");
        }
        if i.commit_backoff_ms > MAX_COMMIT_BACKOFF_MS {
            anyhow::bail!("interview.commit_backoff_ms darf hoechstens {MAX_COMMIT_BACKOFF_MS} sein");
        }
        if !(0.0..=1.0).contains(&i.unklar_schwelle) {
            anyhow::bail!("interview.unklar_schwelle muss zwischen 0 und 1 liegen");
        }
        if i.code_gueltigkeit_stunden <= 0 || self.raum.credential_ttl_stunden <= 0 {
            anyhow::bail!("Gueltigkeitsdauern muessen positiv sein");
        }
        if i.code_gueltigkeit_stunden > MAX_GUELTIGKEIT_STUNDEN
            || self.raum.credential_ttl_stunden > MAX_GUELTIGKEIT_STUNDEN
        {
            anyhow::bail!("Gueltigkeitsdauern duerfen hoechstens {MAX_GUELTIGKEIT_STUNDEN} Stunden betragen");
        }
        Ok(())
    }

    pub fn datenbank_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            backend: DatabaseBackend::Sqlite,
            url: self.datenbank.url.clone(),
            max_verbindungen: self.datenbank.max_verbindungen,
            sqlite_wal: self.datenbank.sqlite_wal,
        }
    }

    pub fn code_config(&self) -> CodeConfig {
        CodeConfig {
            gueltigkeit: chrono::Duration::hours(self.interview.code_gueltigkeit_stunden),
            max_versuche: self.interview.code_generierung_versuche,
        }
    }

    pub fn credential_config(&self) -> CredentialConfig {
        CredentialConfig {
            api_key: self.raum.api_key.clone(),
            api_secret: self.raum.api_secret.clone(),
            ttl: chrono::Duration::hours(self.raum.credential_ttl_stunden),
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        let i = &self.interview;
        PipelineConfig {
            max_dauer: self.max_dauer(),
            turn_frist: Duration::from_secs(i.turn_frist_sekunden),
            unklar_schwelle: i.unklar_schwelle,
            max_fehler_in_folge: i.max_fehler_in_folge,
            ledger: LedgerConfig {
                versuche: i.commit_versuche,
                backoff: Duration::from_millis(i.commit_backoff_ms),
            },
        }
    }

    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            raum_url: self.raum.url.clone(),
            pipeline: self.pipeline_config(),
        }
    }

    /// Maximale Interviewdauer
    pub fn max_dauer(&self) -> Duration {
        Duration::from_secs(self.interview.max_dauer_minuten * 60)
    }

    pub fn bereinigung_intervall(&self) -> Duration {
        Duration::from_secs(self.interview.bereinigung_intervall_sekunden.max(1))
    }

    /// Gibt die Bind-Adresse fuer den Observability-Server zurueck
    pub fn observability_bind_adresse(&self) -> String {
        format!("{}:{}", self.server.bind_adresse, self.observability.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = ServerConfig::default();
        assert!(cfg.pruefen().is_ok());
        assert_eq!(cfg.interview.max_dauer_minuten, 60);
        assert_eq!(cfg.interview.commit_versuche, 3);
        assert_eq!(cfg.interview.code_gueltigkeit_stunden, 24);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.raum.api_secret.is_none());
    }

    #[test]
    fn bind_adressen() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.observability_bind_adresse(), "0.0.0.0:9300");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [interview]
            max_dauer_minuten = 45
            unklar_schwelle = 0.5

            [raum]
            url = "wss://raum.example.org"
            api_secret = "geheim"
        "#;
        let cfg: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.interview.max_dauer_minuten, 45);
        assert_eq!(cfg.raum.url, "wss://raum.example.org");
        assert_eq!(cfg.raum.api_secret.as_deref(), Some("geheim"));
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.interview.turn_frist_sekunden, 30);
        assert_eq!(cfg.raum.api_key, "devkey");
        assert_eq!(cfg.datenbank.url, "sqlite://lexnova.db");
    }

    #[test]
    fn abgeleitete_laufzeit_configs() {
        let cfg = ServerConfig::default();

        let pipeline = cfg.pipeline_config();
        assert_eq!(pipeline.max_dauer, Duration::from_secs(3600));
        assert_eq!(pipeline.turn_frist, Duration::from_secs(30));
        assert_eq!(pipeline.ledger.versuche, 3);
        assert_eq!(pipeline.ledger.backoff, Duration::from_millis(100));

        let code = cfg.code_config();
        assert_eq!(code.gueltigkeit, chrono::Duration::hours(24));
        assert_eq!(code.max_versuche, 5);

        let credential = cfg.credential_config();
        assert_eq!(credential.ttl, chrono::Duration::hours(2));
        assert_eq!(cfg.hub_config().raum_url, "ws://localhost:7880");
    }

    #[test]
    fn secret_aus_umgebung_hat_vorrang() {
        let mut cfg: ServerConfig = toml::from_str("[raum]\napi_secret = \"datei\"").unwrap();
        cfg.umgebung_anwenden(Some("umgebung".into()));
        assert_eq!(cfg.raum.api_secret.as_deref(), Some("umgebung"));

        // Leere Variable ueberschreibt nichts
        cfg.umgebung_anwenden(Some("  ".into()));
        assert_eq!(cfg.raum.api_secret.as_deref(), Some("umgebung"));
        cfg.umgebung_anwenden(None);
        assert_eq!(cfg.raum.api_secret.as_deref(), Some("umgebung"));
    }

    #[test]
    fn ungueltige_werte_werden_erkannt() {
        let mut cfg = ServerConfig::default();
        cfg.logging.level = "laut".into();
        assert!(cfg.pruefen().is_err());

        let mut cfg = ServerConfig::default();
        cfg.interview.unklar_schwelle = 1.5;
        assert!(cfg.pruefen().is_err());

        let mut cfg = ServerConfig::default();
        cfg.interview.commit_versuche = 0;
        assert!(cfg.pruefen().is_err());

        let mut cfg = ServerConfig::default();
        cfg.logging.format = "xml".into();
        assert!(cfg.pruefen().is_err());
    }

    #[test]
    fn obergrenzen_werden_geprueft() {
        let mut cfg = ServerConfig::default();
        cfg.interview.commit_versuche = 40;
        assert!(cfg.pruefen().is_err());

        let mut cfg = ServerConfig::default();
        cfg.interview.commit_versuche = MAX_COMMIT_VERSUCHE;
        assert!(cfg.pruefen().is_ok());

        let mut cfg = ServerConfig::default();
        cfg.interview.commit_backoff_ms = u64::MAX;
        assert!(cfg.pruefen().is_err());

        let mut cfg = ServerConfig::default();
        cfg.raum.credential_ttl_stunden = i64::MAX;
        assert!(cfg.pruefen().is_err());
    }

    #[test]
    fn unbekannte_datei_liefert_standardwerte() {
        let cfg = ServerConfig::laden("/nicht/vorhanden/lexnova.toml").unwrap();
        assert_eq!(cfg.interview.max_dauer_minuten, 60);
    }
}
