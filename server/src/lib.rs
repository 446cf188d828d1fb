//! lexnova-server – Bibliotheks-Root
//!
//! Verdrahtet Datenbank, Session-Lebenszyklus, Beitritt, Interview-Hub und
//! Observability zu einem laufenden Prozess.

pub mod config;
pub mod zugang;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use config::ServerConfig;
use lexnova_auth::{CredentialIssuer, JoinAuthorizer};
use lexnova_db::SqliteDb;
use lexnova_interview::{Capabilities, InterviewHub, SessionService};
use lexnova_observability::{observability_server_starten, HealthState, InterviewMetrics};
use tokio::sync::watch;
use zugang::ZugangsDienst;

/// Abstand der Health-Aktualisierung
const HEALTH_INTERVALL: Duration = Duration::from_secs(10);
/// Wartezeit auf laufende Pipelines beim Herunterfahren
const SHUTDOWN_FRIST: Duration = Duration::from_secs(10);

/// Alle Dienste eines laufenden Servers
pub struct Dienste {
    pub db: Arc<SqliteDb>,
    pub sessions: Arc<SessionService<SqliteDb>>,
    pub zugang: ZugangsDienst<SqliteDb>,
    /// Nur vorhanden, wenn Sprachdienste konfiguriert sind
    pub hub: Option<Arc<InterviewHub<SqliteDb>>>,
    pub metriken: InterviewMetrics,
    pub health: HealthState,
}

impl Dienste {
    /// Baut alle Dienste auf einer bereits geoeffneten Datenbank auf
    pub async fn aufbauen(
        config: &ServerConfig,
        db: Arc<SqliteDb>,
        caps: Option<Capabilities>,
    ) -> Result<Self> {
        let metriken = InterviewMetrics::neu().context("Metriken konnten nicht registriert werden")?;
        let health = HealthState::neu();
        health.db_status_setzen(db.ping().await);

        let sessions = SessionService::neu(Arc::clone(&db), config.code_config());

        let issuer = CredentialIssuer::neu(config.credential_config());
        let zugang = ZugangsDienst::neu(
            JoinAuthorizer::neu(Arc::clone(&db), issuer),
            metriken.clone(),
        );

        let hub = match caps {
            Some(caps) => Some(InterviewHub::neu(
                Arc::clone(&db),
                Arc::clone(&sessions),
                caps,
                config.hub_config(),
                Some(metriken.clone()),
            )),
            None => {
                tracing::warn!("Keine Sprachdienste konfiguriert, Interviews koennen nicht gestartet werden");
                None
            }
        };

        Ok(Self {
            db,
            sessions,
            zugang,
            hub,
            metriken,
            health,
        })
    }

    /// Uebertraegt DB-Erreichbarkeit und laufende Interviews in den Health-Zustand
    pub async fn health_aktualisieren(&self) {
        self.health.db_status_setzen(self.db.ping().await);
        let laufend = self.hub.as_ref().map_or(0, |h| h.anzahl_laufend());
        self.health.aktive_interviews_setzen(laufend);
    }

    /// Stoppt alle Pipelines und wartet, bis ihre Sessions abgeschlossen sind
    pub async fn herunterfahren(&self, frist: Duration) {
        let Some(hub) = &self.hub else {
            return;
        };
        hub.alle_beenden();
        let ende = tokio::time::Instant::now() + frist;
        while hub.anzahl_laufend() > 0 {
            if tokio::time::Instant::now() >= ende {
                tracing::warn!(
                    laufend = hub.anzahl_laufend(),
                    "Pipelines nicht rechtzeitig beendet"
                );
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

/// Aktualisiert den Health-Zustand periodisch bis `stop` auf `true` wechselt
pub fn health_ticker_starten(
    dienste: Arc<Dienste>,
    intervall: Duration,
    mut stop: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(intervall);
        loop {
            tokio::select! {
                _ = ticker.tick() => dienste.health_aktualisieren().await,
                geaendert = stop.changed() => {
                    if geaendert.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }
    })
}

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
    caps: Option<Capabilities>,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config, caps: None }
    }

    /// Bindet die Sprachdienste fuer Interviews ein
    pub fn mit_capabilities(mut self, caps: Capabilities) -> Self {
        self.caps = Some(caps);
        self
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Datenbank oeffnen und migrieren
    /// 2. Dienste aufbauen
    /// 3. Bereinigung verwaister Sessions starten (erster Lauf sofort)
    /// 4. Observability-Server starten
    /// 5. Auf Ctrl-C warten, Pipelines stoppen
    pub async fn starten(self) -> Result<()> {
        tracing::info!(
            server_name = %self.config.server.name,
            datenbank = %self.config.datenbank.url,
            "Server startet"
        );

        let db = SqliteDb::oeffnen(&self.config.datenbank_config())
            .await
            .context("Datenbank konnte nicht geoeffnet werden")?;
        let dienste = Arc::new(Dienste::aufbauen(&self.config, Arc::new(db), self.caps).await?);

        let (stop_tx, stop_rx) = watch::channel(false);

        let max_dauer = chrono::Duration::from_std(self.config.max_dauer())
            .context("max_dauer_minuten zu gross")?;
        let bereinigung = dienste.sessions.bereinigung_starten(
            self.config.bereinigung_intervall(),
            max_dauer,
            stop_rx.clone(),
        );

        let health_task = health_ticker_starten(Arc::clone(&dienste), HEALTH_INTERVALL, stop_rx.clone());

        if self.config.observability.aktiviert {
            let adresse: SocketAddr = self
                .config
                .observability_bind_adresse()
                .parse()
                .context("Ungueltige Observability-Adresse")?;
            let metriken = dienste.metriken.clone();
            let health = dienste.health.clone();
            let stop = stop_rx.clone();
            tokio::spawn(async move {
                if let Err(e) = observability_server_starten(adresse, metriken, health, stop).await {
                    tracing::error!(fehler = %e, "Observability-Server fehlgeschlagen");
                }
            });
        }

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown-Signal empfangen, Server wird beendet");

        let _ = stop_tx.send(true);
        dienste.herunterfahren(SHUTDOWN_FRIST).await;
        let _ = bereinigung.await;
        let _ = health_task.await;

        Ok(())
    }
}
