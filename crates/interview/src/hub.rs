//! InterviewHub – startet und verwaltet laufende Pipelines
//!
//! Pro aktiver Session laeuft genau ein tokio-Task. Sessions teilen sich nur
//! Datenbank, Metriken und den Ereigniskanal.

use std::sync::Arc;

use dashmap::DashMap;
use lexnova_core::{EventSink, InterviewEvent};
use lexnova_db::{SessionRepository, TranscriptRepository};
use lexnova_observability::InterviewMetrics;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use crate::capability::Capabilities;
use crate::error::{InterviewError, InterviewResult};
use crate::lifecycle::SessionService;
use crate::pipeline::{InterviewPipeline, PipelineConfig};

/// Kapazitaet des Ereigniskanals pro Hub
const EVENT_KAPAZITAET: usize = 256;

/// Verbindungsdaten fuer Teilnehmer nach dem Start
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaumParameter {
    pub raum: String,
    pub url: String,
}

/// Broadcast-Kanal fuer Interview-Ereignisse
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<InterviewEvent>,
}

impl EventBus {
    pub fn neu(kapazitaet: usize) -> Self {
        let (sender, _) = broadcast::channel(kapazitaet);
        Self { sender }
    }

    pub fn abonnieren(&self) -> broadcast::Receiver<InterviewEvent> {
        self.sender.subscribe()
    }
}

impl EventSink for EventBus {
    fn senden(&self, event: InterviewEvent) {
        // Ohne Abonnenten ist send() ein Fehler; das ist hier kein Problem
        let _ = self.sender.send(event);
    }
}

/// Konfiguration des Hubs
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// URL des Raumdienstes, die Teilnehmer zum Beitritt nutzen
    pub raum_url: String,
    pub pipeline: PipelineConfig,
}

struct LaufendesInterview {
    stop: watch::Sender<bool>,
}

/// Verwaltung aller laufenden Interviews
pub struct InterviewHub<R: SessionRepository + TranscriptRepository> {
    repo: Arc<R>,
    lifecycle: Arc<SessionService<R>>,
    caps: Capabilities,
    config: HubConfig,
    laufende: Arc<DashMap<Uuid, LaufendesInterview>>,
    events: EventBus,
    metriken: Option<InterviewMetrics>,
}

impl<R: SessionRepository + TranscriptRepository + 'static> InterviewHub<R> {
    pub fn neu(
        repo: Arc<R>,
        lifecycle: Arc<SessionService<R>>,
        caps: Capabilities,
        config: HubConfig,
        metriken: Option<InterviewMetrics>,
    ) -> Arc<Self> {
        Arc::new(Self {
            repo,
            lifecycle,
            caps,
            config,
            laufende: Arc::new(DashMap::new()),
            events: EventBus::neu(EVENT_KAPAZITAET),
            metriken,
        })
    }

    /// Startet das Interview einer `Ready`-Session
    ///
    /// Die Session wechselt nach `Active`, die Pipeline laeuft im Hintergrund.
    pub async fn starten(&self, session_id: Uuid) -> InterviewResult<RaumParameter> {
        if self.laufende.contains_key(&session_id) {
            return Err(InterviewError::BereitsAktiv(session_id));
        }

        let session = self.lifecycle.starten(session_id).await?;
        let raum = RaumParameter {
            raum: session.room_name.clone(),
            url: self.config.raum_url.clone(),
        };

        let (stop_tx, stop_rx) = watch::channel(false);
        self.laufende
            .insert(session_id, LaufendesInterview { stop: stop_tx });

        let mut pipeline = InterviewPipeline::neu(
            session,
            Arc::clone(&self.repo),
            Arc::clone(&self.lifecycle),
            self.caps.clone(),
            self.config.pipeline.clone(),
        )
        .mit_events(Arc::new(self.events.clone()));
        if let Some(m) = &self.metriken {
            m.sessions_active.inc();
            pipeline = pipeline.mit_metriken(m.clone());
        }

        let laufende = Arc::clone(&self.laufende);
        let metriken = self.metriken.clone();
        tokio::spawn(async move {
            let beendigung = pipeline.ausfuehren(stop_rx).await;
            if let Some(m) = metriken {
                m.sessions_active.dec();
            }
            laufende.remove(&session_id);
            tracing::debug!(session_id = %session_id, grund = beendigung.grund(), "Pipeline-Task beendet");
        });

        tracing::info!(session_id = %session_id, raum = %raum.raum, "Interview gestartet");
        Ok(raum)
    }

    /// Beendet ein Interview explizit
    ///
    /// Laeuft keine Pipeline fuer die Session, wird sie direkt abgeschlossen.
    pub async fn beenden(&self, session_id: Uuid) -> InterviewResult<()> {
        if let Some(laufend) = self.laufende.get(&session_id) {
            let _ = laufend.stop.send(true);
            tracing::info!(session_id = %session_id, "Stopp angefordert");
            return Ok(());
        }
        self.lifecycle.abschliessen(session_id).await?;
        Ok(())
    }

    /// Fordert alle laufenden Interviews zum Stopp auf
    pub fn alle_beenden(&self) {
        for eintrag in self.laufende.iter() {
            let _ = eintrag.value().stop.send(true);
        }
    }

    pub fn laeuft(&self, session_id: Uuid) -> bool {
        self.laufende.contains_key(&session_id)
    }

    pub fn anzahl_laufend(&self) -> usize {
        self.laufende.len()
    }

    pub fn ereignisse_abonnieren(&self) -> broadcast::Receiver<InterviewEvent> {
        self.events.abonnieren()
    }
}
