//! Interview-Pipeline einer Session
//!
//! Ablauf: Raum betreten, Begruessung protokollieren und sprechen, dann pro
//! erkannter Aeusserung ein Zug aus Sprecherbindung, Engine-Aufruf mit
//! Commit-Werkzeug, Ersatzeintraegen und Sprachausgabe. Zeitlimit und
//! expliziter Stopp brechen den laufenden Zug ab. Eine bereits erkannte,
//! aber noch nicht protokollierte Aeusserung des abgebrochenen Zugs wird
//! danach als Ersatzeintrag nachgetragen; der Abschluss der Session laeuft
//! genau einmal ausserhalb des abgebrochenen Zugs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use lexnova_core::{
    EventSink, InterviewEvent, SessionId, StreamLabel, AI_OFFICER, UNBEKANNTER_SPRECHER,
};
use lexnova_db::{
    models::{EintragsQuelle, SessionRecord},
    SessionRepository, TranscriptRepository,
};
use lexnova_observability::InterviewMetrics;
use tokio::sync::{watch, Mutex};

use crate::capability::{AudioRoom, Capabilities, RecognizedUtterance};
use crate::context::{begruessung, kontext_erstellen, GespraechsKontext, KonfliktHinweis, TurnEingabe};
use crate::error::{CapabilityError, InterviewError, InterviewResult};
use crate::ledger::{LedgerConfig, TranscriptLedger};
use crate::lifecycle::SessionService;
use crate::speaker::{Aufloesung, SpeakerResolver};
use crate::tool::{TeilnehmerAeusserung, TurnProtokoll};

/// Laufzeitparameter einer Pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximale Dauer ab `started_at`
    pub max_dauer: Duration,
    /// Frist fuer einen Engine-Aufruf
    pub turn_frist: Duration,
    /// Konfidenz, unter der eine Aeusserung als unklar gilt
    pub unklar_schwelle: f32,
    /// Voruebergehende Fehler in Folge bis zum Abbruch
    pub max_fehler_in_folge: u32,
    pub ledger: LedgerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_dauer: Duration::from_secs(60 * 60),
            turn_frist: Duration::from_secs(30),
            unklar_schwelle: 0.6,
            max_fehler_in_folge: 3,
            ledger: LedgerConfig::default(),
        }
    }
}

/// Grund fuer das Ende eines Interviews
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Beendigung {
    /// Audio beendet oder Engine hat das Interview abgeschlossen
    Regulaer,
    Zeitlimit,
    Gestoppt,
    /// Dauerhafter Fehler eines Dienstes
    Fehler(String),
    LedgerNichtVerfuegbar,
    ZuVieleFehler,
}

impl Beendigung {
    /// Kurzform fuer Metrik-Labels und Ereignisse
    pub fn grund(&self) -> &'static str {
        match self {
            Self::Regulaer => "regulaer",
            Self::Zeitlimit => "zeitlimit",
            Self::Gestoppt => "gestoppt",
            Self::Fehler(_) => "fehler",
            Self::LedgerNichtVerfuegbar => "ledger",
            Self::ZuVieleFehler => "zu_viele_fehler",
        }
    }
}

enum ZugErgebnis {
    Weiter,
    Fertig,
}

/// Aeusserung des laufenden Zugs, bleibt bei Abbruch erhalten
struct OffeneAeusserung {
    aeusserung: TeilnehmerAeusserung,
    /// Erste Sequenz, die der Zug belegen konnte
    ab_sequenz: i64,
}

/// Pipeline einer einzelnen aktiven Session
pub struct InterviewPipeline<R: SessionRepository + TranscriptRepository> {
    session: SessionRecord,
    repo: Arc<R>,
    lifecycle: Arc<SessionService<R>>,
    caps: Capabilities,
    config: PipelineConfig,
    metriken: Option<InterviewMetrics>,
    events: Option<Arc<dyn EventSink>>,
}

impl<R: SessionRepository + TranscriptRepository + 'static> InterviewPipeline<R> {
    pub fn neu(
        session: SessionRecord,
        repo: Arc<R>,
        lifecycle: Arc<SessionService<R>>,
        caps: Capabilities,
        config: PipelineConfig,
    ) -> Self {
        Self {
            session,
            repo,
            lifecycle,
            caps,
            config,
            metriken: None,
            events: None,
        }
    }

    pub fn mit_metriken(mut self, metriken: InterviewMetrics) -> Self {
        self.metriken = Some(metriken);
        self
    }

    pub fn mit_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    fn session_id(&self) -> SessionId {
        SessionId(self.session.id)
    }

    /// Fuehrt das Interview bis zum Ende und schliesst die Session ab
    pub async fn ausfuehren(self, mut stop: watch::Receiver<bool>) -> Beendigung {
        let session_id = self.session_id();
        self.ereignis(InterviewEvent::SessionAktiviert { session_id });

        let verbleibend = self.verbleibende_zeit();
        let raum = match self.caps.transport.beitreten(&self.session.room_name).await {
            Ok(raum) => Some(raum),
            Err(e) => {
                tracing::error!(session_id = %session_id, fehler = %e, "Raum konnte nicht betreten werden");
                None
            }
        };

        let offen = Mutex::new(None);
        let beendigung = match &raum {
            None => Beendigung::Fehler("Raum nicht erreichbar".into()),
            Some(raum) => {
                tokio::select! {
                    b = self.gespraech_fuehren(raum.as_ref(), &offen) => b,
                    _ = tokio::time::sleep(verbleibend) => {
                        tracing::info!(session_id = %session_id, "Maximale Interviewdauer erreicht");
                        Beendigung::Zeitlimit
                    }
                    _ = stop_abwarten(&mut stop) => {
                        tracing::info!(session_id = %session_id, "Interview gestoppt");
                        Beendigung::Gestoppt
                    }
                }
            }
        };

        if matches!(beendigung, Beendigung::Zeitlimit | Beendigung::Gestoppt) {
            self.offene_aeusserung_nachtragen(offen.into_inner()).await;
        }
        if let Some(raum) = raum {
            raum.verlassen().await;
        }
        self.abschluss(&beendigung).await;
        beendigung
    }

    fn verbleibende_zeit(&self) -> Duration {
        let gestartet = self.session.started_at.unwrap_or_else(Utc::now);
        let vergangen = (Utc::now() - gestartet).to_std().unwrap_or(Duration::ZERO);
        self.config.max_dauer.saturating_sub(vergangen)
    }

    async fn abschluss(&self, beendigung: &Beendigung) {
        let session_id = self.session_id();
        if let Err(e) = self.lifecycle.abschliessen(self.session.id).await {
            tracing::error!(session_id = %session_id, fehler = %e, "Session konnte nicht abgeschlossen werden");
        }
        if let Some(m) = &self.metriken {
            m.sessions_completed_total
                .with_label_values(&[beendigung.grund()])
                .inc();
        }
        self.ereignis(InterviewEvent::SessionAbgeschlossen {
            session_id,
            grund: beendigung.grund().to_string(),
        });
        tracing::info!(session_id = %session_id, grund = beendigung.grund(), "Interview beendet");
    }

    fn ledger_ausstatten(&self, mut ledger: TranscriptLedger<R>) -> TranscriptLedger<R> {
        if let Some(m) = &self.metriken {
            ledger = ledger.mit_metriken(m.clone());
        }
        if let Some(e) = &self.events {
            ledger = ledger.mit_events(Arc::clone(e));
        }
        ledger
    }

    /// Traegt die Aeusserung eines abgebrochenen Zugs nach
    ///
    /// Sie wurde vor dem Abbruch gesprochen. Hat der Zug sie schon
    /// protokolliert, wird nichts geschrieben.
    async fn offene_aeusserung_nachtragen(&self, offen: Option<OffeneAeusserung>) {
        let Some(offen) = offen else {
            return;
        };
        let session_id = self.session_id();
        let sprecher = offen.aeusserung.sprecher.as_str();
        let text = offen.aeusserung.text.as_str();

        let protokolliert = match self.repo.list_for_session(self.session.id).await {
            Ok(eintraege) => eintraege
                .iter()
                .any(|e| e.sequence >= offen.ab_sequenz && e.speaker != AI_OFFICER),
            Err(e) => {
                tracing::error!(
                    session_id = %session_id,
                    sprecher,
                    text,
                    fehler = %e,
                    "Aeusserung aus abgebrochenem Zug nicht protokolliert"
                );
                return;
            }
        };
        if protokolliert {
            return;
        }

        // Frisch geoeffnet: der abgebrochene Zug kann mitten im Schreiben gestanden haben
        let ergebnis = match TranscriptLedger::oeffnen(
            Arc::clone(&self.repo),
            session_id,
            self.config.ledger.clone(),
        )
        .await
        {
            Ok(ledger) => {
                self.ledger_ausstatten(ledger)
                    .protokollieren(sprecher, text, EintragsQuelle::Fallback)
                    .await
            }
            Err(e) => Err(e),
        };
        match ergebnis {
            Ok(_) => tracing::info!(
                session_id = %session_id,
                sprecher,
                "Aeusserung aus abgebrochenem Zug nachgetragen"
            ),
            Err(e) => tracing::error!(
                session_id = %session_id,
                sprecher,
                text,
                fehler = %e,
                "Aeusserung aus abgebrochenem Zug nicht protokolliert"
            ),
        }
    }

    async fn gespraech_fuehren(
        &self,
        raum: &dyn AudioRoom,
        offen: &Mutex<Option<OffeneAeusserung>>,
    ) -> Beendigung {
        let session_id = self.session_id();

        let kontext = match kontext_erstellen(&self.session) {
            Ok(k) => k,
            Err(e) => return Beendigung::Fehler(e.to_string()),
        };

        let ledger =
            match TranscriptLedger::oeffnen(Arc::clone(&self.repo), session_id, self.config.ledger.clone()).await {
                Ok(l) => self.ledger_ausstatten(l),
                Err(e) => {
                    tracing::error!(session_id = %session_id, fehler = %e, "Ledger konnte nicht geoeffnet werden");
                    return Beendigung::LedgerNichtVerfuegbar;
                }
            };

        let mut fehler_in_folge = 0u32;

        // Zug null: Begruessung wird vor dem Sprechen protokolliert
        let gruss = begruessung(&self.session.groom_name, &self.session.bride_name);
        if let Err(e) = ledger.protokollieren(AI_OFFICER, &gruss, EintragsQuelle::Pipeline).await {
            return self.fehler_beenden(e);
        }
        if let Err(e) = self.sprechen(raum, &gruss).await {
            if let Some(b) = self.fehler_bewerten(&mut fehler_in_folge, e) {
                return b;
            }
        }

        let audio = match raum.audio_eingang().await {
            Ok(a) => a,
            Err(e) => return Beendigung::Fehler(e.to_string()),
        };
        let mut aeusserungen = match self.caps.erkenner.transkribieren(audio).await {
            Ok(a) => a,
            Err(e) => return Beendigung::Fehler(e.to_string()),
        };

        let mut resolver = SpeakerResolver::neu([
            self.session.groom_name.as_str(),
            self.session.bride_name.as_str(),
        ]);

        while let Some(eintrag) = aeusserungen.recv().await {
            let aeusserung = match eintrag {
                Ok(a) => a,
                Err(e) => {
                    tracing::warn!(session_id = %session_id, fehler = %e, "Spracherkennung fehlgeschlagen");
                    if let Some(b) = self.fehler_bewerten(&mut fehler_in_folge, e) {
                        return b;
                    }
                    continue;
                }
            };
            if aeusserung.text.trim().is_empty() {
                continue;
            }

            let start = Instant::now();
            let ergebnis = self
                .zug(raum, &kontext, &ledger, &mut resolver, offen, aeusserung)
                .await;
            offen.lock().await.take();
            if let Some(m) = &self.metriken {
                m.turn_duration_seconds.observe(start.elapsed().as_secs_f64());
            }

            match ergebnis {
                Ok(ZugErgebnis::Weiter) => fehler_in_folge = 0,
                Ok(ZugErgebnis::Fertig) => {
                    tracing::info!(session_id = %session_id, "Engine hat das Interview abgeschlossen");
                    return Beendigung::Regulaer;
                }
                Err(InterviewError::Capability(e)) => {
                    tracing::warn!(session_id = %session_id, fehler = %e, "Zug abgebrochen");
                    if let Some(b) = self.fehler_bewerten(&mut fehler_in_folge, e) {
                        return b;
                    }
                }
                Err(e) => return self.fehler_beenden(e),
            }
        }

        let eintraege = ledger.anzahl().await;
        tracing::info!(session_id = %session_id, eintraege, "Audio beendet");
        Beendigung::Regulaer
    }

    /// Ein vollstaendiger Zug: entscheiden, protokollieren, sprechen
    async fn zug(
        &self,
        raum: &dyn AudioRoom,
        kontext: &GespraechsKontext,
        ledger: &TranscriptLedger<R>,
        resolver: &mut SpeakerResolver,
        offen: &Mutex<Option<OffeneAeusserung>>,
        aeusserung: RecognizedUtterance,
    ) -> InterviewResult<ZugErgebnis> {
        let konflikt = self.sprecher_aufloesen(resolver, &aeusserung.label, &aeusserung.text);
        let sprecher = resolver.sprecher(&aeusserung.label).map(str::to_string);

        let eingabe = TurnEingabe {
            label: aeusserung.label.clone(),
            sprecher: sprecher.clone(),
            text: aeusserung.text.trim().to_string(),
            unklar: aeusserung.confidence < self.config.unklar_schwelle,
            konflikt,
        };

        let teilnehmer = TeilnehmerAeusserung {
            sprecher: sprecher.unwrap_or_else(|| UNBEKANNTER_SPRECHER.to_string()),
            text: eingabe.text.clone(),
        };
        let ab_sequenz = ledger.anzahl().await;
        *offen.lock().await = Some(OffeneAeusserung {
            aeusserung: teilnehmer.clone(),
            ab_sequenz,
        });

        let protokoll = TurnProtokoll::neu(ledger, kontext, Some(teilnehmer));

        let antwort = match tokio::time::timeout(
            self.config.turn_frist,
            self.caps.engine.gespraech(kontext, &eingabe, &protokoll),
        )
        .await
        {
            Ok(ergebnis) => ergebnis,
            Err(_) => Err(CapabilityError::voruebergehend("Frist fuer Engine-Antwort ueberschritten")),
        };

        // Unprotokolliertes wird vor jeder Sprachausgabe nachgetragen
        protokoll
            .abschliessen(antwort.as_ref().ok().map(|a| a.text.as_str()))
            .await?;

        let antwort = antwort?;
        if !antwort.text.trim().is_empty() {
            self.sprechen(raum, &antwort.text).await?;
        }

        Ok(if antwort.abschliessen {
            ZugErgebnis::Fertig
        } else {
            ZugErgebnis::Weiter
        })
    }

    fn sprecher_aufloesen(
        &self,
        resolver: &mut SpeakerResolver,
        label: &StreamLabel,
        text: &str,
    ) -> Option<KonfliktHinweis> {
        let session_id = self.session_id();
        match resolver.aufloesen(label, text) {
            Aufloesung::NeuGebunden(name) => {
                tracing::info!(session_id = %session_id, label = %label, name = %name, "Sprecher gebunden");
                self.ereignis(InterviewEvent::SprecherGebunden {
                    session_id,
                    label: label.clone(),
                    name,
                });
                None
            }
            Aufloesung::Konflikt {
                name,
                gebunden_an,
                erstmals,
            } => {
                if erstmals {
                    tracing::warn!(
                        session_id = %session_id,
                        label = %label,
                        name = %name,
                        gebunden_an = %gebunden_an,
                        "Name bereits einem anderen Stream zugeordnet"
                    );
                    if let Some(m) = &self.metriken {
                        m.speaker_conflicts_total.inc();
                    }
                    self.ereignis(InterviewEvent::SprecherKonflikt {
                        session_id,
                        label: label.clone(),
                        name: name.clone(),
                        gebunden_an: gebunden_an.clone(),
                    });
                }
                Some(KonfliktHinweis { name, gebunden_an })
            }
            Aufloesung::Gebunden(_) | Aufloesung::Unbekannt => None,
        }
    }

    async fn sprechen(&self, raum: &dyn AudioRoom, text: &str) -> Result<(), CapabilityError> {
        let audio = self.caps.synthese.synthetisieren(text).await?;
        raum.abspielen(audio).await
    }

    /// Zaehlt voruebergehende Fehler; liefert die Beendigung, falls das Interview enden muss
    fn fehler_bewerten(&self, fehler_in_folge: &mut u32, e: CapabilityError) -> Option<Beendigung> {
        if !e.ist_wiederholbar() {
            tracing::error!(session_id = %self.session_id(), fehler = %e, "Dauerhafter Dienstfehler");
            return Some(Beendigung::Fehler(e.to_string()));
        }
        *fehler_in_folge += 1;
        if *fehler_in_folge >= self.config.max_fehler_in_folge {
            tracing::error!(
                session_id = %self.session_id(),
                anzahl = *fehler_in_folge,
                "Zu viele Fehler in Folge"
            );
            return Some(Beendigung::ZuVieleFehler);
        }
        None
    }

    fn fehler_beenden(&self, e: InterviewError) -> Beendigung {
        match e {
            InterviewError::LedgerNichtVerfuegbar { .. } => Beendigung::LedgerNichtVerfuegbar,
            other => {
                tracing::error!(session_id = %self.session_id(), fehler = %other, "Interview abgebrochen");
                Beendigung::Fehler(other.to_string())
            }
        }
    }

    fn ereignis(&self, event: InterviewEvent) {
        if let Some(events) = &self.events {
            events.senden(event);
        }
    }
}

/// Wartet auf das Stopp-Signal; ein geschlossener Sender stoppt nicht
async fn stop_abwarten(stop: &mut watch::Receiver<bool>) {
    if stop.wait_for(|s| *s).await.is_err() {
        std::future::pending::<()>().await;
    }
}
