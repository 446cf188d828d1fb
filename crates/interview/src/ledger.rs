//! Transkript-Ledger
//!
//! Append-only Protokoll einer Session. Alle Schreibzugriffe laufen ueber
//! einen asynchronen Mutex, dadurch sind Sequenznummern lueckenlos und
//! Zeitstempel monoton. Jeder Eintrag bekommt seine ID und Sequenz vor dem
//! ersten Schreibversuch; ein Wiederholungsversuch nach verlorener
//! Bestaetigung erkennt den bereits gespeicherten Eintrag an seiner ID.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lexnova_core::{EntryId, EventSink, InterviewEvent, SessionId};
use lexnova_db::{
    models::{EintragsQuelle, NeuerTranskriptEintrag},
    TranscriptRepository,
};
use lexnova_observability::InterviewMetrics;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{InterviewError, InterviewResult};

/// Laengste Wartezeit zwischen zwei Schreibversuchen
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Wiederholungsstrategie fuer Schreibzugriffe
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Maximale Anzahl Schreibversuche pro Eintrag
    pub versuche: u32,
    /// Wartezeit vor dem zweiten Versuch; verdoppelt sich pro Versuch
    pub backoff: Duration,
}

impl LedgerConfig {
    /// Wartezeit vor `versuch` (ab 2), verdoppelt und auf [`MAX_BACKOFF`] begrenzt
    pub fn wartezeit(&self, versuch: u32) -> Duration {
        let faktor = 2u32
            .checked_pow(versuch.saturating_sub(2))
            .unwrap_or(u32::MAX);
        self.backoff
            .checked_mul(faktor)
            .map_or(MAX_BACKOFF, |d| d.min(MAX_BACKOFF))
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            versuche: 3,
            backoff: Duration::from_millis(100),
        }
    }
}

struct LedgerZustand {
    naechste_sequenz: i64,
    letzter_zeitstempel: Option<DateTime<Utc>>,
}

/// Protokoll einer einzelnen Session
pub struct TranscriptLedger<T: TranscriptRepository> {
    repo: Arc<T>,
    session_id: SessionId,
    config: LedgerConfig,
    zustand: Mutex<LedgerZustand>,
    metriken: Option<InterviewMetrics>,
    events: Option<Arc<dyn EventSink>>,
}

impl<T: TranscriptRepository> TranscriptLedger<T> {
    /// Oeffnet das Ledger und setzt hinter dem letzten gespeicherten Eintrag fort
    pub async fn oeffnen(
        repo: Arc<T>,
        session_id: SessionId,
        config: LedgerConfig,
    ) -> InterviewResult<Self> {
        let letzter = repo.last_for_session(session_id.inner()).await?;
        let zustand = LedgerZustand {
            naechste_sequenz: letzter.as_ref().map_or(0, |e| e.sequence + 1),
            letzter_zeitstempel: letzter.map(|e| e.timestamp),
        };

        Ok(Self {
            repo,
            session_id,
            config,
            zustand: Mutex::new(zustand),
            metriken: None,
            events: None,
        })
    }

    pub fn mit_metriken(mut self, metriken: InterviewMetrics) -> Self {
        self.metriken = Some(metriken);
        self
    }

    pub fn mit_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Anzahl der bisher protokollierten Eintraege
    pub async fn anzahl(&self) -> i64 {
        self.zustand.lock().await.naechste_sequenz
    }

    /// Schreibt einen Eintrag dauerhaft ins Transkript
    ///
    /// Leerer Sprecher oder leerer Text werden abgewiesen, ohne dass etwas
    /// gespeichert wird. Nach erschoepften Versuchen wird der Eintrag mit
    /// Sprecher und Text geloggt und `LedgerNichtVerfuegbar` geliefert.
    pub async fn protokollieren(
        &self,
        sprecher: &str,
        text: &str,
        quelle: EintragsQuelle,
    ) -> InterviewResult<EntryId> {
        let sprecher = sprecher.trim();
        let text = text.trim();
        if sprecher.is_empty() {
            return Err(InterviewError::LeereEingabe("sprecher"));
        }
        if text.is_empty() {
            return Err(InterviewError::LeereEingabe("text"));
        }

        let mut zustand = self.zustand.lock().await;

        let id = Uuid::new_v4();
        let sequenz = zustand.naechste_sequenz;
        let jetzt = Utc::now();
        let zeitstempel = match zustand.letzter_zeitstempel {
            Some(letzter) if letzter > jetzt => letzter,
            _ => jetzt,
        };

        let versuche = self.config.versuche.max(1);
        let mut letzte_ursache = String::new();

        for versuch in 1..=versuche {
            if versuch > 1 {
                if let Some(m) = &self.metriken {
                    m.ledger_commit_retries_total.inc();
                }
                tokio::time::sleep(self.config.wartezeit(versuch)).await;
            }

            let eintrag = NeuerTranskriptEintrag {
                id,
                session_id: self.session_id.inner(),
                sequence: sequenz,
                speaker: sprecher,
                text,
                source: quelle,
                timestamp: zeitstempel,
            };

            match self.repo.append(eintrag).await {
                Ok(_) => {}
                Err(e) if e.ist_eindeutigkeit() => match self.bereits_gespeichert(id, sequenz).await {
                    Ok(true) => {
                        tracing::debug!(
                            session_id = %self.session_id,
                            sequenz,
                            "Eintrag war bereits gespeichert, Bestaetigung ging verloren"
                        );
                    }
                    Ok(false) => {
                        tracing::error!(
                            session_id = %self.session_id,
                            sequenz,
                            sprecher,
                            text,
                            "Sequenz von fremdem Eintrag belegt, Eintrag nicht protokolliert"
                        );
                        return Err(InterviewError::LedgerNichtVerfuegbar {
                            versuche: versuch,
                            ursache: format!("Sequenz {sequenz} bereits belegt"),
                        });
                    }
                    Err(e) => {
                        letzte_ursache = e.to_string();
                        tracing::warn!(session_id = %self.session_id, versuch, fehler = %e, "Pruefung nach Konflikt fehlgeschlagen");
                        continue;
                    }
                },
                Err(e) => {
                    letzte_ursache = e.to_string();
                    tracing::warn!(
                        session_id = %self.session_id,
                        sequenz,
                        versuch,
                        fehler = %e,
                        "Transkript-Eintrag konnte nicht geschrieben werden"
                    );
                    continue;
                }
            }

            zustand.naechste_sequenz += 1;
            zustand.letzter_zeitstempel = Some(zeitstempel);
            drop(zustand);

            let entry_id = EntryId(id);
            if let Some(m) = &self.metriken {
                m.transcript_entries_total
                    .with_label_values(&[quelle.als_str()])
                    .inc();
            }
            if let Some(events) = &self.events {
                events.senden(InterviewEvent::EintragProtokolliert {
                    session_id: self.session_id,
                    entry_id,
                    sequenz,
                    sprecher: sprecher.to_string(),
                });
            }
            tracing::debug!(
                session_id = %self.session_id,
                sequenz,
                sprecher,
                quelle = quelle.als_str(),
                "Eintrag protokolliert"
            );
            return Ok(entry_id);
        }

        tracing::error!(
            session_id = %self.session_id,
            sequenz,
            sprecher,
            text,
            versuche,
            fehler = %letzte_ursache,
            "Transkript-Eintrag endgueltig verloren"
        );
        Err(InterviewError::LedgerNichtVerfuegbar {
            versuche,
            ursache: letzte_ursache,
        })
    }

    async fn bereits_gespeichert(&self, id: Uuid, sequenz: i64) -> InterviewResult<bool> {
        let gespeichert = self
            .repo
            .get_by_sequence(self.session_id.inner(), sequenz)
            .await?;
        Ok(gespeichert.is_some_and(|e| e.id == id))
    }
}
