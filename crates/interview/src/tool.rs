//! Commit-Werkzeug eines einzelnen Zugs
//!
//! Pro Zug darf die Engine hoechstens einen Teilnehmer-Eintrag und einen
//! Eintrag fuer den Interviewer schreiben. Der Teilnehmer-Eintrag enthaelt
//! immer den erkannten Originaltext mit dem Sprecher aus der Sprecherbindung;
//! die Zuordnung der Engine wird nur zur Auswahl des Eintrags genutzt.
//! Was die Engine bis zum Ende des Zugs nicht protokolliert hat, wird als
//! Ersatzeintrag nachgetragen.

use async_trait::async_trait;
use lexnova_core::{EntryId, AI_OFFICER};
use lexnova_db::{models::EintragsQuelle, TranscriptRepository};
use tokio::sync::Mutex;

use crate::capability::CommitWerkzeug;
use crate::context::GespraechsKontext;
use crate::error::{InterviewError, InterviewResult, ToolError};
use crate::ledger::TranscriptLedger;

/// Erkannte Aeusserung, auf die der Zug antwortet
#[derive(Debug, Clone)]
pub(crate) struct TeilnehmerAeusserung {
    /// Gebundener Name oder `Unknown Speaker`
    pub sprecher: String,
    pub text: String,
}

#[derive(Default)]
struct TurnZustand {
    teilnehmer: Option<EntryId>,
    interviewer: Option<EntryId>,
    ledger_fehler: Option<(u32, String)>,
}

pub(crate) struct TurnProtokoll<'a, T: TranscriptRepository> {
    ledger: &'a TranscriptLedger<T>,
    kontext: &'a GespraechsKontext,
    aeusserung: Option<TeilnehmerAeusserung>,
    zustand: Mutex<TurnZustand>,
}

impl<'a, T: TranscriptRepository> TurnProtokoll<'a, T> {
    pub fn neu(
        ledger: &'a TranscriptLedger<T>,
        kontext: &'a GespraechsKontext,
        aeusserung: Option<TeilnehmerAeusserung>,
    ) -> Self {
        Self {
            ledger,
            kontext,
            aeusserung,
            zustand: Mutex::new(TurnZustand::default()),
        }
    }

    /// Traegt nach `converse` alles nach, was noch nicht protokolliert ist
    ///
    /// `antwort` ist der Text, den der Interviewer gleich sprechen wird.
    pub async fn abschliessen(&self, antwort: Option<&str>) -> InterviewResult<()> {
        let mut zustand = self.zustand.lock().await;
        self.teilnehmer_nachtragen(&mut zustand).await?;

        if let Some(text) = antwort.filter(|t| !t.trim().is_empty()) {
            if zustand.interviewer.is_none() {
                tracing::debug!(
                    session_id = %self.ledger.session_id(),
                    "Antwort nicht protokolliert, Ersatzeintrag"
                );
                let id = self
                    .schreiben(&mut zustand, AI_OFFICER, text, EintragsQuelle::Fallback)
                    .await?;
                zustand.interviewer = Some(id);
            }
        }
        Ok(())
    }

    async fn teilnehmer_nachtragen(&self, zustand: &mut TurnZustand) -> InterviewResult<()> {
        if let Some((versuche, ursache)) = &zustand.ledger_fehler {
            return Err(InterviewError::LedgerNichtVerfuegbar {
                versuche: *versuche,
                ursache: ursache.clone(),
            });
        }
        let Some(aeusserung) = &self.aeusserung else {
            return Ok(());
        };
        if zustand.teilnehmer.is_none() {
            let id = self
                .schreiben(
                    zustand,
                    &aeusserung.sprecher,
                    &aeusserung.text,
                    EintragsQuelle::Fallback,
                )
                .await?;
            zustand.teilnehmer = Some(id);
        }
        Ok(())
    }

    async fn schreiben(
        &self,
        zustand: &mut TurnZustand,
        sprecher: &str,
        text: &str,
        quelle: EintragsQuelle,
    ) -> InterviewResult<EntryId> {
        match self.ledger.protokollieren(sprecher, text, quelle).await {
            Ok(id) => Ok(id),
            Err(InterviewError::LedgerNichtVerfuegbar { versuche, ursache }) => {
                zustand.ledger_fehler = Some((versuche, ursache.clone()));
                Err(InterviewError::LedgerNichtVerfuegbar { versuche, ursache })
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl<'a, T: TranscriptRepository> CommitWerkzeug for TurnProtokoll<'a, T> {
    async fn protokollieren(&self, sprecher: &str, text: &str) -> Result<EntryId, ToolError> {
        let sprecher = sprecher.trim();
        let text = text.trim();
        if sprecher.is_empty() || text.is_empty() {
            return Err(ToolError::LeereEingabe);
        }

        let Some(kanonisch) = self
            .kontext
            .erlaubte_sprecher()
            .into_iter()
            .find(|erlaubt| erlaubt.eq_ignore_ascii_case(sprecher))
        else {
            return Err(ToolError::UnbekannterSprecher(sprecher.to_string()));
        };

        let mut zustand = self.zustand.lock().await;
        if zustand.ledger_fehler.is_some() {
            return Err(ToolError::LedgerNichtVerfuegbar);
        }

        let ergebnis = if kanonisch == AI_OFFICER {
            if zustand.interviewer.is_some() {
                return Err(ToolError::BereitsProtokolliert(AI_OFFICER.to_string()));
            }
            // Sprechreihenfolge: erst der Teilnehmer, dann die Antwort
            match self.teilnehmer_nachtragen(&mut zustand).await {
                Ok(()) => {
                    let r = self
                        .schreiben(&mut zustand, AI_OFFICER, text, EintragsQuelle::Tool)
                        .await;
                    if let Ok(id) = &r {
                        zustand.interviewer = Some(*id);
                    }
                    r
                }
                Err(e) => Err(e),
            }
        } else {
            let Some(aeusserung) = &self.aeusserung else {
                return Err(ToolError::KeineTeilnehmerAeusserung);
            };
            if zustand.teilnehmer.is_some() {
                return Err(ToolError::BereitsProtokolliert(kanonisch.to_string()));
            }
            if aeusserung.sprecher != kanonisch {
                tracing::debug!(
                    session_id = %self.ledger.session_id(),
                    engine = kanonisch,
                    bindung = %aeusserung.sprecher,
                    "Engine-Zuordnung weicht von Sprecherbindung ab, Bindung gilt"
                );
            }
            let r = self
                .schreiben(
                    &mut zustand,
                    &aeusserung.sprecher,
                    &aeusserung.text,
                    EintragsQuelle::Tool,
                )
                .await;
            if let Ok(id) = &r {
                zustand.teilnehmer = Some(*id);
            }
            r
        };

        ergebnis.map_err(|e| match e {
            InterviewError::LeereEingabe(_) => ToolError::LeereEingabe,
            _ => ToolError::LedgerNichtVerfuegbar,
        })
    }
}
