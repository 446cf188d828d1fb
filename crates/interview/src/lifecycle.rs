//! Session-Lebenszyklus
//!
//! `Pending -> Ready -> Active -> Completed`, strikt einseitig. Statuswechsel
//! laufen als Compare-and-Set auf der Datenbankzeile; von mehreren
//! gleichzeitigen Starts gewinnt genau einer.

use std::sync::Arc;

use chrono::Utc;
use lexnova_auth::{mit_eindeutigem_code, CodeConfig};
use lexnova_core::SessionStatus;
use lexnova_db::{
    models::{AiConfig, NeueSession, SessionRecord, TranskriptRecord},
    DbError, SessionRepository, TranscriptRepository,
};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::{InterviewError, InterviewResult};

/// Eingaben des Anwalts fuer eine neue Session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeueSessionDaten {
    pub groom_name: String,
    pub bride_name: String,
    pub date: String,
    #[serde(default)]
    pub ai_config: AiConfig,
}

/// Session mit vollstaendigem Transkript in Protokollreihenfolge
#[derive(Debug, Clone, Serialize)]
pub struct SessionBericht {
    pub session: SessionRecord,
    pub eintraege: Vec<TranskriptRecord>,
}

/// Verwaltung des Session-Lebenszyklus
pub struct SessionService<R: SessionRepository> {
    repo: Arc<R>,
    code_config: CodeConfig,
}

impl<R: SessionRepository> SessionService<R> {
    pub fn neu(repo: Arc<R>, code_config: CodeConfig) -> Arc<Self> {
        Arc::new(Self { repo, code_config })
    }

    /// Legt eine Session im Status `Pending` mit frischem Beitrittscode an
    pub async fn erstellen(&self, daten: &NeueSessionDaten) -> InterviewResult<SessionRecord> {
        let groom = nicht_leer(&daten.groom_name, "groom_name")?;
        let bride = nicht_leer(&daten.bride_name, "bride_name")?;
        let date = nicht_leer(&daten.date, "date")?;
        let ai_config = daten.ai_config;
        let repo = &self.repo;

        let session = mit_eindeutigem_code(&self.code_config, |code, ablauf| async move {
            repo.create(NeueSession {
                groom_name: groom,
                bride_name: bride,
                date,
                ai_config,
                session_code: &code,
                session_code_expires: ablauf,
            })
            .await
        })
        .await?;

        tracing::info!(
            session_id = %session.id,
            code = %session.session_code,
            "Session erstellt"
        );
        Ok(session)
    }

    pub async fn laden(&self, id: Uuid) -> InterviewResult<SessionRecord> {
        self.repo
            .get(id)
            .await?
            .ok_or(InterviewError::SessionNichtGefunden(id))
    }

    /// Alle Sessions, neueste zuerst
    pub async fn alle(&self) -> InterviewResult<Vec<SessionRecord>> {
        Ok(self.repo.list().await?)
    }

    /// Hinterlegt das Interview-Skript; `Pending -> Ready`
    ///
    /// Solange die Session `Ready` ist, ersetzt ein erneuter Aufruf das Skript.
    pub async fn skript_anhaengen(&self, id: Uuid, skript: &str) -> InterviewResult<SessionRecord> {
        if skript.trim().is_empty() {
            return Err(InterviewError::LeereEingabe("script_content"));
        }

        let session = self
            .repo
            .update_script(id, skript)
            .await
            .map_err(|e| konflikt_abbilden(e, id, SessionStatus::Ready))?;

        tracing::info!(session_id = %id, "Skript hinterlegt, Session bereit");
        Ok(session)
    }

    /// Startet die Session; `Ready -> Active`
    pub async fn starten(&self, id: Uuid) -> InterviewResult<SessionRecord> {
        let session = self.laden(id).await?;
        if session.status != SessionStatus::Ready {
            return Err(InterviewError::UngueltigerZustandsuebergang {
                aktuell: session.status,
                erforderlich: SessionStatus::Ready,
            });
        }
        if !session.hat_skript() {
            return Err(InterviewError::SkriptFehlt);
        }

        let session = self
            .repo
            .update_status(id, SessionStatus::Ready, SessionStatus::Active, Utc::now())
            .await
            .map_err(|e| konflikt_abbilden(e, id, SessionStatus::Ready))?;

        tracing::info!(session_id = %id, "Session gestartet");
        Ok(session)
    }

    /// Schliesst die Session ab; `Active -> Completed`
    ///
    /// Auf einer bereits abgeschlossenen Session ist der Aufruf wirkungslos.
    pub async fn abschliessen(&self, id: Uuid) -> InterviewResult<SessionRecord> {
        let session = self.laden(id).await?;
        match session.status {
            SessionStatus::Completed => return Ok(session),
            SessionStatus::Active => {}
            aktuell => {
                return Err(InterviewError::UngueltigerZustandsuebergang {
                    aktuell,
                    erforderlich: SessionStatus::Active,
                })
            }
        }

        match self
            .repo
            .update_status(id, SessionStatus::Active, SessionStatus::Completed, Utc::now())
            .await
        {
            Ok(session) => {
                tracing::info!(session_id = %id, "Session abgeschlossen");
                Ok(session)
            }
            // Ein anderer Aufrufer war schneller
            Err(DbError::StatusKonflikt { .. }) => {
                let session = self.laden(id).await?;
                if session.status == SessionStatus::Completed {
                    Ok(session)
                } else {
                    Err(InterviewError::UngueltigerZustandsuebergang {
                        aktuell: session.status,
                        erforderlich: SessionStatus::Active,
                    })
                }
            }
            Err(e) => Err(konflikt_abbilden(e, id, SessionStatus::Active)),
        }
    }

    /// Vergibt einen neuen Beitrittscode mit frischer Gueltigkeit
    pub async fn code_erneuern(&self, id: Uuid) -> InterviewResult<SessionRecord> {
        self.laden(id).await?;
        let repo = &self.repo;

        let session = mit_eindeutigem_code(&self.code_config, |code, ablauf| async move {
            repo.update_code(id, &code, ablauf).await
        })
        .await?;

        tracing::info!(session_id = %id, code = %session.session_code, "Beitrittscode erneuert");
        Ok(session)
    }

    /// Schliesst Sessions ab, die laenger als `max_dauer` aktiv sind
    ///
    /// Nach einem Absturz bleibt so keine Session dauerhaft `Active`.
    pub async fn verwaiste_abschliessen(
        &self,
        max_dauer: chrono::Duration,
    ) -> InterviewResult<Vec<Uuid>> {
        let grenze = Utc::now() - max_dauer;
        let mut abgeschlossen = Vec::new();

        for session in self.repo.list_by_status(SessionStatus::Active).await? {
            let verwaist = session.started_at.map_or(true, |t| t < grenze);
            if !verwaist {
                continue;
            }
            match self.abschliessen(session.id).await {
                Ok(_) => {
                    tracing::warn!(session_id = %session.id, "Verwaiste Session abgeschlossen");
                    abgeschlossen.push(session.id);
                }
                Err(e) => {
                    tracing::warn!(session_id = %session.id, fehler = %e, "Verwaiste Session nicht abschliessbar");
                }
            }
        }
        Ok(abgeschlossen)
    }
}

impl<R: SessionRepository + 'static> SessionService<R> {
    /// Startet die periodische Bereinigung verwaister Sessions
    ///
    /// Der erste Durchlauf erfolgt sofort; die Schleife endet, sobald `stop`
    /// auf `true` wechselt.
    pub fn bereinigung_starten(
        self: &Arc<Self>,
        intervall: std::time::Duration,
        max_dauer: chrono::Duration,
        mut stop: watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(intervall);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match service.verwaiste_abschliessen(max_dauer).await {
                            Ok(ids) if !ids.is_empty() => {
                                tracing::info!(anzahl = ids.len(), "Verwaiste Sessions bereinigt");
                            }
                            Ok(_) => {}
                            Err(e) => tracing::warn!(fehler = %e, "Bereinigung fehlgeschlagen"),
                        }
                    }
                    geaendert = stop.changed() => {
                        if geaendert.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Bereinigung verwaister Sessions beendet");
        })
    }
}

impl<R: SessionRepository + TranscriptRepository> SessionService<R> {
    /// Session mit allen Transkript-Eintraegen
    pub async fn bericht(&self, id: Uuid) -> InterviewResult<SessionBericht> {
        let session = self.laden(id).await?;
        let eintraege = TranscriptRepository::list_for_session(self.repo.as_ref(), id).await?;
        Ok(SessionBericht { session, eintraege })
    }
}

fn nicht_leer<'a>(wert: &'a str, feld: &'static str) -> InterviewResult<&'a str> {
    let wert = wert.trim();
    if wert.is_empty() {
        Err(InterviewError::LeereEingabe(feld))
    } else {
        Ok(wert)
    }
}

fn konflikt_abbilden(e: DbError, id: Uuid, erforderlich: SessionStatus) -> InterviewError {
    match e {
        DbError::StatusKonflikt { aktuell, .. } => match aktuell.parse::<SessionStatus>() {
            Ok(aktuell) => InterviewError::UngueltigerZustandsuebergang {
                aktuell,
                erforderlich,
            },
            Err(_) => InterviewError::intern(format!("Unbekannter Status '{aktuell}'")),
        },
        DbError::NichtGefunden(_) => InterviewError::SessionNichtGefunden(id),
        other => InterviewError::Datenbank(other),
    }
}
