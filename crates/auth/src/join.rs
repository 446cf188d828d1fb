//! JoinAuthorizer – Session-Code gegen Raum-Credential einloesen
//!
//! Pruefreihenfolge: Normalisierung, Format, Lookup, Ablauf, Rolle, Name.
//! Das Einloesen veraendert keinen Zustand; derselbe Code kann bis zum
//! Ablauf beliebig oft eingeloest werden.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lexnova_core::{ParticipantRole, SessionStatus};
use lexnova_db::{models::SessionRecord, SessionRepository};
use serde::Serialize;
use uuid::Uuid;

use crate::credential::{CredentialIssuer, JoinCredential};
use crate::error::{AuthError, AuthResult};
use crate::session_code::{code_abgelaufen, code_format_gueltig, code_normalisieren};

/// Ergebnis eines erfolgreichen Beitritts
#[derive(Debug, Clone, Serialize)]
pub struct JoinErgebnis {
    pub session_id: Uuid,
    pub raum_name: String,
    pub groom_name: String,
    pub bride_name: String,
    pub credential: JoinCredential,
}

/// Oeffentliche Kurzinfo zu einem Code (ohne Credential)
#[derive(Debug, Clone, Serialize)]
pub struct SessionVorschau {
    pub session_id: Uuid,
    pub groom_name: String,
    pub bride_name: String,
    pub date: String,
    pub status: SessionStatus,
    pub code_laeuft_ab_am: DateTime<Utc>,
}

/// Prueft Session-Codes und stellt Credentials aus
pub struct JoinAuthorizer<R: SessionRepository> {
    repo: Arc<R>,
    issuer: CredentialIssuer,
}

impl<R: SessionRepository> JoinAuthorizer<R> {
    pub fn neu(repo: Arc<R>, issuer: CredentialIssuer) -> Arc<Self> {
        Arc::new(Self { repo, issuer })
    }

    /// Loest einen Session-Code ein
    ///
    /// - `code`: Benutzereingabe, z.B. `abc-123`
    /// - `anzeigename`: Name, unter dem der Teilnehmer im Raum erscheint
    /// - `rolle`: `groom` oder `bride`
    pub async fn einloesen(
        &self,
        code: &str,
        anzeigename: &str,
        rolle: &str,
    ) -> AuthResult<JoinErgebnis> {
        let ergebnis = self.einloesen_intern(code, anzeigename, rolle).await;
        match &ergebnis {
            Ok(e) => tracing::info!(
                session_id = %e.session_id,
                rolle = %e.credential.rolle,
                identitaet = %e.credential.identitaet,
                "Beitritt autorisiert"
            ),
            Err(e) => tracing::warn!(fehler = %e, "Beitritt abgelehnt"),
        }
        ergebnis
    }

    async fn einloesen_intern(
        &self,
        code: &str,
        anzeigename: &str,
        rolle: &str,
    ) -> AuthResult<JoinErgebnis> {
        let session = self.session_fuer_code(code).await?;

        let rolle: ParticipantRole = rolle
            .parse()
            .map_err(|_| AuthError::RolleUngueltig(rolle.to_string()))?;

        let anzeigename = anzeigename.trim();
        if anzeigename.is_empty() {
            return Err(AuthError::NameUngueltig);
        }

        let credential = self
            .issuer
            .ausstellen(&session.room_name, anzeigename, rolle)?;

        Ok(JoinErgebnis {
            session_id: session.id,
            raum_name: session.room_name,
            groom_name: session.groom_name,
            bride_name: session.bride_name,
            credential,
        })
    }

    /// Liefert Kurzinfos zu einem gueltigen Code, ohne ein Credential auszustellen
    pub async fn vorschau(&self, code: &str) -> AuthResult<SessionVorschau> {
        let session = self.session_fuer_code(code).await?;
        Ok(SessionVorschau {
            session_id: session.id,
            groom_name: session.groom_name,
            bride_name: session.bride_name,
            date: session.date,
            status: session.status,
            code_laeuft_ab_am: session.session_code_expires,
        })
    }

    async fn session_fuer_code(&self, code: &str) -> AuthResult<SessionRecord> {
        let normalisiert = code_normalisieren(code);
        if !code_format_gueltig(&normalisiert) {
            return Err(AuthError::CodeFormatUngueltig(code.to_string()));
        }

        let session = self
            .repo
            .get_by_code(&normalisiert)
            .await?
            .ok_or(AuthError::CodeNichtGefunden)?;

        if code_abgelaufen(session.session_code_expires, Utc::now()) {
            return Err(AuthError::CodeAbgelaufen {
                abgelaufen_am: session.session_code_expires,
            });
        }

        Ok(session)
    }
}
