//! Beitritt mit Metrik-Erfassung
//!
//! Duenne Schicht ueber dem `JoinAuthorizer`, die jeden Beitrittsversuch
//! nach Ergebnis zaehlt.

use std::sync::Arc;

use lexnova_auth::{AuthError, AuthResult, JoinAuthorizer, JoinErgebnis, SessionVorschau};
use lexnova_db::SessionRepository;
use lexnova_observability::InterviewMetrics;

pub struct ZugangsDienst<R: SessionRepository> {
    authorizer: Arc<JoinAuthorizer<R>>,
    metriken: InterviewMetrics,
}

impl<R: SessionRepository> ZugangsDienst<R> {
    pub fn neu(authorizer: Arc<JoinAuthorizer<R>>, metriken: InterviewMetrics) -> Self {
        Self {
            authorizer,
            metriken,
        }
    }

    /// Loest einen Beitrittscode ein und zaehlt das Ergebnis
    pub async fn einloesen(
        &self,
        code: &str,
        anzeigename: &str,
        rolle: &str,
    ) -> AuthResult<JoinErgebnis> {
        let ergebnis = self.authorizer.einloesen(code, anzeigename, rolle).await;
        let label = match &ergebnis {
            Ok(_) => "erfolg",
            Err(e) => ergebnis_label(e),
        };
        self.metriken.joins_total.with_label_values(&[label]).inc();
        ergebnis
    }

    pub async fn vorschau(&self, code: &str) -> AuthResult<SessionVorschau> {
        self.authorizer.vorschau(code).await
    }
}

fn ergebnis_label(e: &AuthError) -> &'static str {
    match e {
        AuthError::CodeFormatUngueltig(_) => "format",
        AuthError::CodeNichtGefunden => "nicht_gefunden",
        AuthError::CodeAbgelaufen { .. } => "abgelaufen",
        AuthError::RolleUngueltig(_) => "rolle",
        AuthError::NameUngueltig => "name",
        _ => "fehler",
    }
}
