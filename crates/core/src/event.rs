//! Interview-Ereignisse
//!
//! Alle Ereignisse, die waehrend eines Interviews entstehen. Die
//! Implementierung des Event-Kanals (tokio broadcast) liegt im
//! Interview-Crate; dieses Crate definiert nur Typen und die Senke.

use serde::{Deserialize, Serialize};

use crate::types::{EntryId, SessionId, StreamLabel};

/// Alle Ereignisse die ueber den Interview-Event-Kanal fliessen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InterviewEvent {
    /// Pipeline wurde gestartet, Session ist ACTIVE
    SessionAktiviert { session_id: SessionId },

    /// Ein Stream-Label wurde einem Teilnehmer zugeordnet
    SprecherGebunden {
        session_id: SessionId,
        label: StreamLabel,
        name: String,
    },

    /// Ein zweites Label beansprucht einen bereits gebundenen Namen
    SprecherKonflikt {
        session_id: SessionId,
        label: StreamLabel,
        name: String,
        gebunden_an: StreamLabel,
    },

    /// Ein Eintrag wurde dauerhaft ins Transkript geschrieben
    EintragProtokolliert {
        session_id: SessionId,
        entry_id: EntryId,
        sequenz: i64,
        sprecher: String,
    },

    /// Pipeline beendet, Session ist COMPLETED
    SessionAbgeschlossen { session_id: SessionId, grund: String },
}

impl InterviewEvent {
    /// Session, zu der das Ereignis gehoert
    pub fn session_id(&self) -> SessionId {
        match self {
            Self::SessionAktiviert { session_id }
            | Self::SprecherGebunden { session_id, .. }
            | Self::SprecherKonflikt { session_id, .. }
            | Self::EintragProtokolliert { session_id, .. }
            | Self::SessionAbgeschlossen { session_id, .. } => *session_id,
        }
    }
}

/// Senke fuer Interview-Ereignisse
///
/// Senden darf nie blockieren und nie fehlschlagen: fehlende Abonnenten
/// sind kein Fehler.
pub trait EventSink: Send + Sync + 'static {
    fn senden(&self, event: InterviewEvent);
}
