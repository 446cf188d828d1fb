//! lexnova-core – Gemeinsame Typen, Ereignisse und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen LexNova-Crates gemeinsam genutzt werden: Identifikatoren,
//! den Session-Status mit seinen Uebergangsregeln, Teilnehmerrollen und
//! die Interview-Ereignisse.

pub mod error;
pub mod event;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{LexnovaError, Result};
pub use event::{EventSink, InterviewEvent};
pub use types::{
    EntryId, ParticipantRole, SessionId, SessionStatus, StreamLabel, AI_OFFICER,
    UNBEKANNTER_SPRECHER,
};
