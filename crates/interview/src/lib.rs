//! lexnova-interview – Verifikationsinterviews
//!
//! Dieses Crate implementiert:
//! - SessionService: Lebenszyklus `Pending -> Ready -> Active -> Completed`
//! - SpeakerResolver: Bindung anonymer Stream-Labels an registrierte Namen
//! - TranscriptLedger: lueckenloses, monotones Transkript mit Wiederholungen
//! - InterviewPipeline: Zugschleife aus Erkennung, Engine, Protokoll, Sprache
//! - InterviewHub: laufende Pipelines, Stopp, Ereigniskanal
//!
//! Externe Dienste (Raum, Erkennung, Engine, Synthese) werden ueber die
//! Traits in [`capability`] eingebunden.

pub mod capability;
pub mod context;
pub mod error;
pub mod hub;
pub mod ledger;
pub mod lifecycle;
pub mod pipeline;
pub mod speaker;
mod tool;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use capability::{
    AudioFrame, AudioRoom, Capabilities, CommitWerkzeug, ReasoningEngine, ReasoningReply,
    RecognizedUtterance, RoomTransport, SpeechRecognizer, SpeechSynthesizer,
};
pub use context::{GespraechsKontext, TurnEingabe};
pub use error::{CapabilityError, InterviewError, InterviewResult, ToolError};
pub use hub::{EventBus, HubConfig, InterviewHub, RaumParameter};
pub use ledger::{LedgerConfig, TranscriptLedger};
pub use lifecycle::{NeueSessionDaten, SessionBericht, SessionService};
pub use pipeline::{Beendigung, InterviewPipeline, PipelineConfig};
pub use speaker::{Aufloesung, SpeakerResolver};
