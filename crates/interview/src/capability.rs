//! Capability-Traits fuer externe Dienste
//!
//! Raum-Transport, Spracherkennung, Reasoning-Engine und Sprachsynthese sind
//! austauschbar. Die Pipeline kennt nur diese Traits; konkrete Anbieter werden
//! ueber [`Capabilities`] zur Laufzeit eingesetzt. Audio und Erkennungsergebnisse
//! fliessen ueber tokio-mpsc-Kanaele.

use std::sync::Arc;

use async_trait::async_trait;
use lexnova_core::{EntryId, StreamLabel};
use tokio::sync::mpsc;

use crate::context::{GespraechsKontext, TurnEingabe};
use crate::error::{CapabilityResult, ToolError};

/// Ein Block PCM-Audio (mono, 16 bit)
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    /// Herkunft im Raum; fuer synthetisierte Ausgabe leer
    pub label: StreamLabel,
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

/// Finalisierte Aeusserung aus der Spracherkennung
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedUtterance {
    pub label: StreamLabel,
    pub text: String,
    /// 0.0 bis 1.0
    pub confidence: f32,
}

/// Antwort der Reasoning-Engine fuer einen Zug
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReasoningReply {
    /// Gesprochene Antwort des Interviewers
    pub text: String,
    /// Interview ist aus Sicht der Engine beendet
    pub abschliessen: bool,
}

impl ReasoningReply {
    pub fn weiter(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            abschliessen: false,
        }
    }

    pub fn abschluss(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            abschliessen: true,
        }
    }
}

/// Verbindung zum Echtzeit-Audioraum
#[async_trait]
pub trait RoomTransport: Send + Sync {
    /// Tritt dem Raum als automatisierter Interviewer bei
    async fn beitreten(&self, raum: &str) -> CapabilityResult<Box<dyn AudioRoom>>;
}

/// Ein beigetretener Audioraum
#[async_trait]
pub trait AudioRoom: Send + Sync {
    /// Eingehendes Teilnehmer-Audio; darf nur einmal abgeholt werden
    async fn audio_eingang(&self) -> CapabilityResult<mpsc::Receiver<AudioFrame>>;

    /// Spielt Audio ab und kehrt erst nach Ende der Wiedergabe zurueck
    async fn abspielen(&self, audio: mpsc::Receiver<AudioFrame>) -> CapabilityResult<()>;

    /// Verlaesst den Raum
    async fn verlassen(&self);
}

/// Streaming-Spracherkennung mit Sprechertrennung
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Liefert finalisierte Aeusserungen; Kanalende bedeutet Ende des Audios
    async fn transkribieren(
        &self,
        audio: mpsc::Receiver<AudioFrame>,
    ) -> CapabilityResult<mpsc::Receiver<CapabilityResult<RecognizedUtterance>>>;
}

/// Werkzeug, mit dem die Reasoning-Engine Aeusserungen protokolliert
#[async_trait]
pub trait CommitWerkzeug: Send + Sync {
    async fn protokollieren(&self, sprecher: &str, text: &str) -> Result<EntryId, ToolError>;
}

/// Entscheidet ueber die naechste Frage des Interviewers
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    async fn gespraech(
        &self,
        kontext: &GespraechsKontext,
        eingabe: &TurnEingabe,
        werkzeug: &dyn CommitWerkzeug,
    ) -> CapabilityResult<ReasoningReply>;
}

/// Text-zu-Sprache
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthetisieren(&self, text: &str) -> CapabilityResult<mpsc::Receiver<AudioFrame>>;
}

/// Buendel aller Dienste, die eine Pipeline braucht
#[derive(Clone)]
pub struct Capabilities {
    pub transport: Arc<dyn RoomTransport>,
    pub erkenner: Arc<dyn SpeechRecognizer>,
    pub engine: Arc<dyn ReasoningEngine>,
    pub synthese: Arc<dyn SpeechSynthesizer>,
}
