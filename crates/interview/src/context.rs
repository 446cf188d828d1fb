//! Gespraechskontext fuer die Reasoning-Engine
//!
//! Der Kontext wird einmal pro Session aus Skript, Namen und KI-Konfiguration
//! gebaut und enthaelt die maschinenlesbare Deklaration des Commit-Werkzeugs.

use lexnova_core::{StreamLabel, AI_OFFICER};
use lexnova_db::models::{SessionRecord, Strictness, VoiceStyle};
use serde_json::json;

use crate::error::{InterviewError, InterviewResult};

/// Name des Commit-Werkzeugs in der Deklaration
pub const COMMIT_WERKZEUG_NAME: &str = "commit_transcript";

/// Feste Grundlage fuer alle Zuege einer Session
#[derive(Debug, Clone)]
pub struct GespraechsKontext {
    pub anweisungen: String,
    pub werkzeug_deklaration: serde_json::Value,
    pub groom_name: String,
    pub bride_name: String,
}

impl GespraechsKontext {
    /// Sprecher, die das Commit-Werkzeug akzeptiert
    pub fn erlaubte_sprecher(&self) -> [&str; 3] {
        [self.groom_name.as_str(), self.bride_name.as_str(), AI_OFFICER]
    }
}

/// Hinweis auf eine konfliktierende Selbstvorstellung
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KonfliktHinweis {
    pub name: String,
    pub gebunden_an: StreamLabel,
}

/// Eingabe eines Zugs
#[derive(Debug, Clone, PartialEq)]
pub struct TurnEingabe {
    pub label: StreamLabel,
    /// Aufgeloester Sprecher; `None` wenn das Label ungebunden ist
    pub sprecher: Option<String>,
    pub text: String,
    /// Erkennungskonfidenz unter der Schwelle
    pub unklar: bool,
    pub konflikt: Option<KonfliktHinweis>,
}

impl TurnEingabe {
    /// Textform fuer Engines, die nur Text verarbeiten
    pub fn als_prompt(&self) -> String {
        let sprecher = self.sprecher.as_deref().unwrap_or("an unidentified speaker");
        let mut prompt = format!("[{}] {}: {}", self.label, sprecher, self.text);
        if self.unklar {
            prompt.push_str("\n(The recognition of this utterance was unclear. Ask for clarification if needed.)");
        }
        if let Some(k) = &self.konflikt {
            prompt.push_str(&format!(
                "\n(This speaker introduced themselves as {}, but that name is already bound to audio stream [{}]. Resolve the identity before continuing.)",
                k.name, k.gebunden_an
            ));
        }
        prompt
    }
}

/// Begruessung, mit der jedes Interview eroeffnet wird
pub fn begruessung(groom_name: &str, bride_name: &str) -> String {
    format!(
        "Good day. I am the LexNova automated verification officer. This session is for {groom_name} and {bride_name}. Let us begin the verification process."
    )
}

/// Baut den Kontext fuer eine Session
pub fn kontext_erstellen(session: &SessionRecord) -> InterviewResult<GespraechsKontext> {
    let skript = session
        .script_content
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(InterviewError::SkriptFehlt)?;

    let groom = session.groom_name.as_str();
    let bride = session.bride_name.as_str();

    let ton = match session.ai_config.voice_style {
        VoiceStyle::Warm => "Speak in a warm and reassuring tone.",
        VoiceStyle::Authoritative => "Speak in a formal and authoritative tone.",
    };
    let strenge = match session.ai_config.strictness {
        Strictness::High => {
            "If an answer is vague, incomplete or unclear, ask for clarification before moving to the next question."
        }
        Strictness::Low => {
            "Accept brief answers. Ask for clarification only if an answer cannot be understood."
        }
    };

    let anweisungen = format!(
        "You are the {AI_OFFICER}, conducting a legal verification interview for a marriage application.\n\
         Participants: {groom} (groom) and {bride} (bride).\n\
         {ton}\n\
         {strenge}\n\
         Follow the interview script below in order, one question at a time.\n\
         Before you answer, call {COMMIT_WERKZEUG_NAME} exactly once for the participant utterance you received, \
         then exactly once for your own reply with speaker \"{AI_OFFICER}\". Never skip a commit and never commit twice.\n\
         When the script is complete, close the interview politely and mark the interview as finished.\n\
         \n\
         INTERVIEW SCRIPT:\n\
         {skript}"
    );

    let werkzeug_deklaration = json!({
        "name": COMMIT_WERKZEUG_NAME,
        "description": "Record one utterance in the official interview transcript.",
        "parameters": {
            "type": "object",
            "properties": {
                "speaker": {
                    "type": "string",
                    "enum": [groom, bride, AI_OFFICER],
                    "description": "Who spoke the utterance."
                },
                "text": {
                    "type": "string",
                    "description": "The utterance, verbatim."
                }
            },
            "required": ["speaker", "text"]
        }
    });

    Ok(GespraechsKontext {
        anweisungen,
        werkzeug_deklaration,
        groom_name: groom.to_string(),
        bride_name: bride.to_string(),
    })
}
