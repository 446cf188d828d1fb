//! Session-Codes
//!
//! Ein Session-Code besteht aus genau 6 Zeichen aus A-Z und 0-9. Bei der
//! Eingabe werden Gross-/Kleinschreibung, Bindestriche und Leerzeichen
//! toleriert. Angezeigt wird der Code als `ABC-123`.

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use lexnova_db::DbResult;
use rand::Rng;

use crate::error::{AuthError, AuthResult};

/// Laenge eines Session-Codes (Zeichen)
pub const CODE_LAENGE: usize = 6;

const ZEICHEN: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Parameter fuer die Code-Vergabe
#[derive(Debug, Clone)]
pub struct CodeConfig {
    /// Gueltigkeit ab Vergabe
    pub gueltigkeit: Duration,
    /// Maximale Anzahl Versuche bei Kollisionen
    pub max_versuche: u32,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            gueltigkeit: Duration::hours(24),
            max_versuche: 5,
        }
    }
}

/// Generiert einen zufaelligen Session-Code (gleichverteilt ueber A-Z0-9)
pub fn code_generieren() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LAENGE)
        .map(|_| ZEICHEN[rng.gen_range(0..ZEICHEN.len())] as char)
        .collect()
}

/// Bringt eine Benutzereingabe in die kanonische Form
///
/// Grossbuchstaben, ohne Bindestriche und ohne Whitespace.
pub fn code_normalisieren(eingabe: &str) -> String {
    eingabe
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Prueft ob ein (normalisierter) Code das erwartete Format hat
pub fn code_format_gueltig(code: &str) -> bool {
    code.len() == CODE_LAENGE && code.bytes().all(|b| ZEICHEN.contains(&b))
}

/// Anzeigeform `ABC-123`
pub fn code_formatieren(code: &str) -> String {
    if code.len() == CODE_LAENGE && code.is_ascii() {
        format!("{}-{}", &code[..3], &code[3..])
    } else {
        code.to_string()
    }
}

/// Ein Code gilt als abgelaufen sobald sein Ablaufzeitpunkt vor `jetzt` liegt
pub fn code_abgelaufen(laeuft_ab_am: DateTime<Utc>, jetzt: DateTime<Utc>) -> bool {
    laeuft_ab_am < jetzt
}

/// Vergibt einen eindeutigen Code
///
/// `speichern` erhaelt Code und Ablaufzeitpunkt und persistiert beides.
/// Meldet der Speicher eine Eindeutigkeitsverletzung, wird mit einem neuen
/// Code wiederholt. Nach `max_versuche` Kollisionen schlaegt die Vergabe mit
/// `CodeRaumErschoepft` fehl; andere Fehler werden sofort weitergereicht.
pub async fn mit_eindeutigem_code<T, F, Fut>(config: &CodeConfig, mut speichern: F) -> AuthResult<T>
where
    F: FnMut(String, DateTime<Utc>) -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    let versuche = config.max_versuche.max(1);

    for versuch in 1..=versuche {
        let code = code_generieren();
        let laeuft_ab_am = Utc::now() + config.gueltigkeit;

        match speichern(code.clone(), laeuft_ab_am).await {
            Ok(wert) => return Ok(wert),
            Err(e) if e.ist_eindeutigkeit() => {
                tracing::debug!(versuch, code = %code, "Session-Code kollidiert, neuer Versuch");
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::error!(versuche, "Kein freier Session-Code gefunden");
    Err(AuthError::CodeRaumErschoepft { versuche })
}
