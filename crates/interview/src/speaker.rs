//! Sprecherbindung
//!
//! Die Spracherkennung liefert nur anonyme Stream-Labels. Ein Label wird an
//! einen registrierten Namen gebunden, sobald auf ihm eine Selbstvorstellung
//! erkannt wird. Nur Vorstellungen in der ersten Person zaehlen; ein blosser
//! Name kann auch die Antwort auf eine Frage nach dem Partner sein. Gebundene Labels behalten ihren Namen fuer den Rest der
//! Session; ein zweites Label, das denselben Namen beansprucht, bleibt
//! ungebunden und wird einmalig als Konflikt gemeldet.

use std::collections::{HashMap, HashSet};

use lexnova_core::StreamLabel;

/// Einleitungen einer Selbstvorstellung (normalisiert, ohne Apostroph)
const VORSTELLUNGEN: &[&str] = &["this is", "my name is", "i am", "im"];

/// Ergebnis einer Aufloesung
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aufloesung {
    /// Label war bereits gebunden
    Gebunden(String),
    /// Label wurde mit dieser Aeusserung gebunden
    NeuGebunden(String),
    /// Name gehoert bereits zu einem anderen Label
    Konflikt {
        name: String,
        gebunden_an: StreamLabel,
        /// Erste Meldung fuer dieses (Label, Name)-Paar
        erstmals: bool,
    },
    /// Keine Zuordnung moeglich
    Unbekannt,
}

impl Aufloesung {
    /// Name, dem die Aeusserung zugeordnet wird
    pub fn sprecher(&self) -> Option<&str> {
        match self {
            Self::Gebunden(name) | Self::NeuGebunden(name) => Some(name),
            Self::Konflikt { .. } | Self::Unbekannt => None,
        }
    }
}

/// Ordnet Stream-Labels den registrierten Teilnehmern zu
#[derive(Debug, Clone)]
pub struct SpeakerResolver {
    /// (normalisiert, Originalschreibweise)
    namen: Vec<(String, String)>,
    bindungen: HashMap<StreamLabel, String>,
    name_zu_label: HashMap<String, StreamLabel>,
    gemeldete_konflikte: HashSet<(StreamLabel, String)>,
}

impl SpeakerResolver {
    pub fn neu<I, S>(registrierte_namen: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let namen = registrierte_namen
            .into_iter()
            .map(|n| {
                let name: String = n.into();
                (normalisieren(&name), name)
            })
            .filter(|(norm, _)| !norm.is_empty())
            .collect();

        Self {
            namen,
            bindungen: HashMap::new(),
            name_zu_label: HashMap::new(),
            gemeldete_konflikte: HashSet::new(),
        }
    }

    /// Loest den Sprecher einer Aeusserung auf und bindet das Label ggf.
    pub fn aufloesen(&mut self, label: &StreamLabel, text: &str) -> Aufloesung {
        if let Some(name) = self.bindungen.get(label) {
            return Aufloesung::Gebunden(name.clone());
        }

        let Some(name) = self.vorgestellter_name(text) else {
            return Aufloesung::Unbekannt;
        };

        if let Some(gebunden_an) = self.name_zu_label.get(&name) {
            let erstmals = self
                .gemeldete_konflikte
                .insert((label.clone(), name.clone()));
            return Aufloesung::Konflikt {
                name,
                gebunden_an: gebunden_an.clone(),
                erstmals,
            };
        }

        self.bindungen.insert(label.clone(), name.clone());
        self.name_zu_label.insert(name.clone(), label.clone());
        Aufloesung::NeuGebunden(name)
    }

    /// Aktuell gebundener Name eines Labels
    pub fn sprecher(&self, label: &StreamLabel) -> Option<&str> {
        self.bindungen.get(label).map(String::as_str)
    }

    pub fn anzahl_bindungen(&self) -> usize {
        self.bindungen.len()
    }

    /// Registrierter Name, falls `text` eine Selbstvorstellung ist
    fn vorgestellter_name(&self, text: &str) -> Option<String> {
        let norm = normalisieren(text);
        if norm.is_empty() {
            return None;
        }

        self.namen
            .iter()
            .find(|(name, _)| ist_vorstellung(&norm, name))
            .map(|(_, original)| original.clone())
    }
}

fn ist_vorstellung(aeusserung: &str, name: &str) -> bool {
    VORSTELLUNGEN.iter().any(|einleitung| {
        aeusserung
            .strip_prefix(einleitung)
            .and_then(|rest| rest.strip_prefix(' '))
            == Some(name)
    })
}

/// Kleinschreibung, Apostrophe entfernt, Satzzeichen als Leerzeichen,
/// Whitespace zusammengefasst
pub(crate) fn normalisieren(text: &str) -> String {
    let ersetzt: String = text
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}'))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect();
    ersetzt.split_whitespace().collect::<Vec<_>>().join(" ")
}
