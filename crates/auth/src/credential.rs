//! Raum-Credentials
//!
//! Ein JoinCredential berechtigt genau eine Identitaet, genau einem Raum
//! beizutreten. Das Token ist ein HS256-signiertes JWT (Header.Claims.Signatur,
//! jeweils Base64-URL ohne Padding), wie es gaengige Echtzeit-Raumdienste
//! erwarten. Ohne konfiguriertes Secret wird ein Mock-Token fuer die lokale
//! Entwicklung ausgegeben.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use lexnova_core::ParticipantRole;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Konfiguration fuer die Credential-Ausstellung
#[derive(Debug, Clone)]
pub struct CredentialConfig {
    /// Oeffentlicher Schluessel beim Raumdienst (Issuer)
    pub api_key: String,
    /// Signatur-Secret; `None` aktiviert Mock-Tokens
    pub api_secret: Option<String>,
    /// Gueltigkeit eines ausgestellten Credentials
    pub ttl: Duration,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            api_key: "devkey".into(),
            api_secret: None,
            ttl: Duration::hours(2),
        }
    }
}

/// Berechtigungen innerhalb des Raums
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaumRechte {
    pub room: String,
    pub room_join: bool,
    pub can_publish: bool,
    pub can_subscribe: bool,
    pub can_publish_data: bool,
}

/// Claims eines Raum-Tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaumClaims {
    /// API-Key des Ausstellers
    pub iss: String,
    /// Identitaet des Teilnehmers
    pub sub: String,
    /// Anzeigename
    pub name: String,
    /// Teilnehmerrolle (groom/bride)
    pub metadata: String,
    pub nbf: i64,
    pub exp: i64,
    pub video: RaumRechte,
}

/// Ausgestelltes Beitritts-Credential
#[derive(Debug, Clone, Serialize)]
pub struct JoinCredential {
    pub raum: String,
    pub identitaet: Uuid,
    pub anzeigename: String,
    pub rolle: ParticipantRole,
    pub token: String,
    pub ausgestellt_am: DateTime<Utc>,
    pub laeuft_ab_am: DateTime<Utc>,
}

impl JoinCredential {
    pub fn ist_gueltig(&self, jetzt: DateTime<Utc>) -> bool {
        jetzt < self.laeuft_ab_am
    }
}

/// Stellt Raum-Credentials aus und prueft sie
#[derive(Debug, Clone)]
pub struct CredentialIssuer {
    config: CredentialConfig,
}

impl CredentialIssuer {
    pub fn neu(config: CredentialConfig) -> Self {
        if config.api_secret.is_none() {
            tracing::warn!("Kein Raum-Secret konfiguriert – es werden Mock-Tokens ausgegeben");
        }
        Self { config }
    }

    pub fn ist_mock(&self) -> bool {
        self.config.api_secret.is_none()
    }

    /// Stellt ein Credential fuer `raum` aus
    pub fn ausstellen(
        &self,
        raum: &str,
        anzeigename: &str,
        rolle: ParticipantRole,
    ) -> AuthResult<JoinCredential> {
        let identitaet = Uuid::new_v4();
        let ausgestellt_am = Utc::now();
        let laeuft_ab_am = ausgestellt_am + self.config.ttl;

        let token = match &self.config.api_secret {
            Some(secret) => {
                let claims = RaumClaims {
                    iss: self.config.api_key.clone(),
                    sub: identitaet.to_string(),
                    name: anzeigename.to_string(),
                    metadata: rolle.als_str().to_string(),
                    nbf: ausgestellt_am.timestamp(),
                    exp: laeuft_ab_am.timestamp(),
                    video: RaumRechte {
                        room: raum.to_string(),
                        room_join: true,
                        can_publish: true,
                        can_subscribe: true,
                        can_publish_data: true,
                    },
                };
                token_signieren(secret, &claims)?
            }
            None => format!("mock-token-{raum}-{anzeigename}"),
        };

        Ok(JoinCredential {
            raum: raum.to_string(),
            identitaet,
            anzeigename: anzeigename.to_string(),
            rolle,
            token,
            ausgestellt_am,
            laeuft_ab_am,
        })
    }

    /// Prueft Signatur und Ablauf eines Tokens und liefert die Claims
    pub fn pruefen(&self, token: &str, jetzt: DateTime<Utc>) -> AuthResult<RaumClaims> {
        let secret = self
            .config
            .api_secret
            .as_deref()
            .ok_or(AuthError::TokenUngueltig)?;

        let mut teile = token.split('.');
        let (Some(header), Some(claims), Some(signatur), None) =
            (teile.next(), teile.next(), teile.next(), teile.next())
        else {
            return Err(AuthError::TokenUngueltig);
        };

        let signatur = URL_SAFE_NO_PAD
            .decode(signatur)
            .map_err(|_| AuthError::TokenUngueltig)?;
        let mut mac = mac_erstellen(secret)?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(claims.as_bytes());
        mac.verify_slice(&signatur)
            .map_err(|_| AuthError::TokenUngueltig)?;

        let claims_json = URL_SAFE_NO_PAD
            .decode(claims)
            .map_err(|_| AuthError::TokenUngueltig)?;
        let claims: RaumClaims =
            serde_json::from_slice(&claims_json).map_err(|_| AuthError::TokenUngueltig)?;

        if claims.exp <= jetzt.timestamp() {
            return Err(AuthError::TokenAbgelaufen);
        }
        Ok(claims)
    }
}

fn mac_erstellen(secret: &str) -> AuthResult<HmacSha256> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AuthError::intern(format!("HMAC-Schluessel ungueltig: {e}")))
}

fn token_signieren(secret: &str, claims: &RaumClaims) -> AuthResult<String> {
    let claims_json = serde_json::to_vec(claims)
        .map_err(|e| AuthError::intern(format!("Claims nicht serialisierbar: {e}")))?;

    let kopf = URL_SAFE_NO_PAD.encode(TOKEN_HEADER);
    let rumpf = URL_SAFE_NO_PAD.encode(claims_json);

    let mut mac = mac_erstellen(secret)?;
    mac.update(kopf.as_bytes());
    mac.update(b".");
    mac.update(rumpf.as_bytes());
    let signatur = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{kopf}.{rumpf}.{signatur}"))
}
