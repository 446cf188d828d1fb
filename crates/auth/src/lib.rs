//! lexnova-auth – Beitrittscodes und Raum-Credentials
//!
//! Dieses Crate implementiert:
//! - Session-Codes (Erzeugung, Normalisierung, Formatpruefung, Ablauf)
//! - Eindeutige Code-Vergabe mit begrenztem Wiederholungsbudget
//! - JoinCredential-Ausstellung (HS256-signierte Raum-Tokens mit TTL)
//! - JoinAuthorizer (Code einloesen, Vorschau ohne Beitritt)

pub mod credential;
pub mod error;
pub mod join;
pub mod session_code;

// Bequeme Re-Exporte
pub use credential::{CredentialConfig, CredentialIssuer, JoinCredential, RaumClaims};
pub use error::{AuthError, AuthResult};
pub use join::{JoinAuthorizer, JoinErgebnis, SessionVorschau};
pub use session_code::{CodeConfig, mit_eindeutigem_code};
