//! Health-Check-Endpunkt
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Version, Uptime, DB-Erreichbarkeit und
//! Anzahl laufender Interviews

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Status des Health-Checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub db_connected: bool,
    pub active_interviews: usize,
}

/// Geteilter Zustand; wird vom Server-Prozess aktualisiert
#[derive(Clone)]
pub struct HealthState {
    start_time: Arc<Instant>,
    db_connected: Arc<AtomicBool>,
    active_interviews: Arc<AtomicUsize>,
}

impl HealthState {
    pub fn neu() -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
            db_connected: Arc::new(AtomicBool::new(false)),
            active_interviews: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn db_verbunden(&self) -> bool {
        self.db_connected.load(Ordering::Relaxed)
    }

    pub fn db_status_setzen(&self, verbunden: bool) {
        self.db_connected.store(verbunden, Ordering::Relaxed);
    }

    pub fn aktive_interviews_setzen(&self, anzahl: usize) {
        self.active_interviews.store(anzahl, Ordering::Relaxed);
    }

    /// Momentaufnahme fuer die HTTP-Antwort
    pub fn antwort(&self) -> HealthResponse {
        let db_connected = self.db_verbunden();
        HealthResponse {
            // Ohne Datenbank kann kein Transkript geschrieben werden
            status: if db_connected {
                HealthStatus::Healthy
            } else {
                HealthStatus::Unhealthy
            },
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.uptime_seconds(),
            db_connected,
            active_interviews: self.active_interviews.load(Ordering::Relaxed),
        }
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::neu()
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let antwort = state.antwort();
    let http_status = match antwort.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (http_status, Json(antwort))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ohne_db_unhealthy() {
        let state = HealthState::neu();
        let antwort = state.antwort();
        assert_eq!(antwort.status, HealthStatus::Unhealthy);
        assert!(!antwort.db_connected);
    }

    #[test]
    fn db_status_umschalten() {
        let state = HealthState::neu();
        state.db_status_setzen(true);
        assert_eq!(state.antwort().status, HealthStatus::Healthy);
        state.db_status_setzen(false);
        assert!(!state.db_verbunden());
    }

    #[test]
    fn klone_teilen_zustand() {
        let state = HealthState::neu();
        let klon = state.clone();
        klon.aktive_interviews_setzen(3);
        klon.db_status_setzen(true);
        let antwort = state.antwort();
        assert_eq!(antwort.active_interviews, 3);
        assert!(antwort.db_connected);
    }

    #[test]
    fn antwort_serialisierung() {
        let state = HealthState::neu();
        state.db_status_setzen(true);
        let json = serde_json::to_string(&state.antwort()).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"db_connected\":true"));
        assert!(json.contains("\"active_interviews\":0"));
    }
}
