//! Prometheus-kompatible Metriken fuer LexNova
//!
//! Registrierte Metriken:
//! - `lexnova_sessions_active` – Gauge: Laufende Interview-Pipelines
//! - `lexnova_sessions_completed_total` – Counter: Abgeschlossene Sessions (grund)
//! - `lexnova_transcript_entries_total` – Counter: Protokollierte Eintraege (quelle)
//! - `lexnova_ledger_commit_retries_total` – Counter: Wiederholte Ledger-Schreibversuche
//! - `lexnova_turn_duration_seconds` – Histogram: Dauer eines Gespraechszugs
//! - `lexnova_speaker_conflicts_total` – Counter: Konfliktierende Selbstvorstellungen
//! - `lexnova_joins_total` – Counter: Beitrittsversuche (ergebnis)

use anyhow::Result;
use axum::{response::IntoResponse, routing::get, Router};
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Alle LexNova-Prometheus-Metriken
#[derive(Clone)]
pub struct InterviewMetrics {
    pub registry: Arc<Registry>,

    // Sessions
    pub sessions_active: IntGauge,
    pub sessions_completed_total: IntCounterVec,

    // Transkript
    pub transcript_entries_total: IntCounterVec,
    pub ledger_commit_retries_total: IntCounter,

    // Gespraechsfuehrung
    pub turn_duration_seconds: Histogram,
    pub speaker_conflicts_total: IntCounter,

    // Beitritt
    pub joins_total: IntCounterVec,
}

impl InterviewMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        // --- Sessions ---
        let sessions_active = IntGauge::with_opts(Opts::new(
            "lexnova_sessions_active",
            "Anzahl laufender Interview-Pipelines",
        ))?;
        registry.register(Box::new(sessions_active.clone()))?;

        let sessions_completed_total = IntCounterVec::new(
            Opts::new(
                "lexnova_sessions_completed_total",
                "Abgeschlossene Sessions nach Beendigungsgrund",
            ),
            &["grund"],
        )?;
        registry.register(Box::new(sessions_completed_total.clone()))?;

        // --- Transkript ---
        let transcript_entries_total = IntCounterVec::new(
            Opts::new(
                "lexnova_transcript_entries_total",
                "Protokollierte Transkript-Eintraege nach Herkunft",
            ),
            &["quelle"],
        )?;
        registry.register(Box::new(transcript_entries_total.clone()))?;

        let ledger_commit_retries_total = IntCounter::with_opts(Opts::new(
            "lexnova_ledger_commit_retries_total",
            "Wiederholte Schreibversuche des Transkript-Ledgers",
        ))?;
        registry.register(Box::new(ledger_commit_retries_total.clone()))?;

        // --- Gespraechsfuehrung ---
        let turn_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "lexnova_turn_duration_seconds",
                "Dauer eines Gespraechszugs (Entscheidung bis Wiedergabe-Ende)",
            )
            .buckets(vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0]),
        )?;
        registry.register(Box::new(turn_duration_seconds.clone()))?;

        let speaker_conflicts_total = IntCounter::with_opts(Opts::new(
            "lexnova_speaker_conflicts_total",
            "Selbstvorstellungen fuer bereits gebundene Namen",
        ))?;
        registry.register(Box::new(speaker_conflicts_total.clone()))?;

        // --- Beitritt ---
        let joins_total = IntCounterVec::new(
            Opts::new("lexnova_joins_total", "Beitrittsversuche nach Ergebnis"),
            &["ergebnis"],
        )?;
        registry.register(Box::new(joins_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            sessions_active,
            sessions_completed_total,
            transcript_entries_total,
            ledger_commit_retries_total,
            turn_duration_seconds,
            speaker_conflicts_total,
            joins_total,
        })
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: InterviewMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(
    axum::extract::State(metriken): axum::extract::State<InterviewMetrics>,
) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            axum::http::StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
