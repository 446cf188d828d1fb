//! Tests fuer die Interview-Pipeline mit skriptbaren Diensten

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use lexnova_core::{InterviewEvent, SessionId, SessionStatus, StreamLabel, AI_OFFICER, UNBEKANNTER_SPRECHER};
use lexnova_db::{
    models::{EintragsQuelle, TranskriptRecord},
    SessionRepository, SqliteDb, TranscriptRepository,
};
use lexnova_observability::InterviewMetrics;
use tokio::sync::watch;

use super::fakes::{
    aeusserung, aktive_session, dienste_ohne_raum, test_config, test_db, test_dienste,
    unklare_aeusserung, EngineSchritt, StoerModus, StoerRepo, TestDienste,
};
use crate::context::begruessung;
use crate::error::CapabilityError;
use crate::hub::EventBus;
use crate::pipeline::{Beendigung, InterviewPipeline, PipelineConfig};

async fn ausfuehren_mit(
    db: &Arc<SqliteDb>,
    dienste: &TestDienste,
    config: PipelineConfig,
) -> (Beendigung, Vec<TranskriptRecord>, uuid::Uuid) {
    let (lifecycle, session) = aktive_session(db).await;
    let session_id = session.id;
    let (_stop_tx, stop_rx) = watch::channel(false);

    let beendigung = InterviewPipeline::neu(
        session,
        Arc::clone(db),
        lifecycle,
        dienste.caps.clone(),
        config,
    )
    .ausfuehren(stop_rx)
    .await;

    let eintraege = db.list_for_session(session_id).await.unwrap();
    (beendigung, eintraege, session_id)
}

fn zeilen(eintraege: &[TranskriptRecord]) -> Vec<(String, String)> {
    eintraege
        .iter()
        .map(|e| (e.speaker.clone(), e.text.clone()))
        .collect()
}

fn zeile(sprecher: &str, text: &str) -> (String, String) {
    (sprecher.to_string(), text.to_string())
}

#[tokio::test]
async fn test_vollstaendiges_interview_mit_zwei_sprechern() {
    let db = test_db().await;
    let dienste = test_dienste(
        vec![
            aeusserung("spk_a", "This is John Doe"),
            aeusserung("spk_b", "This is Jane Smith"),
            aeusserung("spk_a", "We met in 2019"),
        ],
        vec![
            EngineSchritt::Beide("Thank you, John.".into()),
            EngineSchritt::Beide("Thank you, Jane. Where did you meet?".into()),
            EngineSchritt::Beide("Noted.".into()),
        ],
        false,
    );

    let (beendigung, eintraege, session_id) = ausfuehren_mit(&db, &dienste, test_config()).await;
    assert_eq!(beendigung, Beendigung::Regulaer);

    let gruss = begruessung("John Doe", "Jane Smith");
    assert_eq!(
        zeilen(&eintraege),
        vec![
            zeile(AI_OFFICER, &gruss),
            zeile("John Doe", "This is John Doe"),
            zeile(AI_OFFICER, "Thank you, John."),
            zeile("Jane Smith", "This is Jane Smith"),
            zeile(AI_OFFICER, "Thank you, Jane. Where did you meet?"),
            zeile("John Doe", "We met in 2019"),
            zeile(AI_OFFICER, "Noted."),
        ]
    );
    assert_eq!(eintraege[0].sequence, 0);
    assert_eq!(eintraege[0].source, EintragsQuelle::Pipeline);
    assert!(eintraege[1..].iter().all(|e| e.source == EintragsQuelle::Tool));
    assert!(eintraege.windows(2).all(|w| w[0].sequence + 1 == w[1].sequence));
    assert!(eintraege.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    // Jede gesprochene Antwort steht vorher im Transkript
    assert_eq!(
        dienste.beobachtung.gesprochen(),
        vec![
            gruss,
            "Thank you, John.".to_string(),
            "Thank you, Jane. Where did you meet?".to_string(),
            "Noted.".to_string(),
        ]
    );

    let session = db.get(session_id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert!(dienste.beobachtung.raum_verlassen.load(Ordering::SeqCst));
    assert!(dienste.beobachtung.tool_fehler().is_empty());
}

#[tokio::test]
async fn test_engine_sieht_gebundene_sprecher() {
    let db = test_db().await;
    let dienste = test_dienste(
        vec![
            aeusserung("spk_a", "Hello"),
            aeusserung("spk_a", "My name is John Doe"),
            aeusserung("spk_a", "We live in Vienna"),
        ],
        vec![],
        false,
    );

    ausfuehren_mit(&db, &dienste, test_config()).await;

    let sprecher: Vec<Option<String>> = dienste
        .beobachtung
        .eingaben()
        .into_iter()
        .map(|e| e.sprecher)
        .collect();
    assert_eq!(
        sprecher,
        vec![None, Some("John Doe".into()), Some("John Doe".into())]
    );
}

#[tokio::test]
async fn test_ungebundener_sprecher_wird_unbekannt_protokolliert() {
    let db = test_db().await;
    // Die Engine ordnet das ungebundene Label dem Braeutigam zu
    let dienste = test_dienste(vec![aeusserung("spk_x", "Good morning")], vec![], false);

    let (_, eintraege, _) = ausfuehren_mit(&db, &dienste, test_config()).await;

    assert_eq!(eintraege.len(), 3);
    assert_eq!(eintraege[1].speaker, UNBEKANNTER_SPRECHER);
    assert_eq!(eintraege[1].text, "Good morning");
}

#[tokio::test]
async fn test_partnername_als_antwort_bindet_nicht() {
    let db = test_db().await;
    let dienste = test_dienste(
        vec![
            aeusserung("spk_a", "Jane Smith"),
            aeusserung("spk_b", "This is Jane Smith"),
            aeusserung("spk_a", "This is John Doe"),
        ],
        vec![],
        false,
    );

    let (_, eintraege, _) = ausfuehren_mit(&db, &dienste, test_config()).await;

    let teilnehmer: Vec<_> = eintraege
        .iter()
        .filter(|e| e.speaker != AI_OFFICER)
        .map(|e| (e.speaker.clone(), e.text.clone()))
        .collect();
    assert_eq!(
        teilnehmer,
        vec![
            zeile(UNBEKANNTER_SPRECHER, "Jane Smith"),
            zeile("Jane Smith", "This is Jane Smith"),
            zeile("John Doe", "This is John Doe"),
        ]
    );
    assert!(dienste
        .beobachtung
        .eingaben()
        .iter()
        .all(|e| e.konflikt.is_none()));
}

#[tokio::test]
async fn test_ersatzeintraege_wenn_engine_nichts_protokolliert() {
    let db = test_db().await;
    let dienste = test_dienste(
        vec![aeusserung("spk_a", "This is John Doe")],
        vec![EngineSchritt::Nichts("Welcome, John.".into())],
        false,
    );

    let (_, eintraege, _) = ausfuehren_mit(&db, &dienste, test_config()).await;

    assert_eq!(
        zeilen(&eintraege[1..]),
        vec![
            zeile("John Doe", "This is John Doe"),
            zeile(AI_OFFICER, "Welcome, John."),
        ]
    );
    assert!(eintraege[1..].iter().all(|e| e.source == EintragsQuelle::Fallback));
}

#[tokio::test]
async fn test_nur_antwort_protokolliert_haelt_sprechreihenfolge() {
    let db = test_db().await;
    let dienste = test_dienste(
        vec![aeusserung("spk_b", "I'm Jane Smith")],
        vec![EngineSchritt::NurAntwort("Thank you, Jane.".into())],
        false,
    );

    let (_, eintraege, _) = ausfuehren_mit(&db, &dienste, test_config()).await;

    assert_eq!(
        zeilen(&eintraege[1..]),
        vec![
            zeile("Jane Smith", "I'm Jane Smith"),
            zeile(AI_OFFICER, "Thank you, Jane."),
        ]
    );
    assert_eq!(eintraege[1].source, EintragsQuelle::Fallback);
    assert_eq!(eintraege[2].source, EintragsQuelle::Tool);
}

#[tokio::test]
async fn test_doppelter_commit_erzeugt_einen_eintrag() {
    let db = test_db().await;
    let dienste = test_dienste(
        vec![aeusserung("spk_a", "This is John Doe")],
        vec![EngineSchritt::DoppelCommit("Thank you.".into())],
        false,
    );

    let (_, eintraege, _) = ausfuehren_mit(&db, &dienste, test_config()).await;

    assert_eq!(eintraege.len(), 3);
    assert_eq!(
        dienste.beobachtung.tool_fehler(),
        vec![crate::error::ToolError::BereitsProtokolliert("John Doe".into())]
    );
}

#[tokio::test]
async fn test_engine_beendet_interview() {
    let db = test_db().await;
    let dienste = test_dienste(
        vec![
            aeusserung("spk_a", "This is John Doe"),
            aeusserung("spk_a", "Anything else?"),
        ],
        vec![EngineSchritt::Abschluss("That concludes the interview.".into())],
        true,
    );

    let (beendigung, eintraege, session_id) = ausfuehren_mit(&db, &dienste, test_config()).await;

    assert_eq!(beendigung, Beendigung::Regulaer);
    assert_eq!(eintraege.len(), 3);
    assert_eq!(eintraege[2].text, "That concludes the interview.");
    assert_eq!(dienste.beobachtung.eingaben().len(), 1);
    let session = db.get(session_id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
}

#[tokio::test]
async fn test_unklare_aeusserung_wird_markiert() {
    let db = test_db().await;
    let dienste = test_dienste(
        vec![
            unklare_aeusserung("spk_a", "mumble"),
            aeusserung("spk_a", "This is John Doe"),
        ],
        vec![],
        false,
    );

    ausfuehren_mit(&db, &dienste, test_config()).await;

    let unklar: Vec<bool> = dienste.beobachtung.eingaben().iter().map(|e| e.unklar).collect();
    assert_eq!(unklar, vec![true, false]);
}

#[tokio::test]
async fn test_leere_aeusserungen_werden_uebersprungen() {
    let db = test_db().await;
    let dienste = test_dienste(
        vec![aeusserung("spk_a", "   "), aeusserung("spk_a", "This is John Doe")],
        vec![],
        false,
    );

    let (_, eintraege, _) = ausfuehren_mit(&db, &dienste, test_config()).await;

    assert_eq!(dienste.beobachtung.eingaben().len(), 1);
    assert_eq!(eintraege.len(), 3);
}

#[tokio::test]
async fn test_sprecherkonflikt_wird_gemeldet() {
    let db = test_db().await;
    let (lifecycle, session) = aktive_session(&db).await;
    let dienste = test_dienste(
        vec![
            aeusserung("spk_a", "This is John Doe"),
            aeusserung("spk_b", "This is John Doe"),
            aeusserung("spk_b", "I am John Doe"),
        ],
        vec![],
        false,
    );
    let bus = EventBus::neu(64);
    let mut rx = bus.abonnieren();
    let metriken = InterviewMetrics::neu().unwrap();
    let (_stop_tx, stop_rx) = watch::channel(false);

    InterviewPipeline::neu(session, Arc::clone(&db), lifecycle, dienste.caps.clone(), test_config())
        .mit_events(Arc::new(bus))
        .mit_metriken(metriken.clone())
        .ausfuehren(stop_rx)
        .await;

    let mut konflikte = Vec::new();
    let mut bindungen = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            InterviewEvent::SprecherKonflikt { label, gebunden_an, .. } => konflikte.push((label, gebunden_an)),
            InterviewEvent::SprecherGebunden { label, name, .. } => bindungen.push((label, name)),
            _ => {}
        }
    }
    assert_eq!(bindungen, vec![(StreamLabel::new("spk_a"), "John Doe".to_string())]);
    assert_eq!(
        konflikte,
        vec![(StreamLabel::new("spk_b"), StreamLabel::new("spk_a"))]
    );
    assert_eq!(metriken.speaker_conflicts_total.get(), 1);

    // Die Engine bekommt den Hinweis bei jeder konfliktierenden Aeusserung
    let eingaben = dienste.beobachtung.eingaben();
    assert!(eingaben[0].konflikt.is_none());
    assert!(eingaben[1].konflikt.is_some());
    assert!(eingaben[2].konflikt.is_some());
    assert!(eingaben[1].sprecher.is_none());
}

#[tokio::test]
async fn test_frist_ueberschritten_zaehlt_als_fehler() {
    let db = test_db().await;
    let dienste = test_dienste(
        vec![
            aeusserung("spk_a", "This is John Doe"),
            aeusserung("spk_a", "Hello?"),
            aeusserung("spk_a", "Anyone there?"),
            aeusserung("spk_a", "Never processed"),
        ],
        vec![EngineSchritt::Haengen, EngineSchritt::Haengen, EngineSchritt::Haengen],
        false,
    );
    let config = PipelineConfig {
        turn_frist: Duration::from_millis(30),
        ..test_config()
    };

    let (beendigung, eintraege, session_id) = ausfuehren_mit(&db, &dienste, config).await;

    assert_eq!(beendigung, Beendigung::ZuVieleFehler);
    // Begruessung plus drei nachgetragene Teilnehmer-Aeusserungen
    assert_eq!(
        zeilen(&eintraege[1..]),
        vec![
            zeile("John Doe", "This is John Doe"),
            zeile("John Doe", "Hello?"),
            zeile("John Doe", "Anyone there?"),
        ]
    );
    assert!(eintraege[1..].iter().all(|e| e.source == EintragsQuelle::Fallback));
    let session = db.get(session_id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
}

#[tokio::test]
async fn test_erfolgreicher_zug_setzt_fehlerzaehler_zurueck() {
    let db = test_db().await;
    let dienste = test_dienste(
        vec![
            aeusserung("spk_a", "one"),
            aeusserung("spk_a", "two"),
            aeusserung("spk_a", "three"),
            aeusserung("spk_a", "four"),
            aeusserung("spk_a", "five"),
        ],
        vec![
            EngineSchritt::Fehler(CapabilityError::voruebergehend("Zeitueberschreitung")),
            EngineSchritt::Fehler(CapabilityError::voruebergehend("Zeitueberschreitung")),
            EngineSchritt::Beide("ok".into()),
            EngineSchritt::Fehler(CapabilityError::voruebergehend("Zeitueberschreitung")),
            EngineSchritt::Fehler(CapabilityError::voruebergehend("Zeitueberschreitung")),
        ],
        false,
    );

    let (beendigung, eintraege, _) = ausfuehren_mit(&db, &dienste, test_config()).await;

    assert_eq!(beendigung, Beendigung::Regulaer);
    // Begruessung, fuenf Aeusserungen und eine Antwort
    assert_eq!(eintraege.len(), 7);
}

#[tokio::test]
async fn test_dauerhafter_fehler_beendet_interview() {
    let db = test_db().await;
    let dienste = test_dienste(
        vec![aeusserung("spk_a", "This is John Doe"), aeusserung("spk_a", "Hello")],
        vec![EngineSchritt::Fehler(CapabilityError::dauerhaft("Modell nicht verfuegbar"))],
        true,
    );

    let (beendigung, eintraege, session_id) = ausfuehren_mit(&db, &dienste, test_config()).await;

    assert!(matches!(beendigung, Beendigung::Fehler(_)));
    // Die Aeusserung des Teilnehmers geht nicht verloren
    assert_eq!(eintraege.len(), 2);
    assert_eq!(eintraege[1].speaker, "John Doe");
    let session = db.get(session_id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
}

#[tokio::test]
async fn test_raum_nicht_erreichbar() {
    let db = test_db().await;
    let dienste = dienste_ohne_raum();

    let (beendigung, eintraege, session_id) = ausfuehren_mit(&db, &dienste, test_config()).await;

    assert!(matches!(beendigung, Beendigung::Fehler(_)));
    assert!(eintraege.is_empty());
    let session = db.get(session_id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
}

#[tokio::test]
async fn test_zeitlimit_beendet_interview() {
    let db = test_db().await;
    let dienste = test_dienste(vec![aeusserung("spk_a", "This is John Doe")], vec![], true);
    let config = PipelineConfig {
        max_dauer: Duration::from_millis(200),
        ..test_config()
    };

    let (beendigung, eintraege, session_id) = ausfuehren_mit(&db, &dienste, config).await;

    assert_eq!(beendigung, Beendigung::Zeitlimit);
    assert_eq!(eintraege.len(), 3);
    let session = db.get(session_id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert!(session.completed_at.is_some());

    // Nach dem Zeitlimit wird nichts mehr protokolliert
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(db.count_for_session(session_id).await.unwrap(), 3);
}

#[tokio::test]
async fn test_zeitlimit_bricht_haengenden_zug_ab() {
    let db = test_db().await;
    let dienste = test_dienste(
        vec![aeusserung("spk_a", "This is John Doe")],
        vec![EngineSchritt::Haengen],
        true,
    );
    let config = PipelineConfig {
        max_dauer: Duration::from_millis(150),
        turn_frist: Duration::from_secs(30),
        ..test_config()
    };

    let start = std::time::Instant::now();
    let (beendigung, eintraege, _) = ausfuehren_mit(&db, &dienste, config).await;

    assert_eq!(beendigung, Beendigung::Zeitlimit);
    assert!(start.elapsed() < Duration::from_secs(5));
    // Die vor dem Zeitlimit gesprochene Aeusserung bleibt erhalten
    assert_eq!(
        zeilen(&eintraege),
        vec![
            zeile(AI_OFFICER, &begruessung("John Doe", "Jane Smith")),
            zeile("John Doe", "This is John Doe"),
        ]
    );
    assert_eq!(eintraege[1].source, EintragsQuelle::Fallback);
    // Die Antwort des abgebrochenen Zugs wird weder protokolliert noch gesprochen
    assert_eq!(dienste.beobachtung.gesprochen().len(), 1);
}

#[tokio::test]
async fn test_zeitlimit_nach_commit_schreibt_nichts_doppelt() {
    let db = test_db().await;
    let dienste = test_dienste(
        vec![aeusserung("spk_a", "This is John Doe")],
        vec![EngineSchritt::ProtokollierenUndHaengen("Welcome, John.".into())],
        true,
    );
    let config = PipelineConfig {
        max_dauer: Duration::from_millis(150),
        turn_frist: Duration::from_secs(30),
        ..test_config()
    };

    let (beendigung, eintraege, _) = ausfuehren_mit(&db, &dienste, config).await;

    assert_eq!(beendigung, Beendigung::Zeitlimit);
    assert_eq!(
        zeilen(&eintraege[1..]),
        vec![
            zeile("John Doe", "This is John Doe"),
            zeile(AI_OFFICER, "Welcome, John."),
        ]
    );
    assert!(eintraege[1..].iter().all(|e| e.source == EintragsQuelle::Tool));
}

#[tokio::test]
async fn test_stopp_waehrend_zug_traegt_aeusserung_nach() {
    let db = test_db().await;
    let (lifecycle, session) = aktive_session(&db).await;
    let session_id = session.id;
    let dienste = test_dienste(
        vec![aeusserung("spk_b", "I do consent")],
        vec![EngineSchritt::Haengen],
        true,
    );
    let (stop_tx, stop_rx) = watch::channel(false);

    let pipeline =
        InterviewPipeline::neu(session, Arc::clone(&db), lifecycle, dienste.caps.clone(), test_config());
    let handle = tokio::spawn(pipeline.ausfuehren(stop_rx));

    // Warten bis die Engine die Aeusserung erhalten hat
    for _ in 0..100 {
        if !dienste.beobachtung.eingaben().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    stop_tx.send(true).unwrap();

    let beendigung = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("Pipeline muss nach dem Stopp enden")
        .unwrap();
    assert_eq!(beendigung, Beendigung::Gestoppt);

    let eintraege = db.list_for_session(session_id).await.unwrap();
    assert_eq!(eintraege.len(), 2);
    assert_eq!(eintraege[1].speaker, UNBEKANNTER_SPRECHER);
    assert_eq!(eintraege[1].text, "I do consent");
    assert_eq!(eintraege[1].sequence, 1);
}

#[tokio::test]
async fn test_stopp_beendet_interview() {
    let db = test_db().await;
    let (lifecycle, session) = aktive_session(&db).await;
    let session_id = session.id;
    let dienste = test_dienste(vec![aeusserung("spk_a", "This is John Doe")], vec![], true);
    let (stop_tx, stop_rx) = watch::channel(false);

    let pipeline =
        InterviewPipeline::neu(session, Arc::clone(&db), lifecycle, dienste.caps.clone(), test_config());
    let handle = tokio::spawn(pipeline.ausfuehren(stop_rx));

    // Warten bis der erste Zug protokolliert ist
    for _ in 0..100 {
        if db.count_for_session(session_id).await.unwrap() >= 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    stop_tx.send(true).unwrap();

    let beendigung = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("Pipeline muss nach dem Stopp enden")
        .unwrap();
    assert_eq!(beendigung, Beendigung::Gestoppt);
    let session = db.get(session_id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert!(dienste.beobachtung.raum_verlassen.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_ledger_ausfall_beendet_interview() {
    let repo = StoerRepo::neu().await;
    let (lifecycle, session) = aktive_session(&repo).await;
    let session_id = session.id;
    let dienste = test_dienste(
        vec![aeusserung("spk_a", "This is John Doe"), aeusserung("spk_a", "Hello")],
        vec![],
        true,
    );
    let (_stop_tx, stop_rx) = watch::channel(false);

    // Begruessung gelingt, danach faellt die Datenbank aus
    repo.stoeren(StoerModus::AppendFehlschlagen, 1);
    let beendigung = InterviewPipeline::neu(session, Arc::clone(&repo), lifecycle, dienste.caps.clone(), test_config())
        .ausfuehren(stop_rx)
        .await;

    assert_eq!(beendigung, Beendigung::LedgerNichtVerfuegbar);
    assert_eq!(repo.count_for_session(session_id).await.unwrap(), 1);
    // Die Antwort wurde nie gesprochen
    assert_eq!(dienste.beobachtung.gesprochen().len(), 1);
    let session = repo.get(session_id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
}

#[tokio::test]
async fn test_metriken_und_abschlussereignis() {
    let db = test_db().await;
    let (lifecycle, session) = aktive_session(&db).await;
    let session_id = SessionId(session.id);
    let dienste = test_dienste(vec![aeusserung("spk_a", "This is John Doe")], vec![], false);
    let bus = EventBus::neu(64);
    let mut rx = bus.abonnieren();
    let metriken = InterviewMetrics::neu().unwrap();
    let (_stop_tx, stop_rx) = watch::channel(false);

    InterviewPipeline::neu(session, Arc::clone(&db), lifecycle, dienste.caps.clone(), test_config())
        .mit_events(Arc::new(bus))
        .mit_metriken(metriken.clone())
        .ausfuehren(stop_rx)
        .await;

    let mut ereignisse = Vec::new();
    while let Ok(e) = rx.try_recv() {
        ereignisse.push(e);
    }
    assert_eq!(
        ereignisse.first(),
        Some(&InterviewEvent::SessionAktiviert { session_id })
    );
    assert_eq!(
        ereignisse.last(),
        Some(&InterviewEvent::SessionAbgeschlossen {
            session_id,
            grund: "regulaer".into(),
        })
    );
    let protokolliert = ereignisse
        .iter()
        .filter(|e| matches!(e, InterviewEvent::EintragProtokolliert { .. }))
        .count();
    assert_eq!(protokolliert, 3);

    assert_eq!(
        metriken
            .sessions_completed_total
            .with_label_values(&["regulaer"])
            .get(),
        1
    );
    assert_eq!(
        metriken
            .transcript_entries_total
            .with_label_values(&["pipeline"])
            .get(),
        1
    );
    assert_eq!(metriken.turn_duration_seconds.get_sample_count(), 1);
}
