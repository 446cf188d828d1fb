//! Integration-Tests fuer SessionRepository (In-Memory SQLite)

use chrono::{Duration, Utc};
use lexnova_core::SessionStatus;
use lexnova_db::{
    models::{AiConfig, NeueSession, Strictness, VoiceStyle},
    DbError, SessionRepository, SqliteDb,
};

async fn db() -> SqliteDb {
    SqliteDb::in_memory().await.expect("In-Memory DB konnte nicht erstellt werden")
}

fn neue_session(code: &str) -> NeueSession<'_> {
    NeueSession {
        groom_name: "John Doe",
        bride_name: "Jane Smith",
        date: "2026-11-02",
        ai_config: AiConfig::default(),
        session_code: code,
        session_code_expires: Utc::now() + Duration::hours(24),
    }
}

#[tokio::test]
async fn session_erstellen_und_laden() {
    let db = db().await;

    let session = SessionRepository::create(&db, neue_session("ABC123")).await.unwrap();
    assert_eq!(session.status, SessionStatus::Pending);
    assert_eq!(session.room_name, session.id.to_string());
    assert!(session.script_content.is_none());
    assert!(session.started_at.is_none());

    let geladen = SessionRepository::get(&db, session.id).await.unwrap().unwrap();
    assert_eq!(geladen.groom_name, "John Doe");
    assert_eq!(geladen.bride_name, "Jane Smith");
    assert_eq!(geladen.ai_config.voice_style, VoiceStyle::Warm);
    assert_eq!(geladen.ai_config.strictness, Strictness::High);

    let per_code = SessionRepository::get_by_code(&db, "ABC123").await.unwrap().unwrap();
    assert_eq!(per_code.id, session.id);
}

#[tokio::test]
async fn session_code_unique() {
    let db = db().await;
    SessionRepository::create(&db, neue_session("DUP001")).await.unwrap();

    let err = SessionRepository::create(&db, neue_session("DUP001")).await;
    assert!(err.is_err());
    assert!(err.unwrap_err().ist_eindeutigkeit());
}

#[tokio::test]
async fn skript_setzt_ready() {
    let db = db().await;
    let session = SessionRepository::create(&db, neue_session("SKR001")).await.unwrap();

    let ready = SessionRepository::update_script(&db, session.id, "Q1: state your name")
        .await
        .unwrap();
    assert_eq!(ready.status, SessionStatus::Ready);
    assert_eq!(ready.script_content.as_deref(), Some("Q1: state your name"));
    assert!(ready.hat_skript());

    // Erneutes Anhaengen ersetzt das Skript, Status bleibt ready
    let ersetzt = SessionRepository::update_script(&db, session.id, "Q1: neu")
        .await
        .unwrap();
    assert_eq!(ersetzt.status, SessionStatus::Ready);
    assert_eq!(ersetzt.script_content.as_deref(), Some("Q1: neu"));
}

#[tokio::test]
async fn status_compare_and_set() {
    let db = db().await;
    let session = SessionRepository::create(&db, neue_session("CAS001")).await.unwrap();
    SessionRepository::update_script(&db, session.id, "Q1").await.unwrap();

    let jetzt = Utc::now();
    let aktiv = SessionRepository::update_status(
        &db,
        session.id,
        SessionStatus::Ready,
        SessionStatus::Active,
        jetzt,
    )
    .await
    .unwrap();
    assert_eq!(aktiv.status, SessionStatus::Active);
    assert!(aktiv.started_at.is_some());
    assert!(aktiv.completed_at.is_none());

    // Zweiter Start mit veraltetem Erwartungswert greift nicht
    let zweiter = SessionRepository::update_status(
        &db,
        session.id,
        SessionStatus::Ready,
        SessionStatus::Active,
        Utc::now(),
    )
    .await;
    match zweiter {
        Err(DbError::StatusKonflikt { erwartet, aktuell }) => {
            assert_eq!(erwartet, "ready");
            assert_eq!(aktuell, "active");
        }
        other => panic!("StatusKonflikt erwartet, erhalten: {other:?}"),
    }

    let fertig = SessionRepository::update_status(
        &db,
        session.id,
        SessionStatus::Active,
        SessionStatus::Completed,
        Utc::now(),
    )
    .await
    .unwrap();
    assert_eq!(fertig.status, SessionStatus::Completed);
    assert!(fertig.completed_at.is_some());
    assert_eq!(fertig.started_at, aktiv.started_at, "started_at bleibt erhalten");
}

#[tokio::test]
async fn skript_nach_start_abgelehnt() {
    let db = db().await;
    let session = SessionRepository::create(&db, neue_session("SKR002")).await.unwrap();
    SessionRepository::update_script(&db, session.id, "Q1").await.unwrap();
    SessionRepository::update_status(
        &db,
        session.id,
        SessionStatus::Ready,
        SessionStatus::Active,
        Utc::now(),
    )
    .await
    .unwrap();

    let err = SessionRepository::update_script(&db, session.id, "Q2").await;
    assert!(matches!(err, Err(DbError::StatusKonflikt { .. })));
}

#[tokio::test]
async fn unbekannte_session() {
    let db = db().await;
    let id = uuid::Uuid::new_v4();

    assert!(SessionRepository::get(&db, id).await.unwrap().is_none());
    assert!(matches!(
        SessionRepository::update_script(&db, id, "Q1").await,
        Err(DbError::NichtGefunden(_))
    ));
    assert!(matches!(
        SessionRepository::update_status(
            &db,
            id,
            SessionStatus::Ready,
            SessionStatus::Active,
            Utc::now()
        )
        .await,
        Err(DbError::NichtGefunden(_))
    ));
}

#[tokio::test]
async fn liste_nach_status() {
    let db = db().await;
    let a = SessionRepository::create(&db, neue_session("LST001")).await.unwrap();
    SessionRepository::create(&db, neue_session("LST002")).await.unwrap();
    SessionRepository::update_script(&db, a.id, "Q1").await.unwrap();

    assert_eq!(SessionRepository::list(&db).await.unwrap().len(), 2);

    let ready = SessionRepository::list_by_status(&db, SessionStatus::Ready).await.unwrap();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].id, a.id);

    let pending = SessionRepository::list_by_status(&db, SessionStatus::Pending).await.unwrap();
    assert_eq!(pending.len(), 1);
}

#[tokio::test]
async fn code_erneuern() {
    let db = db().await;
    let session = SessionRepository::create(&db, neue_session("OLD001")).await.unwrap();
    SessionRepository::create(&db, neue_session("TAKEN1")).await.unwrap();

    let neu_ablauf = Utc::now() + Duration::hours(48);
    let erneuert = SessionRepository::update_code(&db, session.id, "NEW001", neu_ablauf)
        .await
        .unwrap();
    assert_eq!(erneuert.session_code, "NEW001");
    assert!(SessionRepository::get_by_code(&db, "OLD001").await.unwrap().is_none());

    let kollision = SessionRepository::update_code(&db, session.id, "TAKEN1", neu_ablauf).await;
    assert!(kollision.unwrap_err().ist_eindeutigkeit());
}
