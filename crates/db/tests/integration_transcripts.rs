//! Integration-Tests fuer TranscriptRepository (In-Memory SQLite)

use chrono::{Duration, Utc};
use lexnova_db::{
    models::{AiConfig, EintragsQuelle, NeueSession, NeuerTranskriptEintrag},
    DbError, SessionRepository, SqliteDb, TranscriptRepository,
};
use uuid::Uuid;

async fn db_mit_session() -> (SqliteDb, Uuid) {
    let db = SqliteDb::in_memory().await.expect("In-Memory DB konnte nicht erstellt werden");
    let session = SessionRepository::create(
        &db,
        NeueSession {
            groom_name: "John Doe",
            bride_name: "Jane Smith",
            date: "2026-11-02",
            ai_config: AiConfig::default(),
            session_code: "TRN001",
            session_code_expires: Utc::now() + Duration::hours(24),
        },
    )
    .await
    .unwrap();
    (db, session.id)
}

fn eintrag<'a>(session_id: Uuid, sequence: i64, speaker: &'a str, text: &'a str) -> NeuerTranskriptEintrag<'a> {
    NeuerTranskriptEintrag {
        id: Uuid::new_v4(),
        session_id,
        sequence,
        speaker,
        text,
        source: EintragsQuelle::Tool,
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn eintraege_in_sequenzreihenfolge() {
    let (db, session_id) = db_mit_session().await;

    TranscriptRepository::append(&db, eintrag(session_id, 0, "AI Officer", "Good day.")).await.unwrap();
    TranscriptRepository::append(&db, eintrag(session_id, 1, "John Doe", "This is John Doe")).await.unwrap();
    TranscriptRepository::append(&db, eintrag(session_id, 2, "Jane Smith", "This is Jane Smith")).await.unwrap();

    let alle = TranscriptRepository::list_for_session(&db, session_id).await.unwrap();
    let sequenzen: Vec<i64> = alle.iter().map(|e| e.sequence).collect();
    assert_eq!(sequenzen, vec![0, 1, 2]);
    assert_eq!(alle[0].speaker, "AI Officer");

    let letzter = TranscriptRepository::last_for_session(&db, session_id).await.unwrap().unwrap();
    assert_eq!(letzter.sequence, 2);
    assert_eq!(letzter.text, "This is Jane Smith");
    assert_eq!(TranscriptRepository::count_for_session(&db, session_id).await.unwrap(), 3);
}

#[tokio::test]
async fn doppelte_sequenz_abgelehnt() {
    let (db, session_id) = db_mit_session().await;

    TranscriptRepository::append(&db, eintrag(session_id, 0, "AI Officer", "Good day.")).await.unwrap();
    let err = TranscriptRepository::append(&db, eintrag(session_id, 0, "AI Officer", "Nochmal")).await;
    assert!(err.unwrap_err().ist_eindeutigkeit());

    let gespeichert = TranscriptRepository::get_by_sequence(&db, session_id, 0).await.unwrap().unwrap();
    assert_eq!(gespeichert.text, "Good day.");
}

#[tokio::test]
async fn leere_felder_werden_nicht_gespeichert() {
    let (db, session_id) = db_mit_session().await;

    let ohne_sprecher = TranscriptRepository::append(&db, eintrag(session_id, 0, "", "text")).await;
    assert!(matches!(ohne_sprecher, Err(DbError::UngueltigeDaten(_))));

    let ohne_text = TranscriptRepository::append(&db, eintrag(session_id, 0, "Speaker", "  ")).await;
    assert!(matches!(ohne_text, Err(DbError::UngueltigeDaten(_))));

    assert!(TranscriptRepository::list_for_session(&db, session_id).await.unwrap().is_empty());
    assert_eq!(TranscriptRepository::count_for_session(&db, session_id).await.unwrap(), 0);
}

#[tokio::test]
async fn unbekannte_session_verletzt_fremdschluessel() {
    let (db, _) = db_mit_session().await;
    let err = TranscriptRepository::append(&db, eintrag(Uuid::new_v4(), 0, "AI Officer", "Hallo")).await;
    assert!(err.is_err());
}

#[tokio::test]
async fn quelle_bleibt_erhalten() {
    let (db, session_id) = db_mit_session().await;
    let mut e = eintrag(session_id, 0, "Unknown Speaker", "mumble");
    e.source = EintragsQuelle::Fallback;
    TranscriptRepository::append(&db, e).await.unwrap();

    let geladen = TranscriptRepository::get_by_sequence(&db, session_id, 0).await.unwrap().unwrap();
    assert_eq!(geladen.source, EintragsQuelle::Fallback);
}
