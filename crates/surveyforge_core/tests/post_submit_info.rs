use surveyforge_core::db::open_store_in_memory;
use surveyforge_core::{
    PostSubmitDraft, PostSubmitService, SqlitePostSubmitRepository, POST_SUBMIT_STORAGE_KEY,
};

fn setup() -> rusqlite::Connection {
    open_store_in_memory().unwrap()
}

fn draft(title: &str, survey_ids: &[&str]) -> PostSubmitDraft {
    PostSubmitDraft {
        title: title.to_string(),
        description: "Shown after submitting".to_string(),
        selected_survey_ids: survey_ids.iter().map(|id| id.to_string()).collect(),
        is_active: true,
    }
}

fn insert_raw_payload(conn: &rusqlite::Connection, body: &str) {
    conn.execute(
        "INSERT INTO settings (key, body) VALUES (?1, ?2);",
        rusqlite::params![POST_SUBMIT_STORAGE_KEY, body],
    )
    .unwrap();
}

fn stored_body(conn: &rusqlite::Connection) -> String {
    conn.query_row(
        "SELECT body FROM settings WHERE key = ?1;",
        [POST_SUBMIT_STORAGE_KEY],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn load_before_any_save_is_none() {
    let conn = setup();
    let service = PostSubmitService::new(SqlitePostSubmitRepository::try_new(&conn).unwrap());
    assert!(service.load_info().unwrap().is_none());
}

#[test]
fn save_and_load_round_trip() {
    let conn = setup();
    let service = PostSubmitService::new(SqlitePostSubmitRepository::try_new(&conn).unwrap());

    let saved = service
        .save_info(draft("Thank you", &["survey-1", "survey-2"]))
        .unwrap();
    assert_eq!(saved.id, "1");
    assert_eq!(saved.created_at, saved.updated_at);

    let loaded = service.load_info().unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.selected_survey_ids, vec!["survey-1", "survey-2"]);
    assert!(loaded.is_active);
}

#[test]
fn resave_keeps_created_at_and_replaces_content() {
    let conn = setup();
    let service = PostSubmitService::new(SqlitePostSubmitRepository::try_new(&conn).unwrap());

    let first = service.save_info(draft("First", &["a"])).unwrap();
    let second = service.save_info(draft("Second", &["b", "c"])).unwrap();

    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at >= first.updated_at);

    let loaded = service.load_info().unwrap().unwrap();
    assert_eq!(loaded.title, "Second");
    assert_eq!(loaded.selected_survey_ids, vec!["b", "c"]);

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM settings;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn legacy_single_survey_payload_is_upgraded_on_load() {
    let conn = setup();
    insert_raw_payload(
        &conn,
        r#"{
            "id": "1",
            "title": "Thanks",
            "description": "Legacy panel",
            "selectedSurveyId": "survey-9",
            "isActive": true,
            "createdAt": 1700000000000,
            "updatedAt": 1700000000000
        }"#,
    );

    let service = PostSubmitService::new(SqlitePostSubmitRepository::try_new(&conn).unwrap());
    let loaded = service.load_info().unwrap().unwrap();
    assert_eq!(loaded.selected_survey_ids, vec!["survey-9"]);
    assert_eq!(loaded.title, "Thanks");
    assert_eq!(loaded.created_at, 1_700_000_000_000);
}

#[test]
fn legacy_empty_survey_id_becomes_an_empty_list() {
    let conn = setup();
    insert_raw_payload(
        &conn,
        r#"{
            "id": "1",
            "title": "Thanks",
            "description": "Legacy panel",
            "selectedSurveyId": "",
            "isActive": false,
            "createdAt": 1,
            "updatedAt": 2
        }"#,
    );

    let service = PostSubmitService::new(SqlitePostSubmitRepository::try_new(&conn).unwrap());
    let loaded = service.load_info().unwrap().unwrap();
    assert!(loaded.selected_survey_ids.is_empty());
    assert!(!loaded.is_active);
}

#[test]
fn loading_never_rewrites_the_stored_body() {
    let conn = setup();
    let legacy = r#"{"id":"1","title":"T","description":"D","selectedSurveyId":"s","isActive":true,"createdAt":1,"updatedAt":1}"#;
    insert_raw_payload(&conn, legacy);

    let service = PostSubmitService::new(SqlitePostSubmitRepository::try_new(&conn).unwrap());
    service.load_info().unwrap().unwrap();
    service.load_info().unwrap().unwrap();
    assert_eq!(stored_body(&conn), legacy);

    // The upgraded shape only lands on the next save.
    service.save_info(draft("T", &["s"])).unwrap();
    let body = stored_body(&conn);
    assert!(body.contains("selectedSurveyIds"));
    assert!(!body.contains("\"selectedSurveyId\""));
}

#[test]
fn undecodable_bodies_surface_as_invalid_body() {
    let conn = setup();
    insert_raw_payload(&conn, "not json at all");

    let service = PostSubmitService::new(SqlitePostSubmitRepository::try_new(&conn).unwrap());
    let err = service.load_info().unwrap_err();
    assert!(matches!(
        err,
        surveyforge_core::repo::post_submit_repo::PostSubmitRepoError::InvalidBody(_)
    ));
}
