use surveyforge_core::db::migrations::latest_version;
use surveyforge_core::db::open_store_in_memory;

fn setup() -> rusqlite::Connection {
    open_store_in_memory().unwrap()
}

fn table_columns(conn: &rusqlite::Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .unwrap();
    let mut rows = stmt.query([]).unwrap();
    let mut columns = Vec::new();
    while let Some(row) = rows.next().unwrap() {
        let column_name: String = row.get(1).unwrap();
        columns.push(column_name);
    }
    columns
}

fn table_exists(conn: &rusqlite::Connection, table: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}

#[test]
fn fresh_store_lands_on_latest_schema_version() {
    let conn = setup();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn migration_1_creates_surveys_table() {
    let conn = setup();
    assert!(table_exists(&conn, "surveys"));

    let columns = table_columns(&conn, "surveys");
    assert!(columns.contains(&"survey_uuid".to_string()));
    assert!(columns.contains(&"body".to_string()));
    assert!(columns.contains(&"created_at".to_string()));
    assert!(columns.contains(&"updated_at".to_string()));
}

#[test]
fn migration_2_creates_settings_table() {
    let conn = setup();
    assert!(table_exists(&conn, "settings"));

    let columns = table_columns(&conn, "settings");
    assert!(columns.contains(&"key".to_string()));
    assert!(columns.contains(&"body".to_string()));
    assert!(columns.contains(&"updated_at".to_string()));
}

#[test]
fn migration_3_creates_question_bank_table() {
    let conn = setup();
    assert!(table_exists(&conn, "question_bank"));

    let columns = table_columns(&conn, "question_bank");
    assert!(columns.contains(&"item_uuid".to_string()));
    assert!(columns.contains(&"question".to_string()));
    assert!(columns.contains(&"question_type".to_string()));
    assert!(columns.contains(&"created_at".to_string()));
    assert!(columns.contains(&"updated_at".to_string()));
}

#[test]
fn bootstrap_is_idempotent_for_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");

    {
        let conn = surveyforge_core::db::open_store(&path).unwrap();
        conn.execute(
            "INSERT INTO settings (key, body) VALUES ('probe', '{}');",
            [],
        )
        .unwrap();
    }

    let conn = surveyforge_core::db::open_store(&path).unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());

    let probe: String = conn
        .query_row(
            "SELECT body FROM settings WHERE key = 'probe';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(probe, "{}");
}

#[test]
fn stores_from_newer_builds_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");

    {
        let conn = surveyforge_core::db::open_store(&path).unwrap();
        conn.pragma_update(None, "user_version", latest_version() + 1)
            .unwrap();
    }

    let err = surveyforge_core::db::open_store(&path).unwrap_err();
    assert!(matches!(
        err,
        surveyforge_core::db::DbError::UnsupportedSchemaVersion { db_version, latest_supported }
            if db_version == latest_version() + 1 && latest_supported == latest_version()
    ));
}
