use jotpad_core::db::migrations::latest_version;
use jotpad_core::db::{open_db, open_db_in_memory, DbError};
use jotpad_core::{ManualClock, NotePatch, NoteStore, SlotError, SlotStore, SqliteSlotStore, StoreConfig};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "slots");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jotpad.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "slots");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn sqlite_slot_store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteSlotStore::try_new(&conn).err().unwrap();
    assert!(matches!(err, SlotError::MissingRequiredTable("slots")));
}

#[test]
fn sqlite_slot_write_overwrites_and_clear_removes() {
    let conn = open_db_in_memory().unwrap();
    let mut slot = SqliteSlotStore::try_new(&conn).unwrap();

    assert_eq!(slot.read("notes").unwrap(), None);
    slot.write("notes", "[]").unwrap();
    slot.write("notes", r#"{"version":1,"notes":[]}"#).unwrap();
    assert_eq!(
        slot.read("notes").unwrap().as_deref(),
        Some(r#"{"version":1,"notes":[]}"#)
    );

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM slots;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);

    slot.clear("notes").unwrap();
    slot.clear("notes").unwrap();
    assert_eq!(slot.read("notes").unwrap(), None);
}

#[test]
fn sqlite_slot_rejects_blank_key() {
    let conn = open_db_in_memory().unwrap();
    let mut slot = SqliteSlotStore::try_new(&conn).unwrap();
    assert!(matches!(slot.write("", "x"), Err(SlotError::InvalidKey(_))));
    assert!(matches!(slot.read(" "), Err(SlotError::InvalidKey(_))));
}

#[test]
fn notes_survive_reopening_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");
    let clock = ManualClock::starting_at(1_700_000_000_000);

    let id = {
        let conn = open_db(&path).unwrap();
        let slot = SqliteSlotStore::try_new(&conn).unwrap();
        let mut store = NoteStore::open_with(slot, clock.clone(), StoreConfig::default());
        let id = store.create().unwrap();
        clock.advance(60_000);
        store
            .update(&id, &NotePatch::new("Persisted", "across restarts"))
            .unwrap();
        id
    };

    let conn = open_db(&path).unwrap();
    let slot = SqliteSlotStore::try_new(&conn).unwrap();
    let store = NoteStore::open(slot);
    let note = store.get(&id).unwrap();
    assert_eq!(note.title, "Persisted");
    assert_eq!(note.content, "across restarts");
    assert_eq!(note.last_edited, 1_700_000_060_000);
}

#[test]
fn corrupt_slot_row_loads_as_empty_store() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO slots (key, value) VALUES ('notes', '{\"version\":1,\"notes\":');",
        [],
    )
    .unwrap();

    let slot = SqliteSlotStore::try_new(&conn).unwrap();
    let store = NoteStore::open(slot);
    assert!(store.is_empty());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

#[test]
fn opening_database_in_missing_directory_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("notes.db");

    let err = open_db(&path).unwrap_err();
    assert_eq!(err.error_code(), "db_open_failed");
    match &err {
        DbError::Open { target, .. } => assert!(target.ends_with("notes.db"), "{target}"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("missing"));
}
