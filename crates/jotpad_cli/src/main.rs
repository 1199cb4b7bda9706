//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `jotpad_core` linkage without the Flutter/FFI runtime.
//! - Exercise one in-memory note round-trip with deterministic output.

use jotpad_core::db::open_db_in_memory;
use jotpad_core::{NotePatch, NoteStore, SqliteSlotStore};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("jotpad_core ping={}", jotpad_core::ping());
    println!("jotpad_core version={}", jotpad_core::core_version());

    match store_round_trip() {
        Ok(hits) => {
            println!("jotpad_core store=ok hits={hits}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("jotpad_core store=error error={err}");
            ExitCode::FAILURE
        }
    }
}

fn store_round_trip() -> Result<usize, Box<dyn Error>> {
    let conn = open_db_in_memory()?;
    let id = {
        let mut store = NoteStore::open(SqliteSlotStore::try_new(&conn)?);
        let id = store.create()?;
        store.update(&id, &NotePatch::new("Smoke", "probe"))?;
        id
    };

    let reopened = NoteStore::open(SqliteSlotStore::try_new(&conn)?);
    let hits = reopened.query("smoke");
    if hits.first().map(|note| note.id.as_str()) != Some(id.as_str()) {
        return Err("note did not survive reload".into());
    }
    Ok(hits.len())
}
