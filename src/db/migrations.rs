use super::schema::SCHEMA;
use crate::constants::{DEFAULT_END_TIME, DEFAULT_START_TIME, KEY_BLOCKED_COUNT};
use crate::models::{Scope, Weekday};
use rusqlite::{params, Connection, Result};

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    seed_default_business_hours(conn)?;
    seed_local_state(conn)?;
    Ok(())
}

/// Every day present but disabled, 09:00-17:00.
fn seed_default_business_hours(conn: &Connection) -> Result<()> {
    let count: i32 = conn.query_row("SELECT COUNT(*) FROM business_hours", [], |row| row.get(0))?;

    if count == 0 {
        for day in Weekday::ALL {
            conn.execute(
                "INSERT INTO business_hours (day, enabled, start_time, end_time) VALUES (?1, 0, ?2, ?3)",
                params![day.name(), DEFAULT_START_TIME, DEFAULT_END_TIME],
            )?;
        }
    }
    Ok(())
}

fn seed_local_state(conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO kv_store (scope, key, value) VALUES (?1, ?2, '0')",
        params![Scope::Local.as_str(), KEY_BLOCKED_COUNT],
    )?;
    Ok(())
}
