pub mod helpers;
pub mod migrations;
pub mod schema;
pub use helpers::{lock_db, with_connection};

use rusqlite::{Connection, Result};
use std::path::Path;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_database_opens() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let _db = Database::open(&db_path).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn test_all_tables_created() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        migrations::run(db.connection()).unwrap();

        let expected_tables = ["business_hours", "blocked_videos", "kv_store"];
        for table in &expected_tables {
            let count: i32 = db
                .connection()
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {table} should exist");
        }
    }

    #[test]
    fn test_default_business_hours_seeded() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        migrations::run(db.connection()).unwrap();

        let count: i32 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM business_hours", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 7, "Should seed one row per weekday");

        let enabled: i32 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM business_hours WHERE enabled = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 0, "Seeded days start disabled");

        let monday: (String, String) = db
            .connection()
            .query_row(
                "SELECT start_time, end_time FROM business_hours WHERE day = 'Monday'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(monday, ("09:00".to_string(), "17:00".to_string()));
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();

        migrations::run(db.connection()).unwrap();
        db.connection()
            .execute("UPDATE business_hours SET enabled = 1 WHERE day = 'Friday'", [])
            .unwrap();
        db.connection()
            .execute("UPDATE kv_store SET value = '4' WHERE key = 'blockedCount'", [])
            .unwrap();
        migrations::run(db.connection()).unwrap();

        let count: i32 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM business_hours", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 7, "Running migrations twice should not duplicate days");

        let friday_enabled: i32 = db
            .connection()
            .query_row("SELECT enabled FROM business_hours WHERE day = 'Friday'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(friday_enabled, 1, "Re-running migrations must not reset user edits");

        let blocked_count: String = db
            .connection()
            .query_row("SELECT value FROM kv_store WHERE key = 'blockedCount'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(blocked_count, "4");
    }
}
