//! Scalar settings and derived values, stored as JSON text per (scope, key).

use crate::error::AppError;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Storage scope. `Sync` holds user settings, `Local` holds derived and log data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Sync,
    Local,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Sync => "sync",
            Scope::Local => "local",
        }
    }
}

pub fn get<T: DeserializeOwned>(conn: &Connection, scope: Scope, key: &str) -> Result<Option<T>, AppError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM kv_store WHERE scope = ?1 AND key = ?2",
            params![scope.as_str(), key],
            |row| row.get(0),
        )
        .optional()?;

    match raw {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn set<T: Serialize + ?Sized>(conn: &Connection, scope: Scope, key: &str, value: &T) -> Result<(), AppError> {
    let raw = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO kv_store (scope, key, value) VALUES (?1, ?2, ?3)
         ON CONFLICT(scope, key) DO UPDATE SET value = excluded.value",
        params![scope.as_str(), key, raw],
    )?;
    Ok(())
}

/// Increment an integer value in a single statement and return the new value.
///
/// A missing or non-numeric value counts as 0.
pub fn increment(conn: &Connection, scope: Scope, key: &str) -> Result<i64, AppError> {
    let raw: String = conn.query_row(
        "INSERT INTO kv_store (scope, key, value) VALUES (?1, ?2, '1')
         ON CONFLICT(scope, key) DO UPDATE SET value = CAST(CAST(value AS INTEGER) + 1 AS TEXT)
         RETURNING value",
        params![scope.as_str(), key],
        |row| row.get(0),
    )?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_get_missing_returns_none() {
        let (db, _dir) = setup_test_db();
        let value: Option<bool> = get(db.connection(), Scope::Local, "isBlocking").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_set_then_get() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        set(conn, Scope::Sync, "email", "me@example.com").unwrap();
        let email: Option<String> = get(conn, Scope::Sync, "email").unwrap();
        assert_eq!(email.as_deref(), Some("me@example.com"));

        set(conn, Scope::Sync, "email", "other@example.com").unwrap();
        let email: Option<String> = get(conn, Scope::Sync, "email").unwrap();
        assert_eq!(email.as_deref(), Some("other@example.com"));
    }

    #[test]
    fn test_scopes_are_separate() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        set(conn, Scope::Sync, "flag", &true).unwrap();
        let local: Option<bool> = get(conn, Scope::Local, "flag").unwrap();
        assert!(local.is_none());
    }

    #[test]
    fn test_increment() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        assert_eq!(increment(conn, Scope::Local, "counter").unwrap(), 1);
        assert_eq!(increment(conn, Scope::Local, "counter").unwrap(), 2);

        set(conn, Scope::Local, "counter", &10).unwrap();
        assert_eq!(increment(conn, Scope::Local, "counter").unwrap(), 11);
        let stored: Option<i64> = get(conn, Scope::Local, "counter").unwrap();
        assert_eq!(stored, Some(11));
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        conn.execute(
            "INSERT INTO kv_store (scope, key, value) VALUES ('local', 'isBlocking', 'nope')",
            [],
        )
        .unwrap();
        let result: Result<Option<bool>, AppError> = get(conn, Scope::Local, "isBlocking");
        assert!(matches!(result, Err(AppError::Serialization(_))));
    }
}
