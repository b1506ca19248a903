use chrono::{DateTime, Local, SecondsFormat};
use rusqlite::{params, Connection, Result, Row};
use serde::Serialize;
use std::collections::BTreeMap;

/// A video blocked during business hours, filed under the local date it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockEvent {
    #[serde(skip)]
    pub id: Option<i64>,
    /// History bucket key, YYYY-MM-DD.
    #[serde(skip)]
    pub date: String,
    pub title: String,
    pub url: String,
    pub thumbnail: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

impl BlockEvent {
    /// Create a new event (not yet saved to database).
    pub fn new(title: &str, url: &str, thumbnail: &str, at: DateTime<Local>) -> Self {
        Self {
            id: None,
            date: at.format("%Y-%m-%d").to_string(),
            title: title.to_string(),
            url: url.to_string(),
            thumbnail: thumbnail.to_string(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, false),
        }
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            date: row.get(1)?,
            title: row.get(2)?,
            url: row.get(3)?,
            thumbnail: row.get(4)?,
            timestamp: row.get(5)?,
        })
    }

    /// Append the event to its day's bucket.
    pub fn save(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO blocked_videos (date, title, url, thumbnail, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![self.date, self.title, self.url, self.thumbnail, self.timestamp],
        )?;
        self.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    /// Events for one date, in the order they were recorded.
    pub fn find_by_date(conn: &Connection, date: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, date, title, url, thumbnail, timestamp
             FROM blocked_videos WHERE date = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![date], Self::from_row)?;
        rows.collect()
    }

    pub fn count_by_date(conn: &Connection, date: &str) -> Result<i64> {
        conn.query_row(
            "SELECT COUNT(*) FROM blocked_videos WHERE date = ?1",
            params![date],
            |row| row.get(0),
        )
    }

    /// Dates that have at least one event, newest first.
    pub fn dates(conn: &Connection) -> Result<Vec<String>> {
        let mut stmt = conn.prepare("SELECT DISTINCT date FROM blocked_videos ORDER BY date DESC")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect()
    }

    /// The full history, keyed by date.
    pub fn history(conn: &Connection) -> Result<BTreeMap<String, Vec<Self>>> {
        let mut stmt = conn.prepare(
            "SELECT id, date, title, url, thumbnail, timestamp
             FROM blocked_videos ORDER BY id",
        )?;

        let mut history: BTreeMap<String, Vec<Self>> = BTreeMap::new();
        for event in stmt.query_map([], Self::from_row)? {
            let event = event?;
            history.entry(event.date.clone()).or_default().push(event);
        }
        Ok(history)
    }

    /// Delete a whole day's bucket. Returns the number of events removed.
    pub fn delete_by_date(conn: &Connection, date: &str) -> Result<usize> {
        conn.execute("DELETE FROM blocked_videos WHERE date = ?1", params![date])
    }
}
