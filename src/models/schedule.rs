use super::Weekday;
use crate::error::AppError;
use crate::validation::{validate_time_format, validate_weekday};
use log::warn;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Blocking window for a single weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub enabled: bool,
    /// Start time in HH:MM format (24-hour).
    pub start: String,
    /// End time in HH:MM format (24-hour), inclusive.
    pub end: String,
}

impl ScheduleEntry {
    pub fn new(enabled: bool, start: &str, end: &str) -> Self {
        Self {
            enabled,
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        validate_time_format(&self.start)?;
        validate_time_format(&self.end)?;
        Ok(())
    }
}

/// Business hours: at most one entry per weekday. A missing day is disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    entries: BTreeMap<Weekday, ScheduleEntry>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, day: Weekday) -> Option<&ScheduleEntry> {
        self.entries.get(&day)
    }

    pub fn set(&mut self, day: Weekday, entry: ScheduleEntry) {
        self.entries.insert(day, entry);
    }

    pub fn with(mut self, day: Weekday, entry: ScheduleEntry) -> Self {
        self.set(day, entry);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &ScheduleEntry)> {
        self.entries.iter().map(|(day, entry)| (*day, entry))
    }

    /// Build a schedule from weekday-name keys, rejecting unknown days and bad times.
    pub fn from_named(named: BTreeMap<String, ScheduleEntry>) -> Result<Self, AppError> {
        let mut schedule = Self::new();
        for (name, entry) in named {
            let day = validate_weekday(&name)?;
            entry.validate()?;
            schedule.set(day, entry);
        }
        Ok(schedule)
    }

    pub fn to_named(&self) -> BTreeMap<String, ScheduleEntry> {
        self.entries
            .iter()
            .map(|(day, entry)| (day.name().to_string(), entry.clone()))
            .collect()
    }

    /// Load the stored schedule. Rows with an unknown day name are skipped.
    pub fn load(conn: &Connection) -> rusqlite::Result<Self> {
        let mut stmt = conn.prepare("SELECT day, enabled, start_time, end_time FROM business_hours")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                ScheduleEntry {
                    enabled: row.get::<_, i32>(1)? != 0,
                    start: row.get(2)?,
                    end: row.get(3)?,
                },
            ))
        })?;

        let mut schedule = Self::new();
        for row in rows {
            let (name, entry) = row?;
            match Weekday::from_name(&name) {
                Some(day) => schedule.set(day, entry),
                None => warn!("Ignoring business hours for unknown day '{name}'"),
            }
        }
        Ok(schedule)
    }

    /// Replace the stored schedule with this one.
    pub fn save(&self, conn: &Connection) -> rusqlite::Result<()> {
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM business_hours", [])?;
        for (day, entry) in self.iter() {
            save_day_inner(&tx, day, entry)?;
        }
        tx.commit()
    }

    /// Insert or update a single day.
    pub fn save_day(conn: &Connection, day: Weekday, entry: &ScheduleEntry) -> rusqlite::Result<()> {
        save_day_inner(conn, day, entry)
    }
}

fn save_day_inner(conn: &Connection, day: Weekday, entry: &ScheduleEntry) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO business_hours (day, enabled, start_time, end_time) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(day) DO UPDATE SET
             enabled = excluded.enabled,
             start_time = excluded.start_time,
             end_time = excluded.end_time",
        params![day.name(), i32::from(entry.enabled), entry.start, entry.end],
    )?;
    Ok(())
}
