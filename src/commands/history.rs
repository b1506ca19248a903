use crate::coordinator::CoordinatorHandle;
use crate::db::{with_connection, Database};
use crate::error::AppError;
use crate::models::BlockEvent;
use crate::validation::validate_date;
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::{ExportResponse, HistoryResponse};

const CSV_HEADER: &str = "Title,URL,Timestamp";

pub fn get_history(db: &Arc<Mutex<Database>>, date: &str) -> Result<HistoryResponse, AppError> {
    validate_date(date)?;
    let videos = with_connection(db, "load history", |conn| Ok(BlockEvent::find_by_date(conn, date)?))?;
    Ok(HistoryResponse {
        date: date.to_string(),
        videos,
    })
}

pub fn get_history_dates(db: &Arc<Mutex<Database>>) -> Result<Vec<String>, AppError> {
    with_connection(db, "load history dates", |conn| Ok(BlockEvent::dates(conn)?))
}

pub fn get_all_history(db: &Arc<Mutex<Database>>) -> Result<BTreeMap<String, Vec<BlockEvent>>, AppError> {
    with_connection(db, "load all history", |conn| Ok(BlockEvent::history(conn)?))
}

pub fn export_history(db: &Arc<Mutex<Database>>, date: &str) -> Result<ExportResponse, AppError> {
    let history = get_history(db, date)?;
    Ok(ExportResponse {
        filename: format!("blocked-videos-{date}.csv"),
        content: to_csv(&history.videos),
    })
}

/// Irreversibly delete one date's bucket. Returns the number of events removed.
pub fn clear_history(coordinator: &CoordinatorHandle, date: &str) -> Result<usize, AppError> {
    validate_date(date)?;
    coordinator.clear_history(date)
}

/// `Title,URL,Timestamp` rows, timestamps as local `HH:MM:SS`.
pub fn to_csv(events: &[BlockEvent]) -> String {
    let mut lines = vec![CSV_HEADER.to_string()];
    lines.extend(events.iter().map(|event| {
        [
            csv_field(&event.title),
            csv_field(&event.url),
            csv_field(&time_of_day(&event.timestamp)),
        ]
        .join(",")
    }));
    lines.join("\n")
}

fn time_of_day(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|at| at.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
