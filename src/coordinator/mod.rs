//! Background coordinator: the single owner of storage writes.
//!
//! Every write (status recheck, block reports, counter resets, popup edits)
//! runs on the coordinator thread in arrival order, so concurrent reporters
//! cannot lose counter updates.

pub mod alarms;

pub use alarms::{Alarm, AlarmThread};

use crate::changes::{ChangeHub, StorageChange};
use crate::clock::Clock;
use crate::constants::{
    KEY_BLOCKED_COUNT, KEY_BLOCKED_VIDEOS, KEY_BUSINESS_HOURS, KEY_EMAIL, KEY_IS_BLOCKING, KEY_LAST_RESET_DATE,
};
use crate::db::{lock_db, Database};
use crate::error::AppError;
use crate::models::{kv, BlockEvent, Schedule, ScheduleEntry, Scope, Weekday};
use crate::validation::{normalize_title, validate_date, validate_email};
use crate::window::is_within_window;
use log::{debug, error, info};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// User-visible notification raised by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

/// A video the page gate just covered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockReport {
    pub title: String,
    pub url: String,
    pub thumbnail: String,
}

type Reply<T> = Sender<Result<T, AppError>>;

#[derive(Debug)]
pub enum Command {
    CheckStatus(Reply<bool>),
    VideoBlocked(BlockReport, Reply<i64>),
    SetBusinessHours(Schedule, Reply<()>),
    UpdateDay(Weekday, ScheduleEntry, Reply<()>),
    ClearHistory(String, Reply<usize>),
    SetEmail(String, Reply<()>),
    UpdateSettings(Value, Reply<()>),
    Alarm(Alarm),
    Shutdown,
}

pub struct Coordinator {
    db: Arc<Mutex<Database>>,
    clock: Arc<dyn Clock>,
    changes: Arc<ChangeHub>,
    notifications: Sender<Notification>,
}

impl Coordinator {
    pub fn new(
        db: Arc<Mutex<Database>>,
        clock: Arc<dyn Clock>,
        changes: Arc<ChangeHub>,
        notifications: Sender<Notification>,
    ) -> Self {
        Self {
            db,
            clock,
            changes,
            notifications,
        }
    }

    /// Recompute `isBlocking` from the stored schedule and the current time.
    ///
    /// The flag is written on every call; a change notification goes out only
    /// when the value differs from what was stored.
    pub fn check_blocking_status(&self) -> Result<bool, AppError> {
        let now = self.clock.now().naive_local();

        let (blocking, previous) = {
            let db = lock_db(&self.db, "check blocking status");
            let conn = db.connection();
            let schedule = Schedule::load(conn)?;
            let blocking = is_within_window(&schedule, now);
            let previous: Option<bool> = read_or_log(conn, Scope::Local, KEY_IS_BLOCKING);
            kv::set(conn, Scope::Local, KEY_IS_BLOCKING, &blocking)?;
            (blocking, previous)
        };

        if previous != Some(blocking) {
            info!("Blocking is now {}", if blocking { "active" } else { "inactive" });
            self.publish(Scope::Local, KEY_IS_BLOCKING, json!(blocking));
        }
        Ok(blocking)
    }

    /// Count a blocked video, file it under today's history and notify.
    /// Returns the new blocked count.
    pub fn record_block(&self, report: &BlockReport) -> Result<i64, AppError> {
        let title = normalize_title(&report.title);
        let mut event = BlockEvent::new(&title, &report.url, &report.thumbnail, self.clock.now());

        let count = {
            let db = lock_db(&self.db, "record blocked video");
            let conn = db.connection();
            let tx = conn.unchecked_transaction()?;
            let count = kv::increment(&tx, Scope::Local, KEY_BLOCKED_COUNT)?;
            event.save(&tx)?;
            tx.commit()?;
            count
        };

        info!("Blocked video #{count} today: {title}");
        self.publish(Scope::Local, KEY_BLOCKED_COUNT, json!(count));
        self.publish(Scope::Local, KEY_BLOCKED_VIDEOS, json!(event.date));
        self.notify(Notification {
            title: "Video Blocked".to_string(),
            message: format!("\"{title}\" was blocked during work hours."),
        });
        Ok(count)
    }

    /// Zero the blocked count, at most once per local date.
    /// Returns whether a reset happened.
    pub fn reset_blocked_count(&self) -> Result<bool, AppError> {
        let today = self.clock.now().date_naive().format("%Y-%m-%d").to_string();

        {
            let db = lock_db(&self.db, "reset blocked count");
            let conn = db.connection();
            let last: Option<String> = read_or_log(conn, Scope::Local, KEY_LAST_RESET_DATE);
            if last.as_deref() == Some(today.as_str()) {
                debug!("Blocked count already reset for {today}");
                return Ok(false);
            }
            let tx = conn.unchecked_transaction()?;
            kv::set(&tx, Scope::Local, KEY_BLOCKED_COUNT, &0)?;
            kv::set(&tx, Scope::Local, KEY_LAST_RESET_DATE, &today)?;
            tx.commit()?;
        }

        info!("Reset blocked count for {today}");
        self.publish(Scope::Local, KEY_BLOCKED_COUNT, json!(0));
        Ok(true)
    }

    /// Notify with today's total if anything was blocked. Only runs once the
    /// user has stored an email; returns `None` otherwise, else the total.
    pub fn send_daily_report(&self) -> Result<Option<i64>, AppError> {
        let today = self.clock.now().date_naive().format("%Y-%m-%d").to_string();
        let total = {
            let db = lock_db(&self.db, "build daily report");
            let conn = db.connection();
            let email: Option<String> = kv::get(conn, Scope::Sync, KEY_EMAIL)?;
            if email.as_deref().unwrap_or_default().is_empty() {
                debug!("No email set, skipping daily report");
                return Ok(None);
            }
            BlockEvent::count_by_date(conn, &today)?
        };

        if total > 0 {
            self.notify(Notification {
                title: "YouTube Productivity Report".to_string(),
                message: format!("{total} videos were blocked today. Check your extension popup to view the list."),
            });
        }
        Ok(Some(total))
    }

    pub fn set_business_hours(&self, schedule: &Schedule) -> Result<(), AppError> {
        {
            let db = lock_db(&self.db, "save business hours");
            schedule.save(db.connection())?;
        }
        info!("Business hours replaced");
        self.publish(Scope::Sync, KEY_BUSINESS_HOURS, serde_json::to_value(schedule.to_named())?);
        Ok(())
    }

    pub fn update_day(&self, day: Weekday, entry: &ScheduleEntry) -> Result<(), AppError> {
        entry.validate()?;
        let schedule = {
            let db = lock_db(&self.db, "update business hours");
            let conn = db.connection();
            Schedule::save_day(conn, day, entry)?;
            Schedule::load(conn)?
        };
        info!("Business hours for {day} updated: enabled={} {}-{}", entry.enabled, entry.start, entry.end);
        self.publish(Scope::Sync, KEY_BUSINESS_HOURS, serde_json::to_value(schedule.to_named())?);
        Ok(())
    }

    /// Delete one date's history bucket. Returns the number of events removed.
    pub fn clear_history(&self, date: &str) -> Result<usize, AppError> {
        validate_date(date)?;
        let removed = {
            let db = lock_db(&self.db, "clear history");
            BlockEvent::delete_by_date(db.connection(), date)?
        };
        info!("Cleared {removed} blocked videos for {date}");
        self.publish(Scope::Local, KEY_BLOCKED_VIDEOS, json!(date));
        Ok(removed)
    }

    pub fn set_email(&self, email: &str) -> Result<(), AppError> {
        let email = validate_email(email)?;
        {
            let db = lock_db(&self.db, "save email");
            kv::set(db.connection(), Scope::Sync, KEY_EMAIL, email)?;
        }
        self.publish(Scope::Sync, KEY_EMAIL, json!(email));
        Ok(())
    }

    /// Settings pushed by the popup. Only `email` is persisted.
    pub fn update_settings(&self, data: &Value) -> Result<(), AppError> {
        info!("Settings updated: {data}");
        match data.get(KEY_EMAIL).and_then(Value::as_str) {
            Some(email) => self.set_email(email),
            None => Ok(()),
        }
    }

    fn run_alarm(&self, alarm: Alarm) {
        let result = match alarm {
            Alarm::CheckBlockingStatus => self.check_blocking_status().map(|_| ()),
            Alarm::ResetBlockedCount => self.reset_blocked_count().map(|_| ()),
            Alarm::DailyReport => self.send_daily_report().map(|_| ()),
        };
        if let Err(e) = result {
            error!("Alarm {} failed: {e}", alarm.name());
        }
    }

    /// Handle one command. Returns false on shutdown.
    fn handle(&self, command: Command) -> bool {
        match command {
            Command::CheckStatus(reply) => respond(&reply, self.check_blocking_status()),
            Command::VideoBlocked(report, reply) => respond(&reply, self.record_block(&report)),
            Command::SetBusinessHours(schedule, reply) => respond(&reply, self.set_business_hours(&schedule)),
            Command::UpdateDay(day, entry, reply) => respond(&reply, self.update_day(day, &entry)),
            Command::ClearHistory(date, reply) => respond(&reply, self.clear_history(&date)),
            Command::SetEmail(email, reply) => respond(&reply, self.set_email(&email)),
            Command::UpdateSettings(data, reply) => respond(&reply, self.update_settings(&data)),
            Command::Alarm(alarm) => self.run_alarm(alarm),
            Command::Shutdown => return false,
        }
        true
    }

    /// Move the coordinator onto its own thread.
    pub fn spawn(self) -> (CoordinatorHandle, JoinHandle<()>) {
        let (tx, rx) = channel();
        let handle = thread::spawn(move || {
            info!("Coordinator started");
            for command in rx {
                if !self.handle(command) {
                    break;
                }
            }
            info!("Coordinator stopped");
        });
        (CoordinatorHandle { tx }, handle)
    }

    fn publish(&self, scope: Scope, key: &'static str, new_value: Value) {
        self.changes.publish(&StorageChange { scope, key, new_value });
    }

    fn notify(&self, notification: Notification) {
        if self.notifications.send(notification).is_err() {
            debug!("No notification listener, dropping notification");
        }
    }
}

fn read_or_log<T: DeserializeOwned>(conn: &Connection, scope: Scope, key: &str) -> Option<T> {
    kv::get(conn, scope, key).unwrap_or_else(|e| {
        error!("Failed to read {key}: {e}");
        None
    })
}

fn respond<T>(reply: &Reply<T>, result: Result<T, AppError>) {
    if let Err(e) = &result {
        error!("Coordinator request failed: {e}");
    }
    // The requester may have given up waiting
    let _ = reply.send(result);
}

/// Cheap, cloneable sender side of the coordinator.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: Sender<Command>,
}

impl CoordinatorHandle {
    #[cfg(test)]
    pub(crate) fn from_sender(tx: Sender<Command>) -> Self {
        Self { tx }
    }

    fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, AppError> {
        let (reply, response) = channel();
        self.tx.send(make(reply)).map_err(|_| AppError::CoordinatorGone)?;
        response.recv().map_err(|_| AppError::CoordinatorGone)?
    }

    /// Recompute and return `isBlocking`.
    pub fn check_status(&self) -> Result<bool, AppError> {
        self.request(Command::CheckStatus)
    }

    pub fn video_blocked(&self, report: BlockReport) -> Result<i64, AppError> {
        self.request(|reply| Command::VideoBlocked(report, reply))
    }

    pub fn set_business_hours(&self, schedule: Schedule) -> Result<(), AppError> {
        self.request(|reply| Command::SetBusinessHours(schedule, reply))
    }

    pub fn update_day(&self, day: Weekday, entry: ScheduleEntry) -> Result<(), AppError> {
        self.request(|reply| Command::UpdateDay(day, entry, reply))
    }

    pub fn clear_history(&self, date: &str) -> Result<usize, AppError> {
        let date = date.to_string();
        self.request(|reply| Command::ClearHistory(date, reply))
    }

    pub fn set_email(&self, email: &str) -> Result<(), AppError> {
        let email = email.to_string();
        self.request(|reply| Command::SetEmail(email, reply))
    }

    pub fn update_settings(&self, data: Value) -> Result<(), AppError> {
        self.request(|reply| Command::UpdateSettings(data, reply))
    }

    /// Fire an alarm without waiting. Returns false if the coordinator is gone.
    pub fn fire(&self, alarm: Alarm) -> bool {
        self.tx.send(Command::Alarm(alarm)).is_ok()
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }
}
