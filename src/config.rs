use crate::constants::{DAILY_REPORT_TIME, RECHECK_INTERVAL_SECS, SECS_PER_DAY};
use crate::error::InitError;
use chrono::NaiveTime;
use directories::ProjectDirs;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

/// Overrides the database location.
pub const ENV_DB_PATH: &str = "TUBEGATE_DB";
/// Overrides the recheck period, in seconds.
pub const ENV_RECHECK_SECS: &str = "TUBEGATE_RECHECK_SECS";
/// Overrides the daily report time, HH:MM.
pub const ENV_REPORT_TIME: &str = "TUBEGATE_REPORT_TIME";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub recheck_interval: Duration,
    /// Local time at which the blocked count resets.
    pub reset_at: NaiveTime,
    /// Local time at which the daily report fires.
    pub report_at: NaiveTime,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            recheck_interval: Duration::from_secs(RECHECK_INTERVAL_SECS),
            reset_at: NaiveTime::MIN,
            report_at: parse_time(DAILY_REPORT_TIME).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl CoordinatorConfig {
    /// Defaults, overridden by environment variables when set.
    pub fn from_env() -> Result<Self, InitError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, InitError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_RECHECK_SECS) {
            let secs: u64 = raw
                .trim()
                .parse()
                .ok()
                .filter(|secs| (1..=SECS_PER_DAY).contains(secs))
                .ok_or_else(|| {
                    InitError::Config(format!("{ENV_RECHECK_SECS} must be between 1 and {SECS_PER_DAY}, got '{raw}'"))
                })?;
            config.recheck_interval = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(ENV_REPORT_TIME) {
            config.report_at = parse_time(raw.trim())
                .ok_or_else(|| InitError::Config(format!("{ENV_REPORT_TIME} must be HH:MM, got '{raw}'")))?;
        }

        Ok(config)
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M").ok()
}

/// Get the database path, creating the data directory if needed.
pub fn db_path() -> Result<PathBuf, InitError> {
    if let Ok(path) = std::env::var(ENV_DB_PATH) {
        info!("Using database from {ENV_DB_PATH}: {path}");
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "tubegate", "Tubegate").ok_or(InitError::NoProjectDirs)?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(InitError::DataDirCreation)?;
    Ok(data_dir.join("tubegate.db"))
}
