// src/constants.rs

/// Seconds in one day (24 * 60 * 60)
pub const SECS_PER_DAY: u64 = 86400;

/// Default period of the blocking-status recheck, in seconds
pub const RECHECK_INTERVAL_SECS: u64 = 60;

/// Local time of day at which the daily report fires
pub const DAILY_REPORT_TIME: &str = "18:00";

/// Chrome limits native messaging to 1MB (1024 * 1024 bytes)
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Maximum stored length of a video title
pub const MAX_TITLE_LEN: usize = 500;

/// Maximum stored length of an email address
pub const MAX_EMAIL_LEN: usize = 254;

/// Default window seeded for every weekday on first run
pub const DEFAULT_START_TIME: &str = "09:00";
pub const DEFAULT_END_TIME: &str = "17:00";

// Persisted keys. `businessHours` and `blockedVideos` live in their own tables;
// the names are still what change notifications are keyed by.
pub const KEY_BUSINESS_HOURS: &str = "businessHours";
pub const KEY_EMAIL: &str = "email";
pub const KEY_IS_BLOCKING: &str = "isBlocking";
pub const KEY_BLOCKED_COUNT: &str = "blockedCount";
pub const KEY_BLOCKED_VIDEOS: &str = "blockedVideos";
pub const KEY_LAST_RESET_DATE: &str = "lastResetDate";

// Alarm names
pub const ALARM_CHECK_BLOCKING_STATUS: &str = "checkBlockingStatus";
pub const ALARM_RESET_BLOCKED_COUNT: &str = "resetBlockedCount";
pub const ALARM_DAILY_REPORT: &str = "dailyReport";
