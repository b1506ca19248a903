use super::kv::{self, Scope};
use crate::constants::{KEY_BLOCKED_COUNT, KEY_IS_BLOCKING};
use crate::error::AppError;
use rusqlite::Connection;
use serde::Serialize;

/// Cached values derived from the schedule and the block log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedState {
    pub is_blocking: bool,
    pub blocked_count: i64,
}

impl DerivedState {
    /// Read the cached values. Unset keys read as not blocking and zero.
    pub fn load(conn: &Connection) -> Result<Self, AppError> {
        Ok(Self {
            is_blocking: kv::get(conn, Scope::Local, KEY_IS_BLOCKING)?.unwrap_or(false),
            blocked_count: kv::get(conn, Scope::Local, KEY_BLOCKED_COUNT)?.unwrap_or(0),
        })
    }
}
