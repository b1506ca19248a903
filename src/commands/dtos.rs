// src/commands/dtos.rs

use crate::models::BlockEvent;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub is_blocking: bool,
    pub blocked_count: i64,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub date: String,
    pub videos: Vec<BlockEvent>,
}

/// A downloadable CSV of one day's blocked videos.
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub filename: String,
    pub content: String,
}
