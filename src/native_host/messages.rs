use crate::commands::{ExportResponse, HistoryResponse, StatusResponse};
use crate::coordinator::Notification;
use crate::models::{BlockEvent, ScheduleEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Snapshot of a page element sent by the content script.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementSnapshot {
    pub id: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub player: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncomingMessage {
    // Content script
    VideoBlocked {
        #[serde(rename = "videoTitle")]
        video_title: String,
        #[serde(default)]
        url: String,
        #[serde(default)]
        thumbnail: String,
    },
    CheckBlockingStatus,
    DomMutated {
        elements: Vec<ElementSnapshot>,
    },

    // Popup
    UpdateSettings {
        #[serde(default)]
        data: Value,
    },
    GetStatus,
    GetBusinessHours,
    SetBusinessHours {
        #[serde(rename = "businessHours")]
        business_hours: BTreeMap<String, ScheduleEntry>,
    },
    UpdateDay {
        day: String,
        entry: ScheduleEntry,
    },
    GetHistory {
        date: String,
    },
    GetHistoryDates,
    GetAllHistory,
    ExportHistory {
        date: String,
    },
    ClearHistory {
        date: String,
    },
    GetEmail,
    SetEmail {
        email: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutgoingMessage {
    /// Current flag plus the overlay changes the content script must apply.
    BlockingStatus {
        #[serde(rename = "isBlocking")]
        is_blocking: bool,
        attach: Vec<String>,
        detach: Vec<String>,
    },
    Status(StatusResponse),
    BusinessHours {
        #[serde(rename = "businessHours")]
        business_hours: BTreeMap<String, ScheduleEntry>,
    },
    History(HistoryResponse),
    HistoryDates {
        dates: Vec<String>,
    },
    /// Every stored day, keyed by date.
    AllHistory {
        history: BTreeMap<String, Vec<BlockEvent>>,
    },
    Export(ExportResponse),
    Cleared {
        date: String,
        removed: usize,
    },
    Email {
        email: String,
    },
    Notification(Notification),
    Ok,
    Error {
        message: String,
    },
}
