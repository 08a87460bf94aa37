use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::ids::{InfoAlertId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum WatchPriority {
    High,
    Medium,
}

impl WatchPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchPriority::High => "high",
            WatchPriority::Medium => "medium",
        }
    }

    /// Relevance scores above this threshold are surfaced as high priority.
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            WatchPriority::High
        } else {
            WatchPriority::Medium
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum WatchStatus {
    Unread,
    Read,
}

impl WatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::Unread => "unread",
            WatchStatus::Read => "read",
        }
    }
}

/// A regulatory-watch finding attached to a company.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InfoAlertRecord {
    pub id: InfoAlertId,
    pub company_id: String,
    pub user_id: Option<UserId>,
    pub title: String,
    pub message: String,
    pub source: String,
    pub priority: WatchPriority,
    pub status: WatchStatus,
    pub detected_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub metadata: Value,
}
