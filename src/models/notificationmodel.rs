use chrono::{DateTime, Utc};
use serde::Serialize;

/// Built from raw feed rows by `normalizer::normalize_notification`.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: Option<DateTime<Utc>>,
}
