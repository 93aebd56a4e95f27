use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Final metrics of one completed test, as stored locally and sent to the
/// results API.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub wpm: u32,
    pub accuracy: u32,
    pub cpm: u32,
    pub total_chars: usize,
    pub duration: u32,
    pub timestamp: String,
}

/// Fields every save request must carry.
pub const REQUIRED_FIELDS: &[&str] = &["wpm", "accuracy", "cpm", "totalChars", "duration"];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SaveResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StatsSummary {
    pub total_tests: i64,
    pub avg_wpm: f64,
    pub max_wpm: i64,
    pub avg_accuracy: f64,
}

/// ISO-8601 UTC timestamp with millisecond precision, e.g.
/// `2024-03-01T12:00:00.000Z`.
pub fn iso_timestamp(epoch_ms: u64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms as i64)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
