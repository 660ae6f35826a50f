use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: u64,

    pub text: String,

    #[serde(default)]
    pub completed: bool,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: u64, text: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            text,
            completed: false,
            created_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.completed
    }
}

/// Ids are shaped like creation timestamps in milliseconds, bumped past
/// `high_water` so that no id handed out by a store is ever repeated.
/// `None` once `high_water` is `u64::MAX`.
pub fn next_id(high_water: u64, now: DateTime<Utc>) -> Option<u64> {
    let floor = high_water.checked_add(1)?;
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    Some(millis.max(floor))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{Task, next_id};

    #[test]
    fn serializes_with_camel_case_timestamp() {
        let now = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 30, 0)
            .single()
            .expect("valid now");
        let task = Task::new(7, "buy milk".to_string(), now);

        let json = serde_json::to_value(&task).expect("serialize task");
        assert_eq!(json["id"], 7);
        assert_eq!(json["text"], "buy milk");
        assert_eq!(json["completed"], false);
        assert_eq!(json["createdAt"], "2026-03-01T09:30:00Z");
    }

    #[test]
    fn parses_browser_style_iso_timestamps() {
        let raw = r#"{"id":1700000000000,"text":"walk dog","completed":true,"createdAt":"2023-11-14T22:13:20.000Z"}"#;
        let task: Task = serde_json::from_str(raw).expect("parse task");
        assert_eq!(task.id, 1_700_000_000_000);
        assert!(task.completed);
        assert_eq!(task.created_at.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn next_id_uses_clock_then_bumps_past_high_water() {
        let now = Utc
            .timestamp_millis_opt(5_000)
            .single()
            .expect("valid now");
        assert_eq!(next_id(0, now), Some(5_000));
        assert_eq!(next_id(5_000, now), Some(5_001));
        assert_eq!(next_id(9_999, now), Some(10_000));
        assert_eq!(next_id(u64::MAX - 1, now), Some(u64::MAX));
        assert_eq!(next_id(u64::MAX, now), None);
    }
}
