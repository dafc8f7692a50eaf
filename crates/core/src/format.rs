//! Display helpers shared by the GUI and CLI.

#![forbid(unsafe_code)]

use chrono::{DateTime, Local, Utc};

use crate::{parse_count, Queue, ATTR_RETENTION_PERIOD, ATTR_VISIBILITY_TIMEOUT};

/// Coarse human duration: `"1d 1h"`, `"1h 1m"`, `"5m"`, `"45s"`.
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3600;
    let minutes = (seconds % 3600) / 60;
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", seconds)
    }
}

pub fn visibility_timeout_text(q: &Queue) -> String {
    match q.attribute(ATTR_VISIBILITY_TIMEOUT) {
        Some(v) if !v.is_empty() => format!("{}s", v),
        _ => "N/A".to_string(),
    }
}

pub fn retention_text(q: &Queue) -> String {
    match q.attribute(ATTR_RETENTION_PERIOD) {
        Some(v) if !v.is_empty() => format_duration(parse_count(v)),
        _ => "N/A".to_string(),
    }
}

/// Local wall-clock time of a poll, e.g. `14:03:27`.
pub fn updated_text(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn durations() {
        assert_eq!(format_duration(90000), "1d 1h");
        assert_eq!(format_duration(3661), "1h 1m");
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(120), "2m");
        assert_eq!(format_duration(345_600), "4d 0h");
    }

    #[test]
    fn meta_texts() {
        let mut a = BTreeMap::new();
        a.insert(ATTR_VISIBILITY_TIMEOUT.to_string(), "30".to_string());
        a.insert(ATTR_RETENTION_PERIOD.to_string(), "345600".to_string());
        let q = Queue::new("http://h/1/q", a, Utc::now());
        assert_eq!(visibility_timeout_text(&q), "30s");
        assert_eq!(retention_text(&q), "4d 0h");

        let bare = Queue::new("http://h/1/q", BTreeMap::new(), Utc::now());
        assert_eq!(visibility_timeout_text(&bare), "N/A");
        assert_eq!(retention_text(&bare), "N/A");
    }
}
