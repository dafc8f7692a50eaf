//! qdeck core types: queues, derived depth metrics, filtering and formatting.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod filter;
pub mod format;

pub use filter::{filter_queues, QueueStats};
pub use format::format_duration;

// Attribute names as reported by the queue management API.
pub const ATTR_VISIBLE: &str = "ApproximateNumberOfMessages";
pub const ATTR_HIDDEN: &str = "ApproximateNumberOfMessagesNotVisible";
pub const ATTR_DELAYED: &str = "ApproximateNumberOfMessagesDelayed";
pub const ATTR_VISIBILITY_TIMEOUT: &str = "VisibilityTimeout";
pub const ATTR_RETENTION_PERIOD: &str = "MessageRetentionPeriod";
pub const ATTR_CREATED_TIMESTAMP: &str = "CreatedTimestamp";

/// Attributes requested for every queue on listing.
pub const LISTED_ATTRIBUTES: [&str; 6] = [
    ATTR_VISIBLE,
    ATTR_HIDDEN,
    ATTR_DELAYED,
    ATTR_VISIBILITY_TIMEOUT,
    ATTR_RETENTION_PERIOD,
    ATTR_CREATED_TIMESTAMP,
];

/// A queue as last reported by the provider. Keyed by `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queue {
    pub name: String,
    pub url: String,
    /// Raw attribute values (counts are strings on the wire).
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Set when fetching this queue's attributes failed; metrics are then empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl Queue {
    pub fn new(url: impl Into<String>, attributes: BTreeMap<String, String>, last_updated: DateTime<Utc>) -> Self {
        let url = url.into();
        Self { name: queue_name_from_url(&url).to_string(), url, attributes, error: None, last_updated }
    }

    /// A listed queue whose attributes could not be fetched.
    pub fn with_error(url: impl Into<String>, error: impl Into<String>, last_updated: DateTime<Utc>) -> Self {
        let mut q = Self::new(url, BTreeMap::new(), last_updated);
        q.error = Some(error.into());
        q
    }

    pub fn metrics(&self) -> QueueMetrics {
        QueueMetrics::from_attributes(&self.attributes)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|s| s.as_str())
    }
}

/// Depth counters derived from raw attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMetrics {
    pub visible: u64,
    pub hidden: u64,
    pub delayed: u64,
}

impl QueueMetrics {
    pub fn from_attributes(attrs: &BTreeMap<String, String>) -> Self {
        let count = |key: &str| attrs.get(key).map(|v| parse_count(v)).unwrap_or(0);
        Self { visible: count(ATTR_VISIBLE), hidden: count(ATTR_HIDDEN), delayed: count(ATTR_DELAYED) }
    }

    pub fn total(&self) -> u64 {
        self.visible.saturating_add(self.hidden).saturating_add(self.delayed)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Parse a count the way the dashboard always has: leading digits, else 0.
/// Digit runs past `u64::MAX` clamp to it.
pub fn parse_count(raw: &str) -> u64 {
    let digits: String = raw.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

/// Last path segment of a queue URL (`http://host/000000000000/orders` -> `orders`).
pub fn queue_name_from_url(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}

/// Region choices offered when none are configured.
pub const KNOWN_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "eu-west-1",
    "eu-central-1",
    "ap-southeast-1",
    "ap-northeast-1",
];

/// Comma-separated region list, trimmed and deduplicated in order.
pub fn parse_region_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for r in raw.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if !out.iter().any(|x| x == r) {
            out.push(r.to_string());
        }
    }
    out
}

/// `QDECK_REGIONS` when set and non-empty, else [`KNOWN_REGIONS`].
pub fn regions_from_env() -> Vec<String> {
    std::env::var("QDECK_REGIONS")
        .ok()
        .map(|s| parse_region_list(&s))
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| KNOWN_REGIONS.iter().map(|s| s.to_string()).collect())
}

pub mod prelude {
    pub use super::{filter_queues, format_duration, Queue, QueueMetrics, QueueStats};
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() }

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn name_is_last_url_segment() {
        assert_eq!(queue_name_from_url("http://localhost:4566/000000000000/orders"), "orders");
        assert_eq!(queue_name_from_url("http://localhost:4566/000000000000/orders/"), "orders");
        assert_eq!(queue_name_from_url("orders"), "orders");
    }

    #[test]
    fn metrics_default_to_zero() {
        let q = Queue::new("http://h/1/a", attrs(&[(ATTR_VISIBLE, "3")]), ts());
        let m = q.metrics();
        assert_eq!(m, QueueMetrics { visible: 3, hidden: 0, delayed: 0 });
        assert_eq!(m.total(), 3);
    }

    #[test]
    fn metrics_sum_all_three() {
        let q = Queue::new(
            "http://h/1/a",
            attrs(&[(ATTR_VISIBLE, "1"), (ATTR_HIDDEN, "2"), (ATTR_DELAYED, "4")]),
            ts(),
        );
        assert_eq!(q.metrics().total(), 7);
    }

    #[test]
    fn huge_counts_saturate() {
        let q = Queue::new(
            "http://h/1/a",
            attrs(&[(ATTR_VISIBLE, "18446744073709551615"), (ATTR_HIDDEN, "1"), (ATTR_DELAYED, "99999999999999999999")]),
            ts(),
        );
        let m = q.metrics();
        assert_eq!(m.delayed, u64::MAX);
        assert_eq!(m.total(), u64::MAX);
        assert!(!m.is_empty());
    }

    #[test]
    fn parse_count_is_lenient() {
        assert_eq!(parse_count("12"), 12);
        assert_eq!(parse_count(" 7 "), 7);
        assert_eq!(parse_count("5abc"), 5);
        assert_eq!(parse_count("abc"), 0);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("-3"), 0);
    }

    #[test]
    fn region_list_is_trimmed_and_deduped() {
        assert_eq!(parse_region_list(" us-east-1, eu-west-1,,us-east-1 "), vec!["us-east-1", "eu-west-1"]);
        assert!(parse_region_list(" , ").is_empty());
    }

    #[test]
    fn errored_queue_has_empty_metrics() {
        let q = Queue::with_error("http://h/1/broken", "AccessDenied", ts());
        assert_eq!(q.name, "broken");
        assert_eq!(q.error.as_deref(), Some("AccessDenied"));
        assert!(q.metrics().is_empty());
    }

    #[test]
    fn queue_serializes_without_error_field() {
        let q = Queue::new("http://h/1/a", BTreeMap::new(), ts());
        let v = serde_json::to_value(&q).unwrap();
        assert!(v.get("error").is_none());
        assert_eq!(v["name"], "a");
    }
}
