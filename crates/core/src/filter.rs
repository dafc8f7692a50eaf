//! Search/hide-empty filtering and aggregate stats over queue lists.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::Queue;

/// Queues whose name contains `term` (case-insensitive), minus empty queues
/// when `hide_empty` is set. Source order is preserved.
pub fn filter_queues(queues: &[Queue], term: &str, hide_empty: bool) -> Vec<Queue> {
    let needle = term.to_lowercase();
    queues
        .iter()
        .filter(|q| matches(q, &needle, hide_empty))
        .cloned()
        .collect()
}

fn matches(q: &Queue, needle_lower: &str, hide_empty: bool) -> bool {
    if !q.name.to_lowercase().contains(needle_lower) {
        return false;
    }
    !(hide_empty && q.metrics().is_empty())
}

/// Totals over the filtered list, plus the unfiltered queue count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub shown_queues: usize,
    pub total_queues: usize,
    pub messages: u64,
    pub hidden: u64,
    pub delayed: u64,
}

impl QueueStats {
    pub fn compute(filtered: &[Queue], total_queues: usize) -> Self {
        let mut s = Self { shown_queues: filtered.len(), total_queues, ..Default::default() };
        for q in filtered {
            let m = q.metrics();
            s.messages = s.messages.saturating_add(m.visible);
            s.hidden = s.hidden.saturating_add(m.hidden);
            s.delayed = s.delayed.saturating_add(m.delayed);
        }
        s
    }

    /// `"N"` when nothing is filtered out, `"shown/total"` otherwise.
    pub fn queue_display(&self) -> String {
        if self.shown_queues == self.total_queues {
            self.total_queues.to_string()
        } else {
            format!("{}/{}", self.shown_queues, self.total_queues)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ATTR_DELAYED, ATTR_HIDDEN, ATTR_VISIBLE};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn q(name: &str, visible: &str, hidden: &str, delayed: &str) -> Queue {
        let mut a = BTreeMap::new();
        a.insert(ATTR_VISIBLE.to_string(), visible.to_string());
        a.insert(ATTR_HIDDEN.to_string(), hidden.to_string());
        a.insert(ATTR_DELAYED.to_string(), delayed.to_string());
        Queue::new(format!("http://localhost:4566/000000000000/{}", name), a, Utc::now())
    }

    fn names(v: &[Queue]) -> Vec<&str> { v.iter().map(|q| q.name.as_str()).collect() }

    #[test]
    fn search_matches_substring_case_insensitively() {
        let list = vec![q("orders", "3", "0", "0"), q("Payments", "0", "0", "0")];
        assert_eq!(names(&filter_queues(&list, "ord", false)), vec!["orders"]);
        assert_eq!(names(&filter_queues(&list, "PAY", false)), vec!["Payments"]);
        assert!(filter_queues(&list, "zzz", false).is_empty());
    }

    #[test]
    fn name_search_example_orders() {
        let mut a = BTreeMap::new();
        a.insert(ATTR_VISIBLE.to_string(), "3".to_string());
        let mut orders = Queue::new("u1", a, Utc::now());
        orders.name = "orders".into();
        let list = vec![orders];
        assert_eq!(names(&filter_queues(&list, "ord", false)), vec!["orders"]);
        assert!(filter_queues(&list, "zzz", false).is_empty());
    }

    #[test]
    fn empty_term_keeps_everything_in_order() {
        let list = vec![q("c", "1", "0", "0"), q("a", "0", "0", "0"), q("b", "0", "2", "0")];
        assert_eq!(names(&filter_queues(&list, "", false)), vec!["c", "a", "b"]);
    }

    #[test]
    fn hide_empty_drops_only_zero_totals() {
        let list = vec![
            q("empty", "0", "0", "0"),
            q("inflight", "0", "1", "0"),
            q("delayed", "0", "0", "5"),
        ];
        assert_eq!(names(&filter_queues(&list, "", true)), vec!["inflight", "delayed"]);
        assert_eq!(names(&filter_queues(&list, "", false)), vec!["empty", "inflight", "delayed"]);
    }

    #[test]
    fn hide_empty_treats_missing_attributes_as_empty() {
        let list = vec![Queue::with_error("http://h/1/broken", "boom", Utc::now())];
        assert!(filter_queues(&list, "", true).is_empty());
        assert_eq!(filter_queues(&list, "", false).len(), 1);
    }

    #[test]
    fn predicates_intersect() {
        let list = vec![q("orders-dlq", "0", "0", "0"), q("orders", "2", "0", "0"), q("billing", "9", "0", "0")];
        assert_eq!(names(&filter_queues(&list, "orders", true)), vec!["orders"]);
    }

    #[test]
    fn stats_sum_filtered_rows() {
        let list = vec![q("a", "1", "2", "3"), q("b", "10", "0", "1")];
        let s = QueueStats::compute(&list, 5);
        assert_eq!(s.messages, 11);
        assert_eq!(s.hidden, 2);
        assert_eq!(s.delayed, 4);
        assert_eq!(s.queue_display(), "2/5");
        assert_eq!(QueueStats::compute(&list, 2).queue_display(), "2");
    }

    #[test]
    fn stats_saturate_instead_of_overflowing() {
        let max = u64::MAX.to_string();
        let list = vec![q("a", &max, "0", "1"), q("b", "5", &max, "0")];
        let s = QueueStats::compute(&list, 2);
        assert_eq!(s.messages, u64::MAX);
        assert_eq!(s.hidden, u64::MAX);
        assert_eq!(s.delayed, 1);
    }
}
