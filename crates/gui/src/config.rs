#![forbid(unsafe_code)]

use std::time::Duration;

use qdeck_core::{regions_from_env, KNOWN_REGIONS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Auto-refresh period.
    pub refresh: Duration,
    /// How long the background refresh indicator lingers after a poll.
    pub indicator: Duration,
    pub regions: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh: Duration::from_millis(5_000),
            indicator: Duration::from_millis(800),
            regions: KNOWN_REGIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        let refresh_ms = std::env::var("QDECK_REFRESH_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(d.refresh.as_millis() as u64);
        let indicator_ms = std::env::var("QDECK_INDICATOR_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(d.indicator.as_millis() as u64);
        let regions = regions_from_env();
        Self {
            refresh: Duration::from_millis(refresh_ms),
            indicator: Duration::from_millis(indicator_ms),
            regions,
        }
    }

    /// Selector entries, with `current` appended when it is not already offered.
    pub fn region_choices(&self, current: &str) -> Vec<String> {
        let mut out = self.regions.clone();
        if !current.is_empty() && !out.iter().any(|r| r == current) {
            out.push(current.to_string());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_region_is_always_selectable() {
        let c = DashboardConfig::default();
        assert!(c.region_choices("us-west-2").iter().filter(|r| *r == "us-west-2").count() == 1);
        assert_eq!(c.region_choices("sa-east-1").last().map(String::as_str), Some("sa-east-1"));
    }

    #[test]
    fn defaults() {
        let c = DashboardConfig::default();
        assert_eq!(c.refresh, Duration::from_secs(5));
        assert_eq!(c.indicator, Duration::from_millis(800));
    }
}
