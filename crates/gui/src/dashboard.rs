#![forbid(unsafe_code)]

//! Dashboard controller state. Free of egui and tokio; callers pass the clock in.

use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use qdeck_api::{ActionResult, ConnectionStatus, QdeckResult, Queue, RegionChange};
use qdeck_core::{filter_queues, QueueStats};
use tracing::{debug, info, warn};

use crate::model::ToastKind;
use crate::refresh::RefreshIndicator;
use crate::render::{CardRegistry, RenderReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Refresh button, startup, and reloads after actions. Blocks the UI.
    Manual,
    /// Auto-refresh tick. Shows only the lightweight indicator.
    Timer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub seq: u64,
    pub origin: LoadOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed,
    /// Superseded by a newer completion; dropped.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoRefreshState {
    Disabled,
    EnabledIdle,
    EnabledPolling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Purge,
    Delete,
    PurgeAll,
}

impl ActionKind {
    pub fn failure_title(&self) -> &'static str {
        match self {
            ActionKind::Purge => "Purge Failed",
            ActionKind::Delete => "Delete Failed",
            ActionKind::PurgeAll => "Purge All Failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Cancelled,
    Failed,
    /// Reload and notify.
    Succeeded { toast: String, kind: ToastKind },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorModal {
    pub title: String,
    pub message: String,
}

pub struct Dashboard {
    queues: Vec<Queue>,
    filtered: Vec<Queue>,
    search: String,
    hide_empty: bool,
    stats: QueueStats,
    cards: CardRegistry,
    render_passes: u64,
    last_render: RenderReport,
    region: String,
    connection: Option<ConnectionStatus>,
    error: Option<ErrorModal>,
    auto_refresh: bool,
    indicator: RefreshIndicator,
    in_flight: usize,
    timer_in_flight: usize,
    blocking: usize,
    region_pending: bool,
    next_seq: u64,
    applied_seq: u64,
}

impl Dashboard {
    pub fn new(indicator_delay: Duration) -> Self {
        Self {
            queues: Vec::new(),
            filtered: Vec::new(),
            search: String::new(),
            hide_empty: false,
            stats: QueueStats::default(),
            cards: CardRegistry::new(),
            render_passes: 0,
            last_render: RenderReport::default(),
            region: String::new(),
            connection: None,
            error: None,
            auto_refresh: true,
            indicator: RefreshIndicator::new(indicator_delay),
            in_flight: 0,
            timer_in_flight: 0,
            blocking: 0,
            region_pending: false,
            next_seq: 0,
            applied_seq: 0,
        }
    }

    pub fn queues(&self) -> &[Queue] { &self.queues }
    pub fn filtered(&self) -> &[Queue] { &self.filtered }
    pub fn search(&self) -> &str { &self.search }
    pub fn hide_empty(&self) -> bool { self.hide_empty }
    pub fn stats(&self) -> QueueStats { self.stats }
    pub fn cards(&self) -> &CardRegistry { &self.cards }
    pub fn render_passes(&self) -> u64 { self.render_passes }
    pub fn last_render(&self) -> RenderReport { self.last_render }
    pub fn region(&self) -> &str { &self.region }
    pub fn in_flight(&self) -> usize { self.in_flight }

    /// Returns whether the term changed (and a render pass ran).
    pub fn set_search(&mut self, term: &str) -> bool {
        if self.search == term {
            return false;
        }
        self.search = term.to_string();
        self.refilter();
        true
    }

    pub fn set_hide_empty(&mut self, on: bool) -> bool {
        if self.hide_empty == on {
            return false;
        }
        self.hide_empty = on;
        self.refilter();
        true
    }

    pub fn replace_queues(&mut self, queues: Vec<Queue>) {
        self.queues = queues;
        self.refilter();
    }

    // One render pass per filter or data change.
    fn refilter(&mut self) {
        let t0 = Instant::now();
        self.filtered = filter_queues(&self.queues, &self.search, self.hide_empty);
        self.stats = QueueStats::compute(&self.filtered, self.queues.len());
        self.last_render = self.cards.reconcile(&self.filtered, self.queues.len());
        self.render_passes += 1;
        histogram!("qdeck_render_ms", t0.elapsed().as_secs_f64() * 1000.0);
        debug!(
            shown = self.filtered.len(),
            total = self.queues.len(),
            created = self.last_render.created,
            patched = self.last_render.patched,
            removed = self.last_render.removed,
            "render pass"
        );
    }

    /// Ticket for a new load, or `None` when a timer tick is skipped.
    pub fn begin_load(&mut self, origin: LoadOrigin) -> Option<LoadTicket> {
        if origin == LoadOrigin::Timer {
            counter!("qdeck_poll_ticks_total", 1u64);
            if !self.auto_refresh || self.in_flight > 0 {
                counter!("qdeck_poll_ticks_skipped_total", 1u64);
                debug!(in_flight = self.in_flight, auto = self.auto_refresh, "poll tick skipped");
                return None;
            }
            self.timer_in_flight += 1;
            self.indicator.show();
        } else {
            self.blocking += 1;
        }
        self.in_flight += 1;
        self.next_seq += 1;
        Some(LoadTicket { seq: self.next_seq, origin })
    }

    pub fn finish_load(&mut self, ticket: LoadTicket, result: QdeckResult<Vec<Queue>>, now: Instant) -> LoadOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        match ticket.origin {
            LoadOrigin::Manual => self.blocking = self.blocking.saturating_sub(1),
            LoadOrigin::Timer => {
                self.timer_in_flight = self.timer_in_flight.saturating_sub(1);
                if self.auto_refresh {
                    self.indicator.hide_after(now);
                } else {
                    self.indicator.hide();
                }
            }
        }
        if ticket.seq < self.applied_seq {
            debug!(seq = ticket.seq, applied = self.applied_seq, "stale load discarded");
            return LoadOutcome::Stale;
        }
        self.applied_seq = ticket.seq;
        match result {
            Ok(queues) => {
                self.replace_queues(queues);
                LoadOutcome::Applied
            }
            Err(e) => {
                warn!(error = %e, origin = ?ticket.origin, "load failed");
                match ticket.origin {
                    LoadOrigin::Manual => self.show_error("Failed to load queues", e.message()),
                    LoadOrigin::Timer => self.show_error_if_idle("Failed to load queues", e.message()),
                }
                LoadOutcome::Failed
            }
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking > 0 || self.region_pending
    }

    pub fn indicator_visible(&self, now: Instant) -> bool {
        self.indicator.is_visible(now)
    }

    pub fn auto_refresh(&self) -> bool { self.auto_refresh }

    /// Returns whether the flag changed. Turning off hides the indicator for good.
    pub fn set_auto_refresh(&mut self, on: bool) -> bool {
        if self.auto_refresh == on {
            return false;
        }
        self.auto_refresh = on;
        if !on {
            self.indicator.hide();
        }
        info!(enabled = on, "auto-refresh toggled");
        true
    }

    pub fn auto_refresh_state(&self) -> AutoRefreshState {
        match (self.auto_refresh, self.timer_in_flight > 0) {
            (false, _) => AutoRefreshState::Disabled,
            (true, false) => AutoRefreshState::EnabledIdle,
            (true, true) => AutoRefreshState::EnabledPolling,
        }
    }

    pub fn action_finished(&mut self, kind: ActionKind, result: &ActionResult) -> ActionOutcome {
        if result.success {
            info!(action = ?kind, message = %result.message, errors = result.errors.len(), "action ok");
            if result.errors.is_empty() {
                return ActionOutcome::Succeeded { toast: result.message.clone(), kind: ToastKind::Success };
            }
            let toast = format!("{}\n{}", result.message, result.errors.join("\n"));
            return ActionOutcome::Succeeded { toast, kind: ToastKind::Warn };
        }
        if result.is_cancellation() {
            info!(action = ?kind, "action cancelled");
            return ActionOutcome::Cancelled;
        }
        warn!(action = ?kind, message = %result.message, "action failed");
        let message = if result.errors.is_empty() {
            result.message.clone()
        } else {
            format!("{}\n\n{}", result.message, result.errors.join("\n"))
        };
        self.show_error(kind.failure_title(), message);
        ActionOutcome::Failed
    }

    pub fn begin_region_change(&mut self) {
        self.region_pending = true;
    }

    /// Apply a region switch result. Returns true on success.
    pub fn region_changed(&mut self, change: &RegionChange) -> bool {
        self.region_pending = false;
        if change.success {
            if self.region != change.region {
                self.connection = None;
            }
            self.region = change.region.clone();
            return true;
        }
        self.region = change.region.clone();
        self.show_error("Region Change Failed", change.error.clone().unwrap_or_else(|| "unknown error".into()));
        false
    }

    pub fn set_region(&mut self, region: impl Into<String>) {
        self.region = region.into();
    }

    /// Record a connection check. The region is never taken from it: a status
    /// naming another region comes from a check that started before a switch
    /// and is dropped. Returns whether the status was kept.
    pub fn set_connection(&mut self, status: ConnectionStatus) -> bool {
        if !status.region.is_empty() && !self.region.is_empty() && status.region != self.region {
            debug!(status_region = %status.region, region = %self.region, "stale connection status dropped");
            return false;
        }
        self.connection = Some(status);
        true
    }

    pub fn connection(&self) -> Option<&ConnectionStatus> { self.connection.as_ref() }

    pub fn connection_text(&self) -> String {
        match &self.connection {
            None => "Checking connection...".to_string(),
            Some(c) if c.connected => {
                if c.region.is_empty() {
                    "Connected to LocalStack".to_string()
                } else {
                    format!("Connected to LocalStack ({})", c.region)
                }
            }
            Some(c) => match &c.error {
                Some(e) => format!("Disconnected: {}", e),
                None => "Disconnected".to_string(),
            },
        }
    }

    pub fn error(&self) -> Option<&ErrorModal> { self.error.as_ref() }

    pub fn show_error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.error = Some(ErrorModal { title: title.into(), message: message.into() });
    }

    fn show_error_if_idle(&mut self, title: &str, message: &str) {
        if self.error.is_none() {
            self.show_error(title, message);
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use qdeck_api::{QdeckError, PURGE_CANCELLED};
    use qdeck_core::ATTR_VISIBLE;
    use std::collections::BTreeMap;

    fn q(name: &str, visible: u64) -> Queue {
        let mut a = BTreeMap::new();
        a.insert(ATTR_VISIBLE.to_string(), visible.to_string());
        Queue::new(format!("http://localhost:4566/000000000000/{}", name), a, Utc::now())
    }

    fn dash() -> Dashboard { Dashboard::new(Duration::from_millis(800)) }

    #[test]
    fn one_render_pass_per_change() {
        let mut d = dash();
        d.replace_queues(vec![q("orders", 3), q("empty", 0)]);
        assert_eq!(d.render_passes(), 1);
        assert!(d.set_search("ord"));
        assert_eq!(d.render_passes(), 2);
        assert!(!d.set_search("ord"));
        assert_eq!(d.render_passes(), 2);
        assert!(d.set_hide_empty(true));
        assert!(!d.set_hide_empty(true));
        assert_eq!(d.render_passes(), 3);
        assert_eq!(d.filtered().len(), 1);
        assert_eq!(d.stats().queue_display(), "1/2");
    }

    #[test]
    fn timer_tick_skipped_while_loading() {
        let mut d = dash();
        let manual = d.begin_load(LoadOrigin::Manual).unwrap();
        assert!(d.is_blocking());
        assert!(d.begin_load(LoadOrigin::Timer).is_none());
        d.finish_load(manual, Ok(vec![]), Instant::now());
        assert!(!d.is_blocking());
        assert!(d.begin_load(LoadOrigin::Timer).is_some());
        assert_eq!(d.auto_refresh_state(), AutoRefreshState::EnabledPolling);
    }

    #[test]
    fn manual_loads_always_run_and_stale_results_drop() {
        let mut d = dash();
        let first = d.begin_load(LoadOrigin::Manual).unwrap();
        let second = d.begin_load(LoadOrigin::Manual).unwrap();
        assert!(second.seq > first.seq);
        let now = Instant::now();
        assert_eq!(d.finish_load(second, Ok(vec![q("new", 1)]), now), LoadOutcome::Applied);
        assert_eq!(d.finish_load(first, Ok(vec![q("old", 1)]), now), LoadOutcome::Stale);
        assert_eq!(d.queues()[0].name, "new");
        assert!(!d.is_blocking());
    }

    #[test]
    fn disabling_mid_flight_keeps_indicator_hidden() {
        let mut d = dash();
        let t = d.begin_load(LoadOrigin::Timer).unwrap();
        let now = Instant::now();
        assert!(d.indicator_visible(now));
        d.set_auto_refresh(false);
        assert!(!d.indicator_visible(now));
        d.finish_load(t, Ok(vec![]), now);
        assert!(!d.indicator_visible(now));
        assert_eq!(d.auto_refresh_state(), AutoRefreshState::Disabled);
        assert!(d.begin_load(LoadOrigin::Timer).is_none());
    }

    #[test]
    fn indicator_auto_hides_after_timer_load() {
        let mut d = dash();
        let t = d.begin_load(LoadOrigin::Timer).unwrap();
        let now = Instant::now();
        d.finish_load(t, Ok(vec![]), now);
        assert!(d.indicator_visible(now + Duration::from_millis(100)));
        assert!(!d.indicator_visible(now + Duration::from_millis(900)));
        assert_eq!(d.auto_refresh_state(), AutoRefreshState::EnabledIdle);
    }

    #[test]
    fn background_failure_does_not_replace_open_modal() {
        let mut d = dash();
        d.show_error("Delete Failed", "first");
        let t = d.begin_load(LoadOrigin::Timer).unwrap();
        let out = d.finish_load(t, Err(QdeckError::Connection("down".into())), Instant::now());
        assert_eq!(out, LoadOutcome::Failed);
        assert_eq!(d.error().map(|e| e.title.as_str()), Some("Delete Failed"));
        d.dismiss_error();
        let t = d.begin_load(LoadOrigin::Timer).unwrap();
        d.finish_load(t, Err(QdeckError::Connection("down".into())), Instant::now());
        assert_eq!(d.error().map(|e| e.message.as_str()), Some("down"));
        assert!(d.auto_refresh(), "failed polls keep auto-refresh on");
    }

    #[test]
    fn failed_load_keeps_previous_queues() {
        let mut d = dash();
        d.replace_queues(vec![q("a", 1)]);
        let t = d.begin_load(LoadOrigin::Manual).unwrap();
        d.finish_load(t, Err(QdeckError::Internal("boom".into())), Instant::now());
        assert_eq!(d.queues().len(), 1);
        assert_eq!(d.error().map(|e| e.title.as_str()), Some("Failed to load queues"));
    }

    #[test]
    fn cancellation_is_quiet() {
        let mut d = dash();
        let out = d.action_finished(ActionKind::Purge, &ActionResult::cancelled(PURGE_CANCELLED));
        assert_eq!(out, ActionOutcome::Cancelled);
        assert!(d.error().is_none());
    }

    #[test]
    fn failures_use_action_titles() {
        let mut d = dash();
        assert_eq!(d.action_finished(ActionKind::Delete, &ActionResult::failed("nope")), ActionOutcome::Failed);
        assert_eq!(d.error().map(|e| e.title.as_str()), Some("Delete Failed"));
        let all = ActionResult::failed("Failed to purge all queues").with_errors(vec!["a: x".into()]);
        d.action_finished(ActionKind::PurgeAll, &all);
        let e = d.error().unwrap();
        assert_eq!(e.title, "Purge All Failed");
        assert!(e.message.contains("a: x"));
    }

    #[test]
    fn partial_purge_all_is_a_warning_toast() {
        let mut d = dash();
        let r = ActionResult::ok("Purged 1 of 2 queues").with_errors(vec!["b: busy".into()]);
        match d.action_finished(ActionKind::PurgeAll, &r) {
            ActionOutcome::Succeeded { toast, kind } => {
                assert_eq!(kind, ToastKind::Warn);
                assert!(toast.contains("b: busy"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(d.error().is_none());
    }

    #[test]
    fn connection_text() {
        let mut d = dash();
        assert_eq!(d.connection_text(), "Checking connection...");
        d.set_region("us-west-2");
        assert!(d.set_connection(ConnectionStatus { connected: true, error: None, region: "us-west-2".into() }));
        assert_eq!(d.connection_text(), "Connected to LocalStack (us-west-2)");
        d.set_connection(ConnectionStatus { connected: false, error: Some("refused".into()), region: String::new() });
        assert_eq!(d.connection_text(), "Disconnected: refused");
    }

    #[test]
    fn region_change_failure_opens_modal() {
        let mut d = dash();
        d.set_region("us-west-2");
        d.begin_region_change();
        assert!(d.is_blocking());
        let ok = d.region_changed(&RegionChange { success: false, region: "us-west-2".into(), error: Some("bad".into()) });
        assert!(!ok);
        assert!(!d.is_blocking());
        assert_eq!(d.error().map(|e| e.title.as_str()), Some("Region Change Failed"));
        assert_eq!(d.region(), "us-west-2");
    }

    #[test]
    fn check_from_before_a_switch_keeps_the_new_region() {
        let mut d = dash();
        d.set_region("us-west-2");
        d.set_connection(ConnectionStatus { connected: true, error: None, region: "us-west-2".into() });
        d.begin_region_change();
        assert!(d.region_changed(&RegionChange { success: true, region: "eu-west-1".into(), error: None }));
        assert_eq!(d.connection_text(), "Checking connection...");

        let late = ConnectionStatus { connected: true, error: None, region: "us-west-2".into() };
        assert!(!d.set_connection(late));
        assert_eq!(d.region(), "eu-west-1");
        assert_eq!(d.connection_text(), "Checking connection...");

        assert!(d.set_connection(ConnectionStatus { connected: true, error: None, region: "eu-west-1".into() }));
        assert_eq!(d.connection_text(), "Connected to LocalStack (eu-west-1)");
    }
}
