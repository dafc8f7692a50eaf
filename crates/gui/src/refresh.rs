#![forbid(unsafe_code)]

use std::sync::mpsc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::info;

use crate::model::UiUpdate;

/// The auto-refresh timer: at most one tokio interval task at a time.
///
/// Each start bumps a generation carried by every tick, so a tick that was
/// already queued when the timer was stopped can be recognised and dropped.
pub struct AutoRefresh {
    period: Duration,
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl AutoRefresh {
    pub fn new(period: Duration) -> Self {
        Self { period, task: None, generation: 0 }
    }

    /// Start ticking into `tx`. Returns false when already running.
    pub fn start(&mut self, tx: mpsc::Sender<UiUpdate>) -> bool {
        if self.is_running() {
            return false;
        }
        self.generation += 1;
        let generation = self.generation;
        let period = self.period;
        info!(period_ms = %period.as_millis(), generation, "auto-refresh: start");
        self.task = Some(tokio::spawn(async move {
            let mut iv = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            iv.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                iv.tick().await;
                if tx.send(UiUpdate::Tick(generation)).is_err() {
                    break;
                }
            }
        }));
        true
    }

    /// Returns false when nothing was running.
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(h) => {
                h.abort();
                info!(generation = self.generation, "auto-refresh: stop");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    pub fn generation(&self) -> u64 { self.generation }

    /// Whether a tick of `generation` comes from the live timer.
    pub fn accepts(&self, generation: u64) -> bool {
        self.is_running() && generation == self.generation
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        if let Some(h) = self.task.take() {
            h.abort();
        }
    }
}

/// Lightweight "refreshing" badge for timer-driven loads.
#[derive(Debug, Clone)]
pub struct RefreshIndicator {
    delay: Duration,
    shown: bool,
    hide_at: Option<Instant>,
}

impl RefreshIndicator {
    pub fn new(delay: Duration) -> Self {
        Self { delay, shown: false, hide_at: None }
    }

    pub fn show(&mut self) {
        self.shown = true;
        self.hide_at = None;
    }

    /// Keep the badge up for the configured delay after `now`.
    pub fn hide_after(&mut self, now: Instant) {
        if self.shown {
            self.hide_at = Some(now + self.delay);
        }
    }

    pub fn hide(&mut self) {
        self.shown = false;
        self.hide_at = None;
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.shown && self.hide_at.map(|t| now < t).unwrap_or(true)
    }
}
