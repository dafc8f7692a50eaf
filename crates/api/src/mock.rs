//! Scriptable backend and confirmation for tests and offline demos.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use anyhow::Result;
use qdeck_core::{ATTR_DELAYED, ATTR_HIDDEN, ATTR_VISIBLE};
use qdeck_sqshub::{FailureKind, SqsFailure};

use crate::{Confirm, ConfirmPrompt, QueueBackend};

#[derive(Default)]
struct MockState {
    queues: Vec<(String, BTreeMap<String, String>)>,
    region: String,
    list_error: Option<String>,
    attr_failures: HashSet<String>,
    purge_failures: HashSet<String>,
    purged: Vec<String>,
    deleted: Vec<String>,
    list_calls: usize,
}

/// In-memory queue backend. Purging zeroes a queue's counts; deleting removes it.
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl Default for MockBackend {
    fn default() -> Self { Self::new() }
}

impl MockBackend {
    pub fn new() -> Self {
        Self { state: Mutex::new(MockState { region: "us-west-2".into(), ..Default::default() }) }
    }

    fn st(&self) -> std::sync::MutexGuard<'_, MockState> {
        // a poisoned mock only happens after a test already panicked
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Add a queue with visible/hidden/delayed counts.
    pub fn with_queue(self, url: &str, visible: u64, hidden: u64, delayed: u64) -> Self {
        let mut attrs = BTreeMap::new();
        attrs.insert(ATTR_VISIBLE.to_string(), visible.to_string());
        attrs.insert(ATTR_HIDDEN.to_string(), hidden.to_string());
        attrs.insert(ATTR_DELAYED.to_string(), delayed.to_string());
        self.st().queues.push((url.to_string(), attrs));
        self
    }

    pub fn set_attribute(&self, url: &str, key: &str, value: &str) {
        if let Some((_, a)) = self.st().queues.iter_mut().find(|(u, _)| u == url) {
            a.insert(key.to_string(), value.to_string());
        }
    }

    /// Make listing fail as if the endpoint were unreachable.
    pub fn fail_list(&self, message: Option<&str>) {
        self.st().list_error = message.map(str::to_string);
    }

    pub fn fail_attributes(&self, url: &str) {
        self.st().attr_failures.insert(url.to_string());
    }

    pub fn fail_purge(&self, url: &str) {
        self.st().purge_failures.insert(url.to_string());
    }

    pub fn purged(&self) -> Vec<String> { self.st().purged.clone() }

    pub fn deleted(&self) -> Vec<String> { self.st().deleted.clone() }

    pub fn list_calls(&self) -> usize { self.st().list_calls }
}

fn failure(kind: FailureKind, code: &str, queue_url: &str) -> anyhow::Error {
    SqsFailure::new(kind, Some(code), format!("{}: {}", code, queue_url)).into()
}

fn not_found(queue_url: &str) -> anyhow::Error {
    failure(FailureKind::NotFound, "AWS.SimpleQueueService.NonExistentQueue", queue_url)
}

#[async_trait::async_trait]
impl QueueBackend for MockBackend {
    async fn list_queue_urls(&self) -> Result<Vec<String>> {
        let mut st = self.st();
        st.list_calls += 1;
        if let Some(msg) = &st.list_error {
            return Err(SqsFailure::new(FailureKind::Connection, None, msg.clone()).into());
        }
        Ok(st.queues.iter().map(|(u, _)| u.clone()).collect())
    }

    async fn queue_attributes(&self, queue_url: &str, names: &[&str]) -> Result<BTreeMap<String, String>> {
        let st = self.st();
        if st.attr_failures.contains(queue_url) {
            return Err(failure(FailureKind::Permission, "AccessDenied", queue_url));
        }
        let (_, attrs) = st
            .queues
            .iter()
            .find(|(u, _)| u == queue_url)
            .ok_or_else(|| not_found(queue_url))?;
        Ok(attrs.iter().filter(|(k, _)| names.contains(&k.as_str())).map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    async fn purge_queue(&self, queue_url: &str) -> Result<()> {
        let mut st = self.st();
        if st.purge_failures.contains(queue_url) {
            return Err(failure(FailureKind::Service, "PurgeQueueInProgress", queue_url));
        }
        let (_, attrs) = st
            .queues
            .iter_mut()
            .find(|(u, _)| u == queue_url)
            .ok_or_else(|| not_found(queue_url))?;
        for k in [ATTR_VISIBLE, ATTR_HIDDEN, ATTR_DELAYED] {
            attrs.insert(k.to_string(), "0".to_string());
        }
        st.purged.push(queue_url.to_string());
        Ok(())
    }

    async fn delete_queue(&self, queue_url: &str) -> Result<()> {
        let mut st = self.st();
        let before = st.queues.len();
        st.queues.retain(|(u, _)| u != queue_url);
        if st.queues.len() == before {
            return Err(not_found(queue_url));
        }
        st.deleted.push(queue_url.to_string());
        Ok(())
    }

    async fn region(&self) -> String {
        self.st().region.clone()
    }

    async fn set_region(&self, region: &str) -> Result<()> {
        qdeck_sqshub::validate_region(region)?;
        self.st().region = region.to_string();
        Ok(())
    }
}

/// Fixed-answer confirmation that records what it was asked.
pub struct AutoConfirm {
    answer: bool,
    asked: Mutex<Vec<ConfirmPrompt>>,
}

impl AutoConfirm {
    pub fn new(answer: bool) -> Self {
        Self { answer, asked: Mutex::new(Vec::new()) }
    }

    pub fn yes() -> Self { Self::new(true) }

    pub fn no() -> Self { Self::new(false) }

    pub fn prompts(&self) -> Vec<ConfirmPrompt> {
        self.asked.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Confirm for AutoConfirm {
    async fn confirm(&self, prompt: ConfirmPrompt) -> bool {
        if let Ok(mut v) = self.asked.lock() {
            v.push(prompt);
        }
        self.answer
    }
}
