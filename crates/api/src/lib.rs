//! qdeck public API façade.
//!
//! This crate defines the provider contract frontends (GUI/CLI) depend on,
//! the confirmation capability destructive operations require, and the
//! in-process implementation over a queue backend.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

pub use qdeck_core::Queue;
use qdeck_sqshub::{FailureKind, SqsFailure};

mod mock;
mod service;

pub use mock::{AutoConfirm, MockBackend};
pub use service::QueueService;

pub const PURGE_CANCELLED: &str = "Purge cancelled";
pub const DELETE_CANCELLED: &str = "Deletion cancelled";
pub const PURGE_ALL_CANCELLED: &str = "Purge all cancelled";

/// API errors suitable for transport over IPC/RPC.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum QdeckError {
    #[error("connection: {0}")]
    Connection(String),
    #[error("not_found: {0}")]
    NotFound(String),
    #[error("permission: {0}")]
    Permission(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl QdeckError {
    /// The bare message, without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            QdeckError::Connection(m)
            | QdeckError::NotFound(m)
            | QdeckError::Permission(m)
            | QdeckError::Validation(m)
            | QdeckError::Internal(m) => m,
        }
    }

    /// Map a backend error by the failure kind sqshub attached to it.
    pub fn classify(e: &anyhow::Error) -> Self {
        let msg = format!("{:#}", e);
        let kind = e.chain().find_map(|c| c.downcast_ref::<SqsFailure>()).map(|f| f.kind);
        match kind {
            Some(FailureKind::Connection) => QdeckError::Connection(msg),
            Some(FailureKind::NotFound) => QdeckError::NotFound(msg),
            Some(FailureKind::Permission) => QdeckError::Permission(msg),
            Some(FailureKind::Validation) => QdeckError::Validation(msg),
            Some(FailureKind::Service) | None => QdeckError::Internal(msg),
        }
    }
}

pub type QdeckResult<T> = Result<T, QdeckError>;

/// Outcome of a destructive action. A cancellation is `success=false` with the
/// action's cancel message; it is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), errors: Vec::new() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), errors: Vec::new() }
    }

    pub fn cancelled(cancel_message: &str) -> Self {
        Self::failed(cancel_message)
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    pub fn is_cancellation(&self) -> bool {
        !self.success
            && matches!(self.message.as_str(), PURGE_CANCELLED | DELETE_CANCELLED | PURGE_ALL_CANCELLED)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionChange {
    pub success: bool,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What the user is asked before a destructive action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    pub detail: String,
    pub accept_label: String,
}

impl ConfirmPrompt {
    pub fn purge(queue_name: &str) -> Self {
        Self {
            title: "Confirm Queue Purge".into(),
            message: "Are you sure you want to purge all messages from this queue?".into(),
            detail: format!("Queue: {}\n\nThis action cannot be undone.", queue_name),
            accept_label: "Purge Queue".into(),
        }
    }

    pub fn delete(queue_name: &str) -> Self {
        Self {
            title: "Confirm Queue Deletion".into(),
            message: format!("Are you sure you want to delete the queue \"{}\"?", queue_name),
            detail: "This action cannot be undone. All messages in the queue will be lost permanently.".into(),
            accept_label: "Delete Queue".into(),
        }
    }

    pub fn purge_all(queue_count: usize) -> Self {
        Self {
            title: "Confirm Purge All".into(),
            message: format!("Are you sure you want to purge all messages from {} queues?", queue_count),
            detail: "Every queue in the current region will be emptied. This action cannot be undone.".into(),
            accept_label: "Purge All".into(),
        }
    }
}

/// Blocking user confirmation. Resolves `true` only on explicit acceptance.
#[async_trait::async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: ConfirmPrompt) -> bool;
}

/// Provider contract the dashboard renders from.
#[async_trait::async_trait]
pub trait QueueProvider: Send + Sync {
    /// All queues with attributes. Per-queue attribute failures are reported on
    /// the queue itself; only a failed listing is an error.
    async fn list_queues(&self) -> QdeckResult<Vec<Queue>>;

    async fn purge_queue(&self, queue_url: &str) -> ActionResult;

    async fn delete_queue(&self, queue_url: &str) -> ActionResult;

    async fn purge_all_queues(&self) -> ActionResult;

    async fn check_connection(&self) -> ConnectionStatus;

    async fn change_region(&self, region: &str) -> RegionChange;

    async fn current_region(&self) -> String;
}

/// Raw queue operations the in-process provider is built on.
#[async_trait::async_trait]
pub trait QueueBackend: Send + Sync {
    async fn list_queue_urls(&self) -> anyhow::Result<Vec<String>>;
    async fn queue_attributes(
        &self,
        queue_url: &str,
        names: &[&str],
    ) -> anyhow::Result<std::collections::BTreeMap<String, String>>;
    async fn purge_queue(&self, queue_url: &str) -> anyhow::Result<()>;
    async fn delete_queue(&self, queue_url: &str) -> anyhow::Result<()>;
    async fn region(&self) -> String;
    async fn set_region(&self, region: &str) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
impl QueueBackend for qdeck_sqshub::SqsHub {
    async fn list_queue_urls(&self) -> anyhow::Result<Vec<String>> {
        qdeck_sqshub::SqsHub::list_queue_urls(self).await
    }
    async fn queue_attributes(
        &self,
        queue_url: &str,
        names: &[&str],
    ) -> anyhow::Result<std::collections::BTreeMap<String, String>> {
        qdeck_sqshub::SqsHub::queue_attributes(self, queue_url, names).await
    }
    async fn purge_queue(&self, queue_url: &str) -> anyhow::Result<()> {
        qdeck_sqshub::SqsHub::purge_queue(self, queue_url).await
    }
    async fn delete_queue(&self, queue_url: &str) -> anyhow::Result<()> {
        qdeck_sqshub::SqsHub::delete_queue(self, queue_url).await
    }
    async fn region(&self) -> String {
        qdeck_sqshub::SqsHub::region(self).await
    }
    async fn set_region(&self, region: &str) -> anyhow::Result<()> {
        qdeck_sqshub::SqsHub::set_region(self, region).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_recognised_by_message() {
        assert!(ActionResult::cancelled(PURGE_CANCELLED).is_cancellation());
        assert!(ActionResult::cancelled(DELETE_CANCELLED).is_cancellation());
        assert!(!ActionResult::failed("AccessDenied").is_cancellation());
        let odd = ActionResult { success: true, message: PURGE_CANCELLED.into(), errors: vec![] };
        assert!(!odd.is_cancellation());
    }

    #[test]
    fn classify_follows_the_typed_failure() {
        let nf: anyhow::Error =
            SqsFailure::new(FailureKind::NotFound, Some("QueueDoesNotExist"), "the queue is gone").into();
        assert!(matches!(QdeckError::classify(&nf), QdeckError::NotFound(_)));
        let conn = anyhow::Error::new(SqsFailure::new(FailureKind::Connection, None, "dispatch failure"))
            .context("listing queues");
        let e = QdeckError::classify(&conn);
        assert!(matches!(e, QdeckError::Connection(_)));
        assert!(e.message().starts_with("listing queues"));
        // wording alone no longer decides the category
        let worded = anyhow::anyhow!("AccessDenied: connection refused");
        assert!(matches!(QdeckError::classify(&worded), QdeckError::Internal(_)));
        let region = qdeck_sqshub::validate_region("nope").unwrap_err();
        assert!(matches!(QdeckError::classify(&region), QdeckError::Validation(_)));
    }

    #[test]
    fn action_result_json_shape() {
        let r = ActionResult::ok("Purged 2 of 3 queues").with_errors(vec!["b: boom".into()]);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["errors"][0], "b: boom");
        let plain = serde_json::to_value(ActionResult::ok("x")).unwrap();
        assert!(plain.get("errors").is_none());
    }

    #[test]
    fn prompts_name_the_queue() {
        assert!(ConfirmPrompt::purge("orders").detail.contains("orders"));
        assert!(ConfirmPrompt::delete("orders").message.contains("\"orders\""));
        assert!(ConfirmPrompt::purge_all(4).message.contains("4 queues"));
    }
}
