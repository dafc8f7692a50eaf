//! In-process provider over a [`QueueBackend`].

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use metrics::{counter, histogram};
use qdeck_core::{queue_name_from_url, Queue, LISTED_ATTRIBUTES};
use tracing::{info, warn};

use crate::{
    ActionResult, Confirm, ConfirmPrompt, ConnectionStatus, QdeckError, QdeckResult, QueueBackend,
    QueueProvider, RegionChange, DELETE_CANCELLED, PURGE_ALL_CANCELLED, PURGE_CANCELLED,
};

pub struct QueueService {
    backend: Arc<dyn QueueBackend>,
    confirm: Arc<dyn Confirm>,
}

impl QueueService {
    pub fn new(backend: Arc<dyn QueueBackend>, confirm: Arc<dyn Confirm>) -> Self {
        Self { backend, confirm }
    }

    async fn attributes_for(&self, url: String) -> Queue {
        match self.backend.queue_attributes(&url, &LISTED_ATTRIBUTES).await {
            Ok(attrs) => Queue::new(url, attrs, Utc::now()),
            Err(e) => {
                counter!("qdeck_attr_errors_total", 1u64);
                warn!(queue_url = %url, error = %format!("{:#}", e), "attributes failed");
                Queue::with_error(url, format!("{:#}", e), Utc::now())
            }
        }
    }
}

#[async_trait::async_trait]
impl QueueProvider for QueueService {
    async fn list_queues(&self) -> QdeckResult<Vec<Queue>> {
        let t0 = Instant::now();
        counter!("qdeck_list_total", 1u64);
        let urls = self.backend.list_queue_urls().await.map_err(|e| QdeckError::classify(&e))?;
        // join_all keeps input order, so cards follow the listing order
        let queues = join_all(urls.into_iter().map(|u| self.attributes_for(u))).await;
        histogram!("qdeck_list_ms", t0.elapsed().as_secs_f64() * 1000.0);
        info!(count = queues.len(), took_ms = %t0.elapsed().as_millis(), "list queues");
        Ok(queues)
    }

    async fn purge_queue(&self, queue_url: &str) -> ActionResult {
        let name = queue_name_from_url(queue_url);
        if !self.confirm.confirm(ConfirmPrompt::purge(name)).await {
            return ActionResult::cancelled(PURGE_CANCELLED);
        }
        match self.backend.purge_queue(queue_url).await {
            Ok(()) => ActionResult::ok("Queue purged successfully"),
            Err(e) => {
                warn!(queue_url, error = %format!("{:#}", e), "purge failed");
                ActionResult::failed(QdeckError::classify(&e).message())
            }
        }
    }

    async fn delete_queue(&self, queue_url: &str) -> ActionResult {
        let name = queue_name_from_url(queue_url);
        if !self.confirm.confirm(ConfirmPrompt::delete(name)).await {
            return ActionResult::cancelled(DELETE_CANCELLED);
        }
        match self.backend.delete_queue(queue_url).await {
            Ok(()) => ActionResult::ok("Queue deleted successfully"),
            Err(e) => {
                warn!(queue_url, error = %format!("{:#}", e), "delete failed");
                ActionResult::failed(QdeckError::classify(&e).message())
            }
        }
    }

    async fn purge_all_queues(&self) -> ActionResult {
        let urls = match self.backend.list_queue_urls().await {
            Ok(u) => u,
            Err(e) => return ActionResult::failed(QdeckError::classify(&e).message()),
        };
        if urls.is_empty() {
            return ActionResult::ok("No queues to purge");
        }
        if !self.confirm.confirm(ConfirmPrompt::purge_all(urls.len())).await {
            return ActionResult::cancelled(PURGE_ALL_CANCELLED);
        }
        let outcomes = join_all(urls.iter().map(|u| async move {
            (u.as_str(), self.backend.purge_queue(u).await)
        }))
        .await;
        let total = outcomes.len();
        let errors: Vec<String> = outcomes
            .into_iter()
            .filter_map(|(url, r)| {
                r.err().map(|e| format!("{}: {}", queue_name_from_url(url), QdeckError::classify(&e).message()))
            })
            .collect();
        let purged = total - errors.len();
        info!(purged, total, "purge all");
        if errors.is_empty() {
            ActionResult::ok(format!("Purged {} queues", total))
        } else if purged == 0 {
            ActionResult::failed("Failed to purge all queues").with_errors(errors)
        } else {
            ActionResult::ok(format!("Purged {} of {} queues", purged, total)).with_errors(errors)
        }
    }

    async fn check_connection(&self) -> ConnectionStatus {
        let region = self.backend.region().await;
        match self.backend.list_queue_urls().await {
            Ok(_) => ConnectionStatus { connected: true, error: None, region },
            Err(e) => ConnectionStatus {
                connected: false,
                error: Some(QdeckError::classify(&e).message().to_string()),
                region,
            },
        }
    }

    async fn change_region(&self, region: &str) -> RegionChange {
        match self.backend.set_region(region).await {
            Ok(()) => RegionChange { success: true, region: self.backend.region().await, error: None },
            Err(e) => RegionChange {
                success: false,
                region: self.backend.region().await,
                error: Some(format!("{:#}", e)),
            },
        }
    }

    async fn current_region(&self) -> String {
        self.backend.region().await
    }
}
