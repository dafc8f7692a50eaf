//! qdeck sqshub: SQS client wiring against a local emulator endpoint.
//!
//! Holds one client per active region; switching region rebuilds the client.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use aws_sdk_sqs::config::{Credentials, Region};
use aws_sdk_sqs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_sqs::types::QueueAttributeName;
use aws_sdk_sqs::Client;
use metrics::{counter, histogram};
use tokio::sync::RwLock;
use tracing::{debug, info};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:4566";
pub const DEFAULT_REGION: &str = "us-west-2";

/// Endpoint and credentials for the emulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqsConfig {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

impl Default for SqsConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            region: DEFAULT_REGION.to_string(),
            access_key: "test".to_string(),
            secret_key: "test".to_string(),
        }
    }
}

impl SqsConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            endpoint: env_or("QDECK_ENDPOINT", d.endpoint),
            region: env_or("QDECK_REGION", d.region),
            access_key: env_or("QDECK_ACCESS_KEY", d.access_key),
            secret_key: env_or("QDECK_SECRET_KEY", d.secret_key),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty()).unwrap_or(default)
}

/// Broad failure category, decided while the SDK error is still typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Endpoint unreachable or timed out.
    Connection,
    NotFound,
    Permission,
    Validation,
    /// Any other service or protocol error.
    Service,
}

/// A failed SQS call. Travels inside `anyhow::Error`; callers downcast it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SqsFailure {
    pub kind: FailureKind,
    pub code: Option<String>,
    pub message: String,
}

impl SqsFailure {
    pub fn new(kind: FailureKind, code: Option<&str>, message: impl Into<String>) -> Self {
        Self { kind, code: code.map(str::to_string), message: message.into() }
    }

    pub fn from_sdk<E, R>(err: &SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        let (kind, code) = match err {
            SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => (FailureKind::Connection, None),
            SdkError::ServiceError(ctx) => {
                let code = ctx.err().code();
                (kind_for_code(code), code)
            }
            SdkError::ConstructionFailure(_) => (FailureKind::Validation, None),
            _ => (FailureKind::Service, None),
        };
        Self::new(kind, code, DisplayErrorContext(err).to_string())
    }
}

/// Category for an SQS service error code.
pub fn kind_for_code(code: Option<&str>) -> FailureKind {
    match code {
        Some("AWS.SimpleQueueService.NonExistentQueue" | "QueueDoesNotExist") => FailureKind::NotFound,
        Some(
            "AccessDenied" | "AccessDeniedException" | "InvalidClientTokenId" | "InvalidSecurity"
            | "UnrecognizedClientException",
        ) => FailureKind::Permission,
        Some("InvalidParameterValue" | "InvalidAddress" | "InvalidAttributeName" | "MissingParameter") => {
            FailureKind::Validation
        }
        _ => FailureKind::Service,
    }
}

/// Region names look like `us-west-2`: lowercase letters, digits and dashes.
pub fn validate_region(region: &str) -> Result<()> {
    let ok = !region.is_empty()
        && region.contains('-')
        && region.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !region.starts_with('-')
        && !region.ends_with('-');
    if ok {
        Ok(())
    } else {
        Err(SqsFailure::new(FailureKind::Validation, None, format!("invalid region: {:?}", region)).into())
    }
}

async fn build_client(cfg: &SqsConfig) -> Client {
    let shared = aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(cfg.endpoint.clone())
        .credentials_provider(Credentials::new(
            cfg.access_key.clone(),
            cfg.secret_key.clone(),
            None,
            None,
            "qdeck",
        ))
        .region(Region::new(cfg.region.clone()))
        .load()
        .await;
    Client::new(&shared)
}

struct HubState {
    cfg: SqsConfig,
    client: Client,
}

/// SQS access for a single active region.
pub struct SqsHub {
    state: RwLock<HubState>,
}

impl SqsHub {
    pub async fn connect(cfg: SqsConfig) -> Result<Self> {
        validate_region(&cfg.region)?;
        let client = build_client(&cfg).await;
        info!(endpoint = %cfg.endpoint, region = %cfg.region, "sqshub: client ready");
        Ok(Self { state: RwLock::new(HubState { cfg, client }) })
    }

    pub async fn region(&self) -> String {
        self.state.read().await.cfg.region.clone()
    }

    pub async fn endpoint(&self) -> String {
        self.state.read().await.cfg.endpoint.clone()
    }

    /// Rebuild the client for `region`. The previous client stays active on error.
    pub async fn set_region(&self, region: &str) -> Result<()> {
        validate_region(region)?;
        let cfg = self.state.read().await.cfg.clone().with_region(region);
        let client = build_client(&cfg).await;
        let mut st = self.state.write().await;
        st.cfg = cfg;
        st.client = client;
        info!(region = %region, "sqshub: region switched");
        Ok(())
    }

    async fn client(&self) -> Client {
        // Client is a cheap Arc handle
        self.state.read().await.client.clone()
    }

    /// All queue URLs, following pagination.
    pub async fn list_queue_urls(&self) -> Result<Vec<String>> {
        let t0 = Instant::now();
        let client = self.client().await;
        let mut urls = Vec::new();
        let mut next: Option<String> = None;
        loop {
            let mut req = client.list_queues().max_results(1000);
            if let Some(tok) = next.take() {
                req = req.next_token(tok);
            }
            let out = req
                .send()
                .await
                .map_err(|e| SqsFailure::from_sdk(&e))
                .context("listing queues")?;
            urls.extend(out.queue_urls().iter().cloned());
            match out.next_token() {
                Some(tok) if !tok.is_empty() => next = Some(tok.to_string()),
                _ => break,
            }
        }
        histogram!("qdeck_list_urls_ms", t0.elapsed().as_secs_f64() * 1000.0);
        debug!(count = urls.len(), took_ms = %t0.elapsed().as_millis(), "sqshub: list urls");
        Ok(urls)
    }

    pub async fn queue_attributes(&self, queue_url: &str, names: &[&str]) -> Result<BTreeMap<String, String>> {
        let mut req = self.client().await.get_queue_attributes().queue_url(queue_url);
        for n in names {
            req = req.attribute_names(QueueAttributeName::from(*n));
        }
        let out = req
            .send()
            .await
            .map_err(|e| SqsFailure::from_sdk(&e))
            .with_context(|| format!("getting attributes for {}", queue_url))?;
        Ok(out
            .attributes()
            .map(|m| m.iter().map(|(k, v)| (k.as_str().to_string(), v.clone())).collect())
            .unwrap_or_default())
    }

    pub async fn purge_queue(&self, queue_url: &str) -> Result<()> {
        self.client()
            .await
            .purge_queue()
            .queue_url(queue_url)
            .send()
            .await
            .map_err(|e| SqsFailure::from_sdk(&e))
            .with_context(|| format!("purging {}", queue_url))?;
        counter!("qdeck_purge_total", 1u64);
        info!(queue_url = %queue_url, "sqshub: purged");
        Ok(())
    }

    pub async fn delete_queue(&self, queue_url: &str) -> Result<()> {
        self.client()
            .await
            .delete_queue()
            .queue_url(queue_url)
            .send()
            .await
            .map_err(|e| SqsFailure::from_sdk(&e))
            .with_context(|| format!("deleting {}", queue_url))?;
        counter!("qdeck_delete_total", 1u64);
        info!(queue_url = %queue_url, "sqshub: deleted");
        Ok(())
    }
}
