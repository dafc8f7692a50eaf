use std::str::FromStr;
use std::sync::Arc;

use qdeck_api::QueueService;
use qdeck_persist::{MemoryStore, PrefStore, SqliteStore};
use qdeck_sqshub::{SqsConfig, SqsHub};
use tracing::{error, warn};

fn init_tracing() {
    let env = std::env::var("QDECK_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn open_prefs() -> Arc<dyn PrefStore> {
    match SqliteStore::open_default() {
        Ok(s) => Arc::new(s),
        Err(e) => {
            warn!(error = %format!("{:#}", e), "prefs: falling back to in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    init_tracing();
    let hub = match SqsHub::connect(SqsConfig::from_env()).await {
        Ok(h) => Arc::new(h),
        Err(e) => {
            error!(error = %format!("{:#}", e), "sqs client setup failed");
            eprintln!("qdeck: {:#}", e);
            std::process::exit(1);
        }
    };
    let (tx, rx) = qdeck_gui::updates_channel();
    let confirm = Arc::new(qdeck_gui::UiConfirm::new(tx.clone()));
    let provider = Arc::new(QueueService::new(hub, confirm));
    if let Err(e) = qdeck_gui::run_native(provider, open_prefs(), (tx, rx), qdeck_gui::DashboardConfig::from_env()) {
        eprintln!("GUI error: {}", e);
        std::process::exit(1);
    }
}
