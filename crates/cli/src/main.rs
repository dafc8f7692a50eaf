use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use qdeck_api::{ActionResult, AutoConfirm, Confirm, QueueProvider, QueueService};
use qdeck_core::format::{retention_text, updated_text, visibility_timeout_text};
use qdeck_core::{filter_queues, queue_name_from_url, regions_from_env, Queue, QueueStats};
use qdeck_sqshub::{SqsConfig, SqsHub};
use serde::Serialize;
use tokio::signal;
use tracing::{info, warn};

mod confirm;

#[derive(Parser, Debug)]
#[command(name = "qdeckctl", version, about = "qdeck CLI: inspect and manage queues on a local emulator")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Emulator endpoint
    #[arg(long, global = true, env = "QDECK_ENDPOINT")]
    endpoint: Option<String>,

    /// Region to operate in
    #[arg(long, global = true, env = "QDECK_REGION")]
    region: Option<String>,

    /// Answer yes to confirmation prompts
    #[arg(short = 'y', long = "yes", global = true, action = ArgAction::SetTrue)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// List queues with depth metrics
    Ls {
        /// Case-insensitive substring of the queue name
        #[arg(long)]
        search: Option<String>,
        /// Skip queues with no messages
        #[arg(long = "hide-empty", action = ArgAction::SetTrue)]
        hide_empty: bool,
    },
    /// Check the emulator connection
    Check,
    /// List selectable regions
    Regions,
    /// Purge all messages from a queue (name or URL)
    Purge { queue: String },
    /// Delete a queue (name or URL)
    Delete { queue: String },
    /// Purge every queue in the region
    PurgeAll,
    /// Poll and print queues until interrupted
    Watch {
        #[arg(long = "interval-ms", default_value_t = 5000)]
        interval_ms: u64,
        #[arg(long)]
        search: Option<String>,
        #[arg(long = "hide-empty", action = ArgAction::SetTrue)]
        hide_empty: bool,
    },
}

fn init_tracing() {
    let env = std::env::var("QDECK_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("QDECK_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid QDECK_METRICS_ADDR; expected host:port");
        }
    }
}

#[derive(Serialize)]
struct QueueRow<'a> {
    name: &'a str,
    url: &'a str,
    visible: u64,
    hidden: u64,
    delayed: u64,
    total: u64,
    visibility_timeout: String,
    retention: String,
    last_updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a> QueueRow<'a> {
    fn new(q: &'a Queue) -> Self {
        let m = q.metrics();
        Self {
            name: &q.name,
            url: &q.url,
            visible: m.visible,
            hidden: m.hidden,
            delayed: m.delayed,
            total: m.total(),
            visibility_timeout: visibility_timeout_text(q),
            retention: retention_text(q),
            last_updated: q.last_updated.to_rfc3339(),
            error: q.error.as_deref(),
        }
    }
}

fn print_queues(all: &[Queue], term: &str, hide_empty: bool, output: Output) -> Result<()> {
    let shown = filter_queues(all, term, hide_empty);
    let stats = QueueStats::compute(&shown, all.len());
    match output {
        Output::Human => {
            println!("{:<32} {:>8} {:>8} {:>8} {:>8}  {:<8} RETENTION", "NAME", "VISIBLE", "HIDDEN", "DELAYED", "TOTAL", "VIS-TO");
            for q in &shown {
                let r = QueueRow::new(q);
                println!(
                    "{:<32} {:>8} {:>8} {:>8} {:>8}  {:<8} {}",
                    r.name, r.visible, r.hidden, r.delayed, r.total, r.visibility_timeout, r.retention
                );
                if let Some(e) = r.error {
                    println!("  ! {}", e);
                }
            }
            println!(
                "queues: {}  messages: {}  hidden: {}  delayed: {}",
                stats.queue_display(),
                stats.messages,
                stats.hidden,
                stats.delayed
            );
        }
        Output::Json => {
            let rows: Vec<QueueRow> = shown.iter().map(QueueRow::new).collect();
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "queues": rows, "stats": stats }))?);
        }
    }
    Ok(())
}

/// Print an action result; genuine failures become the process error.
fn finish_action(result: ActionResult, output: Output) -> Result<()> {
    match output {
        Output::Human => {
            println!("{}", result.message);
            for e in &result.errors {
                println!("  ! {}", e);
            }
        }
        Output::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    if !result.success && !result.is_cancellation() {
        return Err(anyhow!("{}", result.message));
    }
    Ok(())
}

/// Accept a queue URL as is, or look a bare name up in the current region.
async fn resolve_queue(hub: &SqsHub, queue: &str) -> Result<String> {
    if queue.contains("://") {
        return Ok(queue.to_string());
    }
    let urls = hub.list_queue_urls().await?;
    match urls.into_iter().find(|u| queue_name_from_url(u) == queue) {
        Some(u) => Ok(u),
        None => bail!("no queue named {:?} in region {}", queue, hub.region().await),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();

    let mut cfg = SqsConfig::from_env();
    if let Some(ep) = cli.endpoint.clone() {
        cfg.endpoint = ep;
    }
    if let Some(r) = cli.region.clone() {
        cfg = cfg.with_region(r);
    }
    let hub = Arc::new(SqsHub::connect(cfg).await?);
    let confirm: Arc<dyn Confirm> = if cli.yes { Arc::new(AutoConfirm::yes()) } else { Arc::new(confirm::TtyConfirm) };
    let provider = QueueService::new(hub.clone(), confirm);

    match cli.command {
        Commands::Ls { search, hide_empty } => {
            info!(search = ?search, hide_empty, "ls invoked");
            let queues = provider.list_queues().await.map_err(|e| anyhow!("{}", e))?;
            print_queues(&queues, search.as_deref().unwrap_or(""), hide_empty, cli.output)?;
        }
        Commands::Check => {
            let st = provider.check_connection().await;
            match cli.output {
                Output::Human => {
                    if st.connected {
                        println!("Connected to LocalStack ({})", st.region);
                    } else {
                        println!("Disconnected: {}", st.error.as_deref().unwrap_or("unknown error"));
                    }
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&st)?),
            }
            if !st.connected {
                bail!("not connected to {}", hub.endpoint().await);
            }
        }
        Commands::Regions => {
            let current = provider.current_region().await;
            let mut regions = regions_from_env();
            if !regions.iter().any(|r| *r == current) {
                regions.push(current.clone());
            }
            match cli.output {
                Output::Human => {
                    for r in &regions {
                        println!("{} {}", if *r == current { "*" } else { " " }, r);
                    }
                }
                Output::Json => {
                    println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "current": current, "regions": regions }))?)
                }
            }
        }
        Commands::Purge { queue } => {
            let url = resolve_queue(&hub, &queue).await?;
            info!(queue_url = %url, "purge invoked");
            finish_action(provider.purge_queue(&url).await, cli.output)?;
        }
        Commands::Delete { queue } => {
            let url = resolve_queue(&hub, &queue).await?;
            info!(queue_url = %url, "delete invoked");
            finish_action(provider.delete_queue(&url).await, cli.output)?;
        }
        Commands::PurgeAll => {
            finish_action(provider.purge_all_queues().await, cli.output)?;
        }
        Commands::Watch { interval_ms, search, hide_empty } => {
            let period = Duration::from_millis(interval_ms.max(250));
            info!(interval_ms = %period.as_millis(), "watch invoked");
            let term = search.unwrap_or_default();
            let mut iv = tokio::time::interval(period);
            // a slow listing delays the next poll instead of stacking polls
            iv.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = iv.tick() => {
                        match provider.list_queues().await {
                            Ok(queues) => {
                                if cli.output == Output::Human {
                                    println!("--- {} ---", updated_text(chrono::Utc::now()));
                                }
                                print_queues(&queues, &term, hide_empty, cli.output)?;
                            }
                            Err(e) => {
                                warn!(error = %e, "watch: poll failed");
                                eprintln!("poll failed: {}", e.message());
                            }
                        }
                    }
                    _ = signal::ctrl_c() => {
                        info!("watch: interrupted");
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}
