//! rdsmond — Prometheus exporter for RDS Enhanced Monitoring.
//!
//! Single binary that assembles the pipeline:
//! - Region set (configured or built-in)
//! - CloudWatch Logs source
//! - Descriptor registry + one-time discovery pass
//! - Scrape endpoint (collection pass per request)
//!
//! # Usage
//!
//! ```text
//! rdsmond --regions eu-west-1,us-east-1 --listen 0.0.0.0:9377
//! ```

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use rdsmon_core::MetricRegistry;
use rdsmon_exporter::{Exporter, ScrapeConfig, build_router};
use rdsmon_source::{CloudWatchLogsSource, StaticRegions};

use config::FileConfig;

#[derive(Parser)]
#[command(name = "rdsmond", about = "Prometheus exporter for RDS Enhanced Monitoring")]
struct Cli {
    /// Address to serve the scrape endpoint on.
    #[arg(long)]
    listen: Option<String>,

    /// Optional TOML config file; CLI flags take precedence over it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Regions to scan, comma-separated. Defaults to the built-in
    /// commercial region set.
    #[arg(long, value_delimiter = ',')]
    regions: Option<Vec<String>>,

    /// Metric namespace prefix.
    #[arg(long)]
    namespace: Option<String>,

    /// CloudWatch Logs group holding the per-instance metric streams.
    #[arg(long)]
    log_group: Option<String>,

    /// Deadline for one region's fetches during a pass, in seconds.
    #[arg(long)]
    region_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rdsmond=debug,rdsmon=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let file = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let settings = config::resolve(
        file,
        FileConfig {
            listen: cli.listen,
            namespace: cli.namespace,
            log_group: cli.log_group,
            regions: cli.regions,
            region_timeout_secs: cli.region_timeout_secs,
        },
    )?;

    info!(
        listen = %settings.listen,
        log_group = %settings.log_group,
        namespace = %settings.namespace,
        "rdsmond starting"
    );

    let registry = Arc::new(MetricRegistry::new(&settings.namespace, &settings.log_group));
    let regions = match settings.regions.clone() {
        Some(regions) => StaticRegions::new(regions),
        None => StaticRegions::default_set(),
    };
    let source = CloudWatchLogsSource::connect().await;
    info!("AWS client configuration loaded");

    let scrape =
        ScrapeConfig::new(&settings.log_group).with_region_timeout(settings.region_timeout);
    let exporter = Arc::new(Exporter::new(regions, source, registry, scrape));

    // One-time discovery establishes the initial descriptor set; later
    // scrapes self-register anything that appears afterwards.
    exporter.discover().await;

    let router = build_router(Arc::clone(&exporter));
    let listener = tokio::net::TcpListener::bind(settings.listen).await?;
    info!(addr = %settings.listen, "scrape endpoint listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
        })
        .await?;

    info!("rdsmond stopped");
    Ok(())
}
