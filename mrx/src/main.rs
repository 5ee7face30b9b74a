use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use mrx::client::RestClient;
use mrx::collector::{CollectSettings, CollectionEngine};
use mrx::config::ExporterConfig;
use mrx::metrics::{ExporterMetrics, MetricsServer};
use mrx::r#loop::CollectLoop;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;

/// Prometheus exporter for the MySQL Router REST api
#[derive(Debug, Parser)]
#[command(name = "mrx", disable_version_flag = true)]
struct Args {
    /// Config file (yaml or toml), optional when configured
    /// entirely through MYSQLROUTER_EXPORTER_* variables
    #[arg(short, long, default_value = "mrx.yaml")]
    config: PathBuf,

    /// Show version and exit
    #[arg(short, long)]
    version: bool,
}

fn version() -> String {
    format!(
        "version: {} commit: {} date: {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("MRX_GIT_COMMIT").unwrap_or("unknown"),
        option_env!("MRX_BUILD_DATE").unwrap_or("unknown"),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if args.version {
        println!("{}", version());
        return Ok(());
    }

    env_logger::init();

    let config = ExporterConfig::load(&args.config)?;
    info!(
        "Config url={} service={} interval={:?} collect={:?}",
        config.url,
        config.service_name,
        config.collect_interval(),
        config.collect
    );

    let metrics = Arc::new(ExporterMetrics::new()?);
    let client = RestClient::new(&config).context("Failed to create MySQL Router client")?;

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.listen_port));
    let server = MetricsServer::start(metrics.clone(), addr).await?;

    let engine = CollectionEngine::new(
        Box::new(client),
        metrics,
        CollectSettings::from_config(&config),
    );
    let loop_handle = CollectLoop::new(engine, config.collect_interval())?.start();

    info!("Started mrx ({}) for {}", config.service_name, config.url);

    wait_for_signal().await?;
    info!("Beginning graceful shutdown...");

    loop_handle.stop();
    loop_handle.join().await?;
    info!("Collect loop stopped");

    server.shutdown(config.shutdown_timeout()).await;

    info!("Graceful shutdown complete");

    Ok(())
}

async fn wait_for_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = signal::ctrl_c() => res?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    signal::ctrl_c().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_config_path() {
        let args = Args::parse_from(["mrx", "--config", "/etc/mrx.toml"]);
        assert_eq!(args.config, PathBuf::from("/etc/mrx.toml"));
        assert!(!args.version);

        let args = Args::parse_from(["mrx", "-v"]);
        assert!(args.version);
    }

    #[test]
    fn version_names_package() {
        assert!(version().starts_with(&format!("version: {}", env!("CARGO_PKG_VERSION"))));
    }
}
