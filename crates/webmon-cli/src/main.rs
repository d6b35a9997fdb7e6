mod config;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{fmt, EnvFilter};

use webmon_core::{ConfigError, CycleResult, HttpFetcher, Monitor, MonitorConfig, SnapshotStore};

use crate::config::{AppConfig, DEFAULT_CONFIG_PATH};

fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");

    if GIT_HASH.is_empty() {
        VERSION
    } else {
        // called once; lives for the program's lifetime
        Box::leak(format!("{VERSION} ({GIT_HASH})").into_boxed_str())
    }
}

/// Website monitor: probe HTTP endpoints on a schedule and serve their status.
#[derive(Parser)]
#[command(name = "web-monitor", version = version_string(), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe sites on a schedule and serve the status page.
    Serve {
        /// Check interval in seconds. Overrides the config file.
        #[arg(short = 'c', long = "interval")]
        interval: Option<u64>,

        /// Path to TOML config file.
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Listen address (e.g. 127.0.0.1:8080). Overrides config file.
        #[arg(short, long)]
        listen: Option<SocketAddr>,
    },
    /// Probe every site once, print the results and exit.
    Check {
        /// Path to TOML config file.
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            interval,
            config,
            listen,
        } => {
            run_serve(&config, interval, listen).await;
        }
        Commands::Check { config } => {
            let code = run_check(&config).await;
            std::process::exit(code);
        }
    }
}

fn load_app_config(path: &Path) -> AppConfig {
    match AppConfig::load(path) {
        Ok(c) => c,
        Err(e) => {
            init_tracing("pretty", "info");
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Validate the monitoring section and apply the interval override.
/// Exits the process on any configuration error.
fn build_monitor_config(app_config: &AppConfig, interval_override: Option<u64>) -> MonitorConfig {
    let result = MonitorConfig::from_raw(app_config.monitor.clone())
        .and_then(|c| match interval_override {
            Some(secs) => c.with_interval_override(secs),
            None => Ok(c),
        });

    match result {
        Ok(c) => c,
        Err(ConfigError::Invalid(violations)) => {
            for v in &violations {
                tracing::error!("[CONFIG] {}", v);
            }
            tracing::error!(count = violations.len(), "Configuration is invalid, not starting");
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!("[CONFIG] {}", e);
            std::process::exit(1);
        }
    }
}

fn build_fetcher(config: &MonitorConfig) -> Arc<HttpFetcher> {
    match HttpFetcher::from_config(config) {
        Ok(f) => Arc::new(f),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            std::process::exit(1);
        }
    }
}

async fn run_serve(config_path: &Path, interval: Option<u64>, listen_override: Option<SocketAddr>) {
    let app_config = load_app_config(config_path);
    init_tracing(&app_config.server.log_format, "info");
    tracing::info!(path = %config_path.display(), "Loaded config file");

    let monitor_config = build_monitor_config(&app_config, interval);
    tracing::debug!(?monitor_config, "Effective monitor config");

    let listen = listen_override.unwrap_or(app_config.server.listen);
    let fetcher = build_fetcher(&monitor_config);
    let snapshots = SnapshotStore::new();
    let monitor = Arc::new(Monitor::new(monitor_config, fetcher, snapshots.clone()));

    if let Err(e) = monitor.start().await {
        tracing::error!(error = %e, "Failed to start monitor");
        std::process::exit(1);
    }

    let state = webmon_api::state::AppState::new(snapshots).with_monitor(Arc::clone(&monitor));

    tracing::info!(%listen, "Starting web monitor");
    if let Err(e) =
        webmon_api::serve_with_state(listen, state, webmon_api::shutdown_signal()).await
    {
        tracing::error!(error = %e, "Server failed");
        monitor.stop().await;
        std::process::exit(1);
    }

    tracing::info!("Shutdown signal received, stopping monitor...");
    if tokio::time::timeout(Duration::from_secs(5), monitor.stop())
        .await
        .is_err()
    {
        tracing::warn!("In-flight probe cycle did not finish in time");
    }
    tracing::info!("Shutdown complete");
}

async fn run_check(config_path: &Path) -> i32 {
    let app_config = load_app_config(config_path);
    init_tracing(&app_config.server.log_format, "warn");

    let monitor_config = build_monitor_config(&app_config, None);
    let site_count = monitor_config.sites.len();
    let fetcher = build_fetcher(&monitor_config);
    let monitor = Monitor::new(monitor_config, fetcher, SnapshotStore::new());

    let spinner = ProgressBar::new_spinner().with_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Probing {} sites...", site_count));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let cycle = monitor.run_once().await;
    spinner.finish_and_clear();

    print_cycle(&cycle);

    if cycle.results.iter().all(|r| r.is_healthy()) {
        0
    } else {
        1
    }
}

fn print_cycle(cycle: &CycleResult) {
    println!(
        "{} {}",
        style("web-monitor").bold(),
        style(cycle.timestamp.format("%Y-%m-%d %H:%M:%S UTC")).dim()
    );
    println!();

    if cycle.is_empty() {
        println!("  {}", style("No sites configured.").dim());
        return;
    }

    for r in cycle.sorted_results() {
        let status = if !r.up {
            style(format!("{:<6}", "DOWN")).red().bold()
        } else if r.matched == Some(true) {
            style(format!("{:<6}", "UP")).green().bold()
        } else {
            style(format!("{:<6}", "NOMATCH")).yellow().bold()
        };
        let detail = match (r.code, r.elapsed, r.error) {
            (Some(code), Some(elapsed), _) => format!("{} in {:.3}s", code, elapsed),
            (_, _, Some(kind)) => kind.to_string(),
            _ => String::new(),
        };
        println!(
            "  {} {:<20} {}  {}",
            status,
            r.site.id,
            style(&r.site.url).dim(),
            detail
        );
    }

    println!();
    println!(
        "  {} up, {} matching, {} sites",
        cycle.up_count(),
        cycle.matched_count(),
        cycle.len()
    );
}

fn init_tracing(log_format: &str, default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_format {
        "json" => {
            fmt().with_env_filter(filter).json().init();
        }
        _ => {
            fmt().with_env_filter(filter).init();
        }
    }
}
