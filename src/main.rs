//! Main entry point for the Clash Compare voting service
//!
//! Loads configuration, seeds the item store, and serves the voting API and
//! health endpoints until SIGINT/SIGTERM.

use anyhow::Result;
use clap::Parser;
use clash_compare::api::{HttpServer, HttpServerConfig};
use clash_compare::config::AppConfig;
use clash_compare::service::{AppState, HealthCheck, HealthStatus};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::time::Duration;
use tracing::{error, info, warn};

/// Clash Compare - pairwise voting and Elo rankings for cards and emotes
#[derive(Parser)]
#[command(
    name = "clash-compare",
    version,
    about = "Pairwise voting service ranking Clash Royale cards and emotes with Elo",
    long_about = "Clash Compare shows voters two cards or emotes at a time, records which one \
                 they prefer (or a draw), and keeps an Elo rating per item. Ratings feed \
                 per-category leaderboards with S+ to F tiers."
)]
struct Args {
    /// TOML configuration; environment variables are used when absent
    #[arg(short, long, value_name = "FILE", help = "TOML config file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Seed the store, report item counts and exit non-zero unless healthy")]
    health_check: bool,

    #[arg(short, long, value_name = "LEVEL", help = "Log filter, e.g. info or clash_compare=debug")]
    log_level: Option<String>,

    #[arg(long, value_name = "PORT", help = "Port for the vote API and health endpoints")]
    http_port: Option<u16>,

    #[arg(long, value_name = "FILE", help = "JSON catalog of cards and emotes to load")]
    seed_file: Option<PathBuf>,

    /// Shorthand for `--log-level debug`
    #[arg(short, long)]
    debug: bool,

    /// Validate the merged configuration, print the banner and exit
    #[arg(long)]
    dry_run: bool,
}

/// Install the global tracing subscriber; `RUST_LOG` wins over `log_level`
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("tracing subscriber already set: {}", e))?;

    Ok(())
}

/// One-shot `--health-check`: exits 0 only when every component is healthy
async fn perform_health_check(config: AppConfig) -> Result<()> {
    info!("Running one-shot health check");

    let app_state = Arc::new(AppState::new(config).await?);
    app_state.start().await?;

    match HealthCheck::check(app_state.clone()).await {
        Ok(health) => {
            println!("Health Check: {}", health.status);
            println!("  Cards: {}", health.stats.cards);
            println!("  Emotes: {}", health.stats.emotes);
            println!("  Votes recorded: {}", health.stats.votes_recorded);
            for check in &health.checks {
                if let Some(message) = &check.message {
                    println!("  {}: {}", check.name, message);
                }
            }

            app_state.shutdown().await?;
            if health.status == HealthStatus::Healthy {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("Could not evaluate service health: {}", e);
            std::process::exit(1);
        }
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Caught Ctrl+C");
        },
        _ = terminate => {
            info!("Caught SIGTERM");
        },
    }
}

/// Refresh the health gauge every 30s while the service runs
async fn health_check_task(app_state: Arc<AppState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(30));

    while app_state.is_running().await {
        interval.tick().await;

        match HealthCheck::check(app_state.clone()).await {
            Ok(health) => {
                app_state.metrics().update_health_status(health.status.as_gauge());
                info!(
                    "Health check: {} - {} cards, {} emotes, {} votes recorded",
                    health.status,
                    health.stats.cards,
                    health.stats.emotes,
                    health.stats.votes_recorded
                );
            }
            Err(e) => {
                warn!("Periodic health check errored: {}", e);
            }
        }
    }
}

fn display_startup_banner(config: &AppConfig) {
    info!("🚀 Clash Compare Voting Service");
    info!("   Instance: {} (log filter {})", config.service.name, config.service.log_level);
    info!(
        "   HTTP: {}:{}",
        config.service.http_host, config.service.http_port
    );
    match &config.store.seed_file {
        Some(path) => info!("   Seed catalog: {}", path.display()),
        None => info!("   Seed catalog: none"),
    }
    info!("   Initial rating: {}", config.store.initial_rating);
    info!("   Settle delay: {}ms", config.voting.settle_delay_ms);
    info!("──────────────────────────────────────────────");
}

/// File or environment config, then CLI overrides, then validation
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(http_port) = args.http_port {
        config.service.http_port = http_port;
    }

    if let Some(seed_file) = &args.seed_file {
        config.store.seed_file = Some(seed_file.clone());
    }

    clash_compare::config::validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Logging setup failed: {}", e);
        std::process::exit(1);
    }

    if args.health_check {
        return perform_health_check(config).await;
    }

    if args.dry_run {
        display_startup_banner(&config);
        info!("Configuration is valid; dry run, not serving");
        return Ok(());
    }

    display_startup_banner(&config);

    info!("Seeding item store and building vote service");
    let app_state = match AppState::new(config.clone()).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app_state.start().await {
        error!("Could not start background tasks: {}", e);
        std::process::exit(1);
    }

    let server = Arc::new(HttpServer::new(
        HttpServerConfig::from_app_config(&config),
        app_state.clone(),
    ));
    let mut server_task = {
        let server = server.clone();
        tokio::spawn(async move { server.start().await })
    };

    let health_task = {
        let app_state = app_state.clone();
        tokio::spawn(async move {
            health_check_task(app_state).await;
        })
    };

    info!("✅ Clash Compare Voting Service is running");

    tokio::select! {
        _ = wait_for_shutdown_signal() => {
            info!("🛑 Stopping: draining HTTP connections");
        }
        result = &mut server_task => {
            match result {
                Ok(Ok(())) => warn!("HTTP server exited unexpectedly"),
                Ok(Err(e)) => error!("HTTP server failed: {}", e),
                Err(e) => error!("HTTP server task panicked: {}", e),
            }
            health_task.abort();
            app_state.shutdown().await?;
            std::process::exit(1);
        }
    }

    health_task.abort();
    server.stop();

    let shutdown = async {
        match (&mut server_task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("HTTP server stopped with error: {}", e),
            Err(e) => warn!("HTTP server task ended abnormally: {}", e),
        }
        app_state.shutdown().await
    };

    match tokio::time::timeout(config.shutdown_timeout(), shutdown).await {
        Ok(Ok(())) => info!("✅ Graceful shutdown completed successfully"),
        Ok(Err(e)) => warn!("Shutdown completed with errors: {}", e),
        Err(_) => warn!("⚠️  Shutdown timeout exceeded, forcing exit"),
    }

    info!("🛑 Clash Compare Voting Service stopped");
    Ok(())
}
