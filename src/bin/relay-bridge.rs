//! # Bridge Entry Point
//!
//! Runs on the desktop next to the editor. Serves `/execute` and `/health` for the
//! gateway's router and drives the editor through the configured automation driver.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use relay::application::collector::ResponseCollector;
use relay::application::executor::AutomationExecutor;
use relay::domain::config::{AppConfig, DEFAULT_CONFIG_PATH};
use relay::infrastructure::automation;
use relay::infrastructure::clipboard::ArboardClipboard;
use relay::infrastructure::logging;
use relay::interface::bridge::{self, BridgeState};
use relay::strings::logs;

#[derive(Parser, Debug)]
#[command(name = "relay-bridge", version, about = "Desktop automation backend for the relay")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config))?;
    let _guard = logging::init(&config.logging, "relay-bridge.log")?;
    tracing::info!("{}", logs::config_loaded(&args.config));

    let driver = automation::driver_name(&config.bridge);
    let target = automation::target_from_config(&config.bridge)
        .with_context(|| format!("Failed to start the {driver} driver"))?;
    tracing::info!("{}", logs::driver_selected(driver));

    let collector = ResponseCollector::new(
        target.clone(),
        Arc::new(ArboardClipboard::new()),
        config.collector.clone(),
    );
    let executor = AutomationExecutor::new(target, collector, config.automation.clone())
        .context("Invalid automation settings")?;

    let state = Arc::new(BridgeState {
        executor: Arc::new(executor),
        driver,
    });

    let addr = format!("{}:{}", config.bridge.host, config.bridge.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("{}", logs::listening("Bridge", &addr));

    axum::serve(listener, bridge::router(state))
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("{}", logs::SHUTDOWN),
                Err(e) => tracing::error!("{}", logs::shutdown_fail(&e.to_string())),
            }
        })
        .await
        .context("Bridge server error")?;

    Ok(())
}
