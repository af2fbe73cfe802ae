//! # Gateway Entry Point
//!
//! Loads configuration, wires the classifier, router, activity log and notifier into the
//! pipeline, and serves the gateway HTTP interface until Ctrl-C.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use relay::application::activity::ActivityLog;
use relay::application::pipeline::Pipeline;
use relay::application::router::FailoverRouter;
use relay::domain::config::{AppConfig, DEFAULT_CONFIG_PATH};
use relay::infrastructure::classifier::LlmClassifier;
use relay::infrastructure::llm::Client as LlmClient;
use relay::infrastructure::{logging, notifier};
use relay::interface::gateway::{self, GatewayState};
use relay::strings::logs;

#[derive(Parser, Debug)]
#[command(name = "relay", version, about = "SMS-to-editor command gateway")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Configuration
    let config = AppConfig::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config))?;

    // 2. Logging
    let _guard = logging::init(&config.logging, "relay.log")?;
    tracing::info!("{}", logs::config_loaded(&args.config));

    // 3. Collaborators
    let llm = LlmClient::from_config(&config.classifier).context("Failed to build classifier client")?;
    tracing::info!("{}", logs::classifier_ready(llm.provider().as_str(), llm.model()));
    let classifier = Arc::new(LlmClassifier::new(Arc::new(llm)));

    let router = FailoverRouter::from_config(&config)?;
    for backend in router.backends() {
        tracing::info!("{}", logs::backend_configured(backend.label(), &backend.address, backend.priority));
    }

    let activity = Arc::new(ActivityLog::new(config.activity.capacity));
    let notifier = notifier::from_config(&config.notifier)?;

    let pipeline = Pipeline::new(classifier, router, activity, notifier);
    let state = Arc::new(GatewayState {
        pipeline,
        own_number: config.notifier.own_number(),
    });

    // 4. Serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("{}", logs::listening("Gateway", &addr));

    axum::serve(listener, gateway::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Gateway server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("{}", logs::shutdown_fail(&e.to_string()));
        return;
    }
    tracing::info!("{}", logs::SHUTDOWN);
}
