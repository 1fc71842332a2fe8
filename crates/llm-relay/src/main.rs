use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use llm_relay::config::Config;
use llm_relay::llm::{Credentials, ModelRegistry, ProviderRegistry};
use llm_relay::router::ChatRouter;
use llm_relay::server::{AppState, build_app};

/// Relay chat conversations to OpenAI and Anthropic behind one endpoint.
#[derive(Debug, Parser)]
#[command(name = "llm-relay", version, about)]
struct Cli {
    /// Path to the YAML config file. A missing file means defaults.
    #[arg(short, long, default_value = "relay.yaml")]
    config: PathBuf,

    /// Override `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Override `server.port`.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "Loaded environment from .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Failed to load .env"),
    }

    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)
        .await
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let models = ModelRegistry::reference().extend(config.model_entries());
    let providers = ProviderRegistry::from_config(&config.providers, &Credentials::from_env());
    info!(models = models.len(), "Model registry ready");

    let state = AppState {
        router: ChatRouter::new(models, providers),
    };
    let app = build_app(
        state,
        &config.server.static_dir,
        Duration::from_secs(config.server.request_timeout_seconds),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutting down");
}
