//! GraphQL diagnostics demo service.
//!
//! Boots a GraphQL endpoint with a single `test` field and logs each
//! request's lifecycle through a diagnostic listener.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request       ┌──────────────────────────────────────────────┐
//!     ─────────────────────┼─▶ http::server ──▶ graphql::executor ──┐    │
//!                          │   (request id,      (request scope)     │    │
//!                          │    trace, limits)                       ▼    │
//!                          │                              async-graphql   │
//!                          │                                Schema        │
//!                          │   diagnostics ◀── parse / validate hooks     │
//!                          │   (timing observer → tracing + metrics)      │
//!     Client Response      │                                              │
//!     ◀────────────────────┼── GraphQL JSON + x-request-id                │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use graphql_diag::config::{load_config, validate_config, ConfigError, ServiceConfig};
use graphql_diag::http::HttpServer;
use graphql_diag::lifecycle::{signals, Shutdown};
use graphql_diag::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "graphql-diag")]
#[command(about = "GraphQL endpoint with request timing diagnostics", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

fn resolve_config(cli: &Cli) -> Result<ServiceConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init_logging(&config.observability)?;

    tracing::info!("graphql-diag v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        graphql_path = %config.graphql.path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let _signal_task = signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
