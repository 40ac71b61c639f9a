//! Scoring server (v1)
//!
//! Serves a single handler over HTTP and bounds every invocation to a
//! configured wall-clock budget.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────────────┐
//!                      │                   SCORING SERVER                      │
//!                      │                                                       │
//!   POST /score        │  ┌─────────┐   ┌──────────────┐   ┌────────────────┐  │
//!  ────────────────────┼─▶│  http   │──▶│ orchestrator │──▶│   supervisor   │  │
//!                      │  │ server  │   │ hooks/telem. │   │ deadline race  │  │
//!                      │  └─────────┘   └──────┬───────┘   └───────┬────────┘  │
//!                      │                       │                   │           │
//!                      │                       │                   ▼           │
//!                      │                       │           ┌────────────────┐  │
//!                      │                       │           │    handler     │  │
//!                      │                       │           │ (blocking pool)│  │
//!                      │                       ▼           └────────────────┘  │
//!   Response           │  ┌─────────┐   ┌──────────────┐                       │
//!  ◀───────────────────┼──│contract │◀──│ shaper/error │                       │
//!                      │  └─────────┘   └──────────────┘                       │
//!                      │                                                       │
//!                      │   config · observability · lifecycle                  │
//!                      └───────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use scoring_server::config::{check_config, load_config, ServerConfig};
use scoring_server::lifecycle::wait_for_signal;
use scoring_server::observability::{logging, metrics};
use scoring_server::scoring::EchoHandler;
use scoring_server::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "scoring-server")]
#[command(about = "Serve a scoring handler with a bounded wall-clock budget", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    let config = check_config(config)?;

    logging::init_logging(&config.observability);

    tracing::info!("scoring-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        timeout_ms = config.scoring.timeout_ms,
        request_param_name = %config.scoring.request_param_name,
        support_request_headers = config.scoring.support_request_headers,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        on_signal.trigger();
    });

    let server = HttpServer::new(config, Arc::new(EchoHandler));
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
