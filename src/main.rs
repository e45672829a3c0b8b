//! gtr-relay: transload relay server.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                   GTR RELAY                      │
//!    Client request   │  ┌─────────┐   ┌──────────┐   ┌──────────────┐   │
//!   ──────────────────┼─▶│  http   │──▶│ routing  │──▶│  transload   │   │
//!                     │  │ server  │   │dispatcher│   │ relay engine │   │
//!                     │  └─────────┘   └──────────┘   └──┬────────┬──┘   │
//!                     │                                  │        │      │
//!                     │                  GET (Range) ◀───┘        └──▶ PUT (stream)
//!                     │                  source origin          destination blob
//!                     │                                                  │
//!                     │  config · security · observability · lifecycle   │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use gtr_relay::config::loader::load_config;
use gtr_relay::config::RelayConfig;
use gtr_relay::lifecycle::{signals, Shutdown};
use gtr_relay::observability::{logging, metrics};
use gtr_relay::HttpServer;

#[derive(Parser)]
#[command(name = "gtr-relay")]
#[command(about = "Transload relay: stream files from allowlisted origins into object storage", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "GTR_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    logging::init(&config.observability);

    tracing::info!("gtr-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        transload_prefix = %config.routing.transload_prefix,
        destination = %config.destination.endpoint,
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

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
