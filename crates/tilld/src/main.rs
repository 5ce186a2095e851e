//! # tilld
//!
//! tillstream server binary — wires the broker to the HTTP layer and
//! serves until interrupted.

#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use till_broker::NoPendingTransactions;
use till_server::{ServerConfig, TillServer, TrustedTokenResolver};

/// tillstream event-stream server.
#[derive(Parser, Debug)]
#[command(name = "tilld", about = "Point-of-sale event-stream server")]
struct Cli {
    /// Host to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind (0 for auto-assign).
    #[arg(long, default_value = "6971")]
    port: u16,

    /// Seconds to wait for a station's answer before timing out a question.
    #[arg(long, default_value = "300")]
    answer_timeout_secs: u64,

    /// Default log level (overridden by `RUST_LOG`).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    till_core::logging::init_subscriber(&cli.log_level);

    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        answer_timeout_secs: cli.answer_timeout_secs,
    };

    // Development wiring: tokens are trusted as station IDs and no payment
    // integration is attached. Deployments replace both collaborators.
    let server = TillServer::new(
        config.clone(),
        Arc::new(TrustedTokenResolver),
        Arc::new(NoPendingTransactions),
    );

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr().context("failed to read bound address")?;
    info!(%local, "tilld listening");

    let shutdown = server.shutdown().clone();
    axum::serve(listener, server.router())
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
        .context("server error")?;

    info!("tilld stopped");
    Ok(())
}
