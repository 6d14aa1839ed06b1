// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ld-remote: reference remote document store for larder.
//!
//! Holds named JSON documents in named collections and serves the larder
//! WebSocket protocol. Every change is journaled to the data directory.

mod server;
mod state;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// ld-remote: remote document store for larder
#[derive(Parser, Debug)]
#[command(name = "ld-remote")]
#[command(about = "WebSocket document store that larder syncs against")]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "0.0.0.0:7891")]
    bind: SocketAddr,

    /// Directory for the document journal
    #[arg(short, long, default_value = ".")]
    data: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting ld-remote server");
    info!("  Bind address: {}", args.bind);
    info!("  Data directory: {}", args.data.display());

    let state = state::ServerState::open(&args.data)?;
    let listener = TcpListener::bind(args.bind).await?;

    server::run(listener, state).await?;

    Ok(())
}
