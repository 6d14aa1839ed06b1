// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use args::{DocArgs, OutputArgs, OutputFormat};

use args::non_empty_string;

#[derive(Parser)]
#[command(name = "larder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first cache, offline store and sync queue for JSON documents")]
#[command(
    long_about = "Offline-first cache, offline store and sync queue for JSON documents.\n\n\
    Reads are served locally; mutations are queued and replayed against a remote \
    document store whenever it is reachable."
)]
pub struct Cli {
    /// Config file [default: ./larder.toml, then the user config directory]
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "path")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show connectivity, queue and store status
    #[command(after_help = "\
Examples:
  larder status                      Human-readable summary
  larder status -o json              Machine-readable status")]
    Status {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Probe the remote store and run one sync pass
    Sync {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Run the sync scheduler in the foreground until interrupted
    Run,

    /// Time-limited key/value cache
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Documents kept readable while offline
    #[command(subcommand)]
    Offline(OfflineCommand),

    /// Mutations waiting for the remote store
    #[command(subcommand)]
    Queue(QueueCommand),
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Cache a JSON value
    #[command(after_help = "\
Examples:
  larder cache put rates '{\"eur\": 1.08}'             Cache for the default TTL
  larder cache put rates '{\"eur\": 1.08}' --ttl 1h    Cache for one hour")]
    Put {
        #[arg(value_parser = non_empty_string)]
        key: String,

        /// JSON value
        data: String,

        /// Time to live (e.g. 30s, 15m, 1h, 7d)
        #[arg(long)]
        ttl: Option<String>,
    },

    /// Print a cached value, if present and fresh
    Get {
        #[arg(value_parser = non_empty_string)]
        key: String,
    },

    /// Remove expired entries
    Sweep,
}

#[derive(Subcommand)]
pub enum OfflineCommand {
    /// Record a local write, synced on the next pass
    Store {
        #[command(flatten)]
        doc: DocArgs,

        /// JSON payload
        payload: String,
    },

    /// Print one offline document
    Get {
        #[command(flatten)]
        doc: DocArgs,
    },

    /// List the offline documents of a collection
    List {
        #[arg(value_parser = non_empty_string)]
        collection: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fetch documents from the remote store for offline use
    #[command(after_help = "\
Examples:
  larder offline download expenses                          Every expense
  larder offline download expenses -w 'amount >= 10'        Filtered
  larder offline download expenses -w 'vendor.name = Shop' -n 20")]
    Download {
        #[arg(value_parser = non_empty_string)]
        collection: String,

        /// Filter expression (repeat for AND)
        #[arg(long = "where", short = 'w', value_name = "EXPR")]
        filters: Vec<String>,

        /// Maximum number of documents
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Delete every offline document and queued mutation
    Clear,
}

#[derive(Subcommand)]
pub enum QueueCommand {
    /// Queue creation of a document
    Create {
        #[command(flatten)]
        doc: DocArgs,

        /// JSON payload
        payload: String,
    },

    /// Queue a partial update of a document
    Update {
        #[command(flatten)]
        doc: DocArgs,

        /// JSON object of fields to merge
        payload: String,
    },

    /// Queue deletion of a document
    Delete {
        #[command(flatten)]
        doc: DocArgs,
    },

    /// List queued mutations in replay order
    List {
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
