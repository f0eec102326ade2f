// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! devlog — CLI front-end for the devlogd personal developer-telemetry
//! daemon (spec §6.1).

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod daemon_process;
mod output;
mod paths;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::config::ConfigCommand;
use commands::daemon::DaemonCommand;
use commands::search::SearchArgs;
use commands::status::StatusArgs;
use output::OutputFormat;
use paths::Paths;

#[derive(Parser)]
#[command(name = "devlog", version, about = "DevLog — a personal developer-telemetry daemon")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a fresh, default config file
    Init,
    /// Manage the devlogd background process
    Daemon {
        #[command(subcommand)]
        command: DaemonCommand,
    },
    /// Inspect the on-disk config document
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Show the most recent events
    Status(StatusArgs),
    /// Full-text search over stored events
    Search(SearchArgs),
    /// Read one JSON event from stdin and deliver it to devlogd
    Ingest,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let paths = Paths::discover()?;

    match cli.command {
        Commands::Init => commands::init::init(&paths),
        Commands::Daemon { command } => commands::daemon::handle(command, &paths).await,
        Commands::Config { command } => commands::config::handle(command, &paths),
        Commands::Status(args) => commands::status::handle(args, &paths, cli.output).await,
        Commands::Search(args) => commands::search::handle(args, &paths, cli.output).await,
        Commands::Ingest => commands::ingest::handle(&paths).await,
    }
}
