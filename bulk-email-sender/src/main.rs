//! bulk-email-sender CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use bulk_email_sender::{observability, AppConfig, MessageFormat, TlsMode};
use clap::Parser;
use commands::{SendArgs, SendCommand};

#[derive(Parser)]
#[command(name = "bulk-email-sender")]
#[command(version)]
#[command(about = "Send one HTML or plain-text email to a recipient list over SMTP", long_about = None)]
struct Cli {
    /// Config file to use instead of the standard search path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Message format (asked interactively when omitted)
    #[arg(long, value_enum)]
    format: Option<MessageFormat>,

    /// SMTP username
    #[arg(long)]
    username: Option<String>,

    /// SMTP hostname
    #[arg(long)]
    host: Option<String>,

    /// SMTP port
    #[arg(long)]
    port: Option<u16>,

    /// Envelope sender, when it differs from the username
    #[arg(long)]
    from: Option<String>,

    /// Connection security
    #[arg(long, value_enum)]
    tls: Option<TlsMode>,

    /// Recipient list file
    #[arg(long)]
    recipients: Option<PathBuf>,

    /// Print the mail instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Send without asking for confirmation
    #[arg(long, short)]
    yes: bool,

    /// Debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Nothing to log through yet
    if let Err(err) = observability::init(cli.verbose) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }

    if let Err(err) = run(cli) {
        tracing::error!("Fatal error, exiting: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    if let Some(recipients) = cli.recipients {
        config.files.recipients = recipients;
    }
    if let Some(tls) = cli.tls {
        config.smtp.tls = tls;
    }
    if let Some(from) = cli.from {
        config.smtp.from = from;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let args = SendArgs {
        format: cli.format,
        username: cli.username,
        host: cli.host,
        port: cli.port,
        dry_run: cli.dry_run,
        assume_yes: cli.yes,
    };

    SendCommand::new(config, args).execute(&runtime)
}
