use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

mod classify;
mod config;
mod error;
mod models;
mod notify;
mod run;
mod sources;
mod storage;

use crate::config::MailSettings;
use crate::notify::EmailNotifier;
use crate::sources::FundgrubeApi;
use crate::storage::{HistoryStore, MarkerStore};

/// Watch the MediaMarkt and Saturn Fundgrube for new clearance postings
/// matching your filters, and get a mail when something shows up.
#[derive(Parser)]
#[command(name = "fundgrube-notifier")]
struct Cli {
    /// Path to the JSON filter file
    config_file: PathBuf,

    /// Path to the append-only history of already seen postings
    #[arg(long, default_value = "old_results.csv")]
    history_file: PathBuf,

    /// Path to the last-notified-error marker
    #[arg(long, default_value = "data/previous_error.txt")]
    marker_file: PathBuf,

    /// Be verbose
    #[arg(long)]
    verbose: bool,

    /// Print lots of debugging statements
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.debug {
        "fundgrube_notifier=debug"
    } else if cli.verbose {
        "fundgrube_notifier=info"
    } else {
        "fundgrube_notifier=error"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.parse()?),
        )
        .init();

    info!("Starting Fundgrube Notifier");

    // A broken filter file aborts before any fetch; no notification for this.
    let filters = config::load_filters(&cli.config_file)?;

    let source = FundgrubeApi::new()?;
    let notifier = EmailNotifier::new(MailSettings::from_env()?)?;
    let history = HistoryStore::new(cli.history_file);
    let marker = MarkerStore::new(cli.marker_file);

    let new_count = run::run_once(&filters, &source, &notifier, &history, &marker).await?;
    info!("run finished, {new_count} new postings");
    Ok(())
}
