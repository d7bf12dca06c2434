//! Command implementations for the FluSight data CLI.
//!
//! Provides subcommands that fetch lagged observations from the Delphi
//! Epidata API and write the JSON files the dashboard loads.

use clap::{Args, Subcommand};
use flu_data::sweep::MAX_LAG;
use flu_epidata::client::{EpidataConfig, DEFAULT_BASE_URL};
use flu_epidata::season::SeasonId;
use std::path::PathBuf;
use std::time::Duration;

pub mod actual;
pub mod history;
pub mod metadata;
pub mod seasons;

/// Epidata connection settings shared by the fetching commands.
#[derive(Args, Debug, Clone)]
pub struct ApiArgs {
    /// Epidata API endpoint
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Attempts per request before giving up
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Delay before the first retry in milliseconds, doubled after each failure
    #[arg(long, default_value_t = 1000)]
    pub backoff_ms: u64,
}

impl ApiArgs {
    pub fn config(&self) -> EpidataConfig {
        EpidataConfig {
            base_url: self.base_url.clone(),
            max_tries: self.retries,
            initial_backoff: Duration::from_millis(self.backoff_ms),
            ..EpidataConfig::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch every lag of the given seasons and write <season>-actual.json files
    Actual {
        /// Seasons like 2016-2017; defaults to the season directories of --data-dir,
        /// or the current season
        #[arg(short, long, num_args = 1..)]
        seasons: Vec<SeasonId>,

        /// Directory whose season subdirectories select the seasons
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Lag cache file, created if missing
        #[arg(short, long, default_value = "cache.json")]
        cache: PathBuf,

        /// Directory for the season files
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Highest lag to fetch
        #[arg(long, default_value_t = MAX_LAG)]
        max_lag: u32,

        #[command(flatten)]
        api: ApiArgs,
    },

    /// Fetch finalized data of past seasons and write history.json
    History {
        #[arg(short, long, num_args = 1.., required = true)]
        seasons: Vec<SeasonId>,

        /// Output path
        #[arg(short, long, default_value = "history.json")]
        out: PathBuf,

        #[command(flatten)]
        api: ApiArgs,
    },

    /// Write metadata.json for the seasons found in the data directory
    Metadata {
        /// Directory with one subdirectory per season
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Output path
        #[arg(short, long, default_value = "metadata.json")]
        out: PathBuf,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Actual {
            seasons,
            data_dir,
            cache,
            out_dir,
            max_lag,
            api,
        } => {
            let seasons = seasons::resolve_seasons(&seasons, data_dir.as_deref())?;
            actual::run_actual(api.config(), &seasons, &cache, &out_dir, max_lag).await
        }
        Command::History { seasons, out, api } => {
            let seasons = seasons::resolve_seasons(&seasons, None)?;
            history::run_history(api.config(), &seasons, &out).await
        }
        Command::Metadata { data_dir, out } => metadata::run_metadata(&data_dir, &out),
    }
}
