//! Command line interface for `pharmafind`.
//!
//! Searches PubMed and lists the papers that have at least one author affiliated with a
//! pharmaceutical or biotech company.
//!
//! # Usage
//!
//! ```bash
//! # List matching papers on the console
//! pharmafind "cancer immunotherapy"
//!
//! # Write the first 50 matches as CSV
//! pharmafind "crispr AND therapy" --max-results 50 --file results.csv
//!
//! # Show what the classifier decided for every author
//! pharmafind "mrna vaccine" -vvvv
//! ```
//!
//! Settings for the NCBI E-utilities (contact email, API key, batch size) are read from
//! `<config dir>/pharmafind/config.toml`, or from the file given with `--config`.
//! `NCBI_API_KEY` and `NCBI_EMAIL` fill in credentials the file leaves out.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{path::PathBuf, process::ExitCode};

use clap::{builder::ArgAction, Parser};
use pharmafind::{config::Config, fetcher::Fetcher, retriever::entrez::EntrezClient};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub mod error;
pub mod interaction;

use crate::{error::*, interaction::*};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Find PubMed papers with pharmaceutical or biotech authors")]
pub struct Cli {
  /// PubMed query, using the full PubMed search syntax
  query: String,

  /// Print debug information during execution
  #[arg(short, long)]
  debug: bool,

  /// Write the results as CSV to this file instead of listing them
  #[arg(short, long, value_name = "PATH")]
  file: Option<PathBuf>,

  /// Maximum number of search results to examine
  #[arg(
    short,
    long,
    default_value_t = 100,
    value_parser = clap::value_parser!(u32).range(1..)
  )]
  max_results: u32,

  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(short, long, action = ArgAction::Count, help = "Increase logging verbosity")]
  verbose: u8,

  /// Configuration file; defaults to the platform config directory
  #[arg(long, value_name = "PATH")]
  config: Option<PathBuf>,
}

/// Configures logging on stderr.
///
/// `RUST_LOG` wins when set. Otherwise the verbosity picks the level:
/// - 0: error
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
///
/// `--debug` raises anything below debug to debug.
fn setup_logging(verbosity: u8, debug: bool) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };
  let filter = if debug && verbosity < 3 { "debug" } else { filter };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_target(true)
    .init();
}

/// Loads the configuration named on the command line, or the default one.
fn load_config(cli: &Cli) -> Result<Config> {
  let config = match &cli.config {
    Some(path) => Config::from_path(path)?.with_env(),
    None => Config::load_default()?,
  };
  Ok(config)
}

/// Runs one query and reports the result.
async fn run<I: UserInteraction>(cli: &Cli, interaction: &I) -> Result<()> {
  let config = load_config(cli)?;
  let classifier = config.classifier.build()?;
  let fetcher = Fetcher::new(EntrezClient::new(config.entrez)).with_classifier(classifier);
  let entrez = fetcher.source().config();
  debug!("Using E-utilities at {} (database {})", entrez.base_url, entrez.database);

  interaction.reply(ResponseContent::Info(&format!("Searching PubMed for: {}", cli.query)))?;
  let harvest = fetcher.harvest(&cli.query, cli.max_results as usize).await?;

  if !harvest.missing.is_empty() {
    interaction.reply(ResponseContent::Warning(&format!(
      "{} records could not be retrieved: {}",
      harvest.missing.len(),
      harvest.missing.join(", ")
    )))?;
  }

  let table = harvest.table;
  if table.is_empty() {
    return interaction.reply(ResponseContent::Info("No papers found with non-academic authors"));
  }

  match &cli.file {
    Some(path) => {
      table.save_csv(path)?;
      interaction.reply(ResponseContent::Success(&format!(
        "Saved {} papers to {}",
        table.len(),
        path.display()
      )))
    },
    None => {
      interaction.reply(ResponseContent::Table(&table))?;
      interaction.reply(ResponseContent::Success(&format!(
        "Found {} papers with non-academic authors",
        table.len()
      )))
    },
  }
}

/// Entry point for the `pharmafind` binary.
///
/// Exits with 0 on success, including when no paper qualifies, and with 1 after printing a
/// single error line for any fatal failure.
#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  setup_logging(cli.verbose, cli.debug);

  let terminal = Terminal::default();
  match run(&cli, &terminal).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      if terminal.reply(ResponseContent::Error(&e)).is_err() {
        eprintln!("{ERROR_PREFIX}{e}");
      }
      ExitCode::FAILURE
    },
  }
}
