//! Error types for the pharmafind library.
//!
//! Only collaborator failures are fatal to a run: [`PharmafindError::Search`] and
//! [`PharmafindError::Fetch`] abort [`Fetcher::fetch_and_process`](crate::fetcher::Fetcher).
//! [`PharmafindError::RecordMalformed`] describes a single record that could not be normalized;
//! the normalizer reports it as a skipped record and the batch carries on. Classification never
//! fails.
//!
//! # Examples
//!
//! ```no_run
//! use pharmafind::{error::PharmafindError, fetcher::Fetcher, retriever::entrez::EntrezClient};
//!
//! # async fn example() -> Result<(), PharmafindError> {
//! let fetcher = Fetcher::new(EntrezClient::default());
//! match fetcher.fetch_and_process("aspirin", 20).await {
//!   Ok(table) if table.is_empty() => println!("Nothing industry-affiliated"),
//!   Ok(table) => println!("{} papers", table.len()),
//!   Err(PharmafindError::Search(e)) => println!("Search rejected: {}", e),
//!   Err(e) => println!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// Error type alias used for the [`pharmafind`](crate) crate.
pub type Result<T> = core::result::Result<T, PharmafindError>;

/// Errors that can occur when searching, fetching, or exporting publications.
#[derive(Error, Debug)]
pub enum PharmafindError {
  /// The search step failed.
  ///
  /// This occurs when the remote service is unreachable, answers with a non-success status, or
  /// rejects the query. The string carries the reason reported by the collaborator.
  #[error("Search failed: {0}")]
  Search(String),

  /// Retrieval of the records for a set of identifiers failed.
  ///
  /// This covers transport failures as well as a response body that cannot be decoded.
  #[error("Fetch failed: {0}")]
  Fetch(String),

  /// A single raw record could not be normalized.
  ///
  /// This is never returned from a whole-batch operation; it shows up inside
  /// [`Skip::Malformed`](crate::normalizer::Skip::Malformed) so the record can be reported and
  /// skipped.
  #[error("Malformed record {}: {reason}", id.as_deref().unwrap_or("<unknown>"))]
  RecordMalformed {
    /// Identifier of the record when it could be read
    id:     Option<String>,
    /// What was wrong with the record
    reason: String,
  },

  /// A caller supplied an argument outside its accepted range.
  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  /// A network request failed.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// An endpoint URL could not be built from the configured base URL.
  #[error(transparent)]
  Url(#[from] url::ParseError),

  /// A JSON response could not be decoded.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// An XML response could not be decoded.
  #[error(transparent)]
  Xml(#[from] quick_xml::Error),

  /// Reading or writing the delimited export failed.
  #[error(transparent)]
  Csv(#[from] csv::Error),

  /// A file system operation failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// A configuration file is not valid TOML for [`Config`](crate::config::Config).
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// Configuration could not be located or is inconsistent.
  #[error("{0}")]
  Config(String),
}

impl PharmafindError {
  /// Whether this error aborts a whole run rather than a single record.
  pub fn is_fatal(&self) -> bool { !matches!(self, PharmafindError::RecordMalformed { .. }) }
}
