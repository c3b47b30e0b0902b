//! Error types for the `pharmafind` binary.

use pharmafind::error::PharmafindError;
use thiserror::Error;

/// Result alias for the command line interface.
pub type Result<T> = core::result::Result<T, CliError>;

/// Failures that end a `pharmafind` run with a non-zero exit code.
#[derive(Error, Debug)]
pub enum CliError {
  /// Searching, fetching, configuration, or export failed inside the library.
  #[error(transparent)]
  Pharmafind(#[from] PharmafindError),

  /// Writing to the terminal failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),
}
