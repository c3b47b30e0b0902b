//! Industry-affiliated paper discovery for PubMed.
//!
//! `pharmafind` searches a biomedical literature database, pulls the metadata of every matching
//! publication, and keeps only the papers that list at least one author whose affiliation looks
//! like a pharmaceutical or biotech company rather than an academic or clinical institution.
//!
//! # Pipeline
//!
//! ```text
//! query ─► search ─► ids ─► fetch ─► raw records ─► normalize (classify each author) ─► table
//! ```
//!
//! - [`classifier`]: keyword rule table and the affiliation heuristic
//! - [`normalizer`]: turns one [`record::RawRecord`] into a [`publication::Publication`]
//! - [`fetcher`]: drives search and fetch through a [`retriever::LiteratureSource`]
//! - [`table`]: the ordered [`table::ResultTable`] with CSV export and console listing
//! - [`retriever`]: the collaborator boundary and the NCBI Entrez client
//! - [`config`]: TOML configuration for the Entrez client
//!
//! # Getting Started
//!
//! ```no_run
//! use pharmafind::{config::Config, fetcher::Fetcher, retriever::entrez::EntrezClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let config = Config::load_default()?;
//!   let fetcher = Fetcher::new(EntrezClient::new(config.entrez));
//!
//!   let table = fetcher.fetch_and_process("cancer immunotherapy", 50).await?;
//!   for publication in table.iter() {
//!     println!("{} {:?}", publication.id, publication.company_affiliations);
//!   }
//!   Ok(())
//! }
//! ```
//!
//! Classification is a best-effort heuristic. Industry keywords win over academic ones when both
//! appear in the same affiliation, which favours recall of industry collaborations over precision.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  collections::{HashMap, HashSet},
  fmt::Display,
  io,
  path::{Path, PathBuf},
};

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
#[cfg(test)] use tracing_test::traced_test;

pub mod classifier;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod normalizer;
pub mod publication;
pub mod record;
pub mod retriever;
pub mod table;

use crate::{
  classifier::*, error::*, normalizer::*, publication::*, record::*, retriever::*, table::*,
};

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use pharmafind::{fetcher::Fetcher, prelude::*, retriever::entrez::EntrezClient};
///
/// async fn example() -> Result<(), PharmafindError> {
///   let fetcher = Fetcher::new(EntrezClient::default());
///   let table = fetcher.fetch_and_process("crispr", 10).await?;
///   println!("{} papers", table.len());
///   Ok(())
/// }
/// ```
pub mod prelude {
  pub use crate::{error::PharmafindError, retriever::LiteratureSource};
}
