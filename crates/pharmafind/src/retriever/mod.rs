//! Access to the literature database.
//!
//! The [`Fetcher`](crate::fetcher::Fetcher) only talks to a [`LiteratureSource`]: something that
//! can turn a query into an ordered list of record identifiers and identifiers into
//! [`RawRecord`]s. [`entrez::EntrezClient`] implements it against NCBI's E-utilities; tests and
//! other databases can bring their own implementation.
//!
//! # Fetch order
//!
//! A source may return records in any order and may leave out identifiers it could not find.
//! The fetcher re-associates records with the search order by identifier.

use super::*;

pub mod entrez;
pub mod xml;

/// A searchable source of publication metadata.
///
/// # Examples
///
/// ```no_run
/// use async_trait::async_trait;
/// use pharmafind::{error::Result, record::RawRecord, retriever::LiteratureSource};
///
/// struct Offline(Vec<RawRecord>);
///
/// #[async_trait]
/// impl LiteratureSource for Offline {
///   async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<String>> {
///     Ok(self.0.iter().filter_map(|r| r.id.clone()).take(max_results).collect())
///   }
///
///   async fn fetch(&self, ids: &[String]) -> Result<Vec<RawRecord>> {
///     Ok(self.0.iter().filter(|r| r.id.as_ref().is_some_and(|id| ids.contains(id))).cloned().collect())
///   }
/// }
/// ```
#[async_trait]
pub trait LiteratureSource: Send + Sync {
  /// Returns up to `max_results` identifiers matching `query`, best match first.
  ///
  /// Fails with [`PharmafindError::Search`] when the service is unreachable or rejects the
  /// query. No match is an empty list, not an error.
  async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>>;

  /// Retrieves the raw records for `ids`.
  ///
  /// Fails with [`PharmafindError::Fetch`] on transport or decoding failures. Records that the
  /// service does not have are simply missing from the result.
  async fn fetch(&self, ids: &[String]) -> Result<Vec<RawRecord>>;
}

#[async_trait]
impl<T: LiteratureSource + ?Sized> LiteratureSource for &T {
  async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
    (**self).search(query, max_results).await
  }

  async fn fetch(&self, ids: &[String]) -> Result<Vec<RawRecord>> { (**self).fetch(ids).await }
}

#[async_trait]
impl<T: LiteratureSource + ?Sized> LiteratureSource for Box<T> {
  async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
    (**self).search(query, max_results).await
  }

  async fn fetch(&self, ids: &[String]) -> Result<Vec<RawRecord>> { (**self).fetch(ids).await }
}
