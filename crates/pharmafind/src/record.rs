//! Raw metadata records as handed over by a [`LiteratureSource`].
//!
//! Every field a source may fail to provide is an [`Option`], so "missing" and "present but
//! empty" stay distinguishable until the [`normalizer`](crate::normalizer) decides what to do
//! with them.

use super::*;

/// One publication as it came back from the literature database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
  /// Source identifier (a PMID for PubMed)
  pub id:           Option<String>,
  /// Article title, possibly with stray whitespace
  pub title:        Option<String>,
  /// Structured issue date (`PubDate` in PubMed)
  pub pub_date:     Option<PartialDate>,
  /// Free-text issue date used when no structured date exists, e.g. "1998 Dec-1999 Jan"
  pub medline_date: Option<String>,
  /// Electronic publication date, used as a fallback
  pub article_date: Option<PartialDate>,
  /// Authors in published order
  pub authors:      Vec<RawAuthor>,
}

/// A single author entry of a [`RawRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAuthor {
  /// Display name of the author or collective
  pub name:        String,
  /// Free-text affiliation; multiple affiliations are joined with `"; "`
  pub affiliation: Option<String>,
  /// Contact email when the source lists one explicitly
  pub email:       Option<String>,
}

/// A date whose parts may each be missing.
///
/// Parts are kept as the source spelled them (`"Mar"`, `"03"`, `"3"`); normalization happens in
/// [`normalizer::format_date`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialDate {
  /// Four digit year
  pub year:  Option<String>,
  /// Month as a number or an English month name
  pub month: Option<String>,
  /// Day of month
  pub day:   Option<String>,
}

impl RawAuthor {
  /// Creates an author with only a name.
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), affiliation: None, email: None }
  }

  /// Sets the affiliation text.
  pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
    self.affiliation = Some(affiliation.into());
    self
  }

  /// Sets the email address.
  pub fn with_email(mut self, email: impl Into<String>) -> Self {
    self.email = Some(email.into());
    self
  }
}

impl PartialDate {
  /// A date with all three parts present.
  pub fn ymd(year: &str, month: &str, day: &str) -> Self {
    Self { year: Some(year.into()), month: Some(month.into()), day: Some(day.into()) }
  }

  /// A date that only knows its year.
  pub fn year(year: &str) -> Self { Self { year: Some(year.into()), ..Self::default() } }

  /// Whether no part of the date is present.
  pub fn is_empty(&self) -> bool {
    self.year.is_none() && self.month.is_none() && self.day.is_none()
  }
}
