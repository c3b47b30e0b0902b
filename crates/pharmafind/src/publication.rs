//! The normalized publication entity.

use super::*;

/// Separator used when a list column is flattened into a single cell or line.
pub const LIST_SEPARATOR: &str = "; ";

/// A publication with at least one industry-affiliated author.
///
/// Built once by the [`Normalizer`] and not modified afterwards.
///
/// # Examples
///
/// ```
/// use pharmafind::{
///   normalizer::normalize,
///   record::{RawAuthor, RawRecord},
/// };
///
/// let record = RawRecord {
///   id: Some("38012345".into()),
///   title: Some("A trial".into()),
///   authors: vec![RawAuthor::new("John Roe").with_affiliation("Pfizer Inc.")],
///   ..RawRecord::default()
/// };
/// let publication = normalize(&record).unwrap();
/// assert_eq!(publication.company_affiliations, ["Pfizer Inc."]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
  /// Source identifier (PMID)
  pub id:                         String,
  /// Article title
  pub title:                      String,
  /// `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, a free-text issue date, or empty
  pub publication_date:           String,
  /// Names of authors classified as non-academic, in author order
  pub non_academic_authors:       Vec<String>,
  /// Company names in first-seen order, without duplicates
  pub company_affiliations:       Vec<String>,
  /// First email found among all authors
  pub corresponding_author_email: Option<String>,
}

impl Publication {
  /// Non-academic author names as one string.
  pub fn joined_authors(&self) -> String { self.non_academic_authors.join(LIST_SEPARATOR) }

  /// Company names as one string.
  pub fn joined_companies(&self) -> String { self.company_affiliations.join(LIST_SEPARATOR) }
}

impl Display for Publication {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "PubmedID: {}", self.id)?;
    writeln!(f, "  Title: {}", self.title)?;
    writeln!(f, "  Publication Date: {}", self.publication_date)?;
    writeln!(f, "  Non-academic Author(s): {}", self.joined_authors())?;
    writeln!(f, "  Company Affiliation(s): {}", self.joined_companies())?;
    write!(
      f,
      "  Corresponding Author Email: {}",
      self.corresponding_author_email.as_deref().unwrap_or("")
    )
  }
}
