//! Record normalization.
//!
//! Turns one [`RawRecord`] into a [`Publication`], classifying every author that has an
//! affiliation. Each record yields an [`Outcome`]: either a qualified publication or a
//! [`Skip`] saying why the record was left out. A broken record therefore never stops a batch.

use std::str::FromStr;

use chrono::{Month, NaiveDate};

use super::*;

lazy_static! {
  static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// What became of one raw record.
#[derive(Debug)]
pub enum Outcome {
  /// The record has at least one non-academic author
  Qualified(Publication),
  /// The record was left out of the result table
  Skipped(Skip),
}

/// Why a record was left out.
#[derive(Debug)]
pub enum Skip {
  /// Every author is academic, or no author has an affiliation
  NoNonAcademicAuthors {
    /// Identifier of the skipped record
    id: String,
  },
  /// The record could not be normalized; always a
  /// [`PharmafindError::RecordMalformed`]
  Malformed(PharmafindError),
}

impl Outcome {
  /// The publication, if the record qualified.
  pub fn into_publication(self) -> Option<Publication> {
    match self {
      Outcome::Qualified(publication) => Some(publication),
      Outcome::Skipped(_) => None,
    }
  }
}

impl Display for Skip {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Skip::NoNonAcademicAuthors { id } => write!(f, "Record {id} has no non-academic authors"),
      Skip::Malformed(e) => write!(f, "{e}"),
    }
  }
}

/// Builds [`Publication`]s from raw records with a given [`Classifier`].
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
  /// Classifier applied to each author
  classifier: Classifier,
}

/// Normalizes a record with the built-in keyword table.
///
/// Returns `None` when the record has no non-academic author or cannot be normalized.
pub fn normalize(record: &RawRecord) -> Option<Publication> {
  Normalizer::default().process(record).into_publication()
}

impl Normalizer {
  /// Creates a normalizer around a custom classifier.
  pub fn new(classifier: Classifier) -> Self { Self { classifier } }

  /// Normalizes a record, returning `None` when it does not qualify.
  pub fn normalize(&self, record: &RawRecord) -> Option<Publication> {
    self.process(record).into_publication()
  }

  /// Normalizes a record and reports why it was skipped when it does not qualify.
  pub fn process(&self, record: &RawRecord) -> Outcome {
    let Some(id) = record.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) else {
      return Outcome::Skipped(Skip::Malformed(PharmafindError::RecordMalformed {
        id:     None,
        reason: "record has no identifier".to_string(),
      }));
    };

    let title = record.title.as_deref().map(collapse_whitespace).unwrap_or_else(|| {
      debug!("Record {id} has no title");
      String::new()
    });

    let mut non_academic_authors = Vec::new();
    let mut company_affiliations: Vec<String> = Vec::new();
    let mut corresponding_author_email = None;

    for author in &record.authors {
      let affiliation = author
        .affiliation
        .as_deref()
        .map(collapse_whitespace)
        .filter(|affiliation| !affiliation.is_empty());
      let email = author
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .or_else(|| affiliation.as_deref().and_then(find_email))
        .map(str::to_string);

      if corresponding_author_email.is_none() {
        corresponding_author_email = email.clone();
      }

      let Some(affiliation) = affiliation else {
        continue;
      };
      let verdict = self.classifier.classify(Some(&affiliation), email.as_deref());
      if !verdict.is_non_academic {
        continue;
      }

      trace!("Record {id}: {} is non-academic ({:?})", author.name, verdict.company_name);
      non_academic_authors.push(author.name.trim().to_string());
      if let Some(company) = verdict.company_name {
        if !company_affiliations.contains(&company) {
          company_affiliations.push(company);
        }
      }
    }

    if non_academic_authors.is_empty() {
      return Outcome::Skipped(Skip::NoNonAcademicAuthors { id: id.to_string() });
    }

    Outcome::Qualified(Publication {
      id: id.to_string(),
      title,
      publication_date: publication_date(record),
      non_academic_authors,
      company_affiliations,
      corresponding_author_email,
    })
  }
}

/// Best-effort publication date of a record.
///
/// Prefers the structured issue date, then the free-text issue date, then the electronic
/// publication date. Returns an empty string when none is usable.
pub fn publication_date(record: &RawRecord) -> String {
  record
    .pub_date
    .as_ref()
    .and_then(format_date)
    .or_else(|| {
      record.medline_date.as_deref().map(collapse_whitespace).filter(|date| !date.is_empty())
    })
    .or_else(|| record.article_date.as_ref().and_then(format_date))
    .unwrap_or_default()
}

/// Formats a partial date as `YYYY`, `YYYY-MM`, or `YYYY-MM-DD`.
///
/// Month names become numbers. A day that does not exist in its month is dropped. Without a
/// year there is nothing to format and `None` is returned.
///
/// ```
/// use pharmafind::{normalizer::format_date, record::PartialDate};
///
/// assert_eq!(format_date(&PartialDate::ymd("2023", "Mar", "7")), Some("2023-03-07".into()));
/// assert_eq!(format_date(&PartialDate::ymd("2023", "02", "30")), Some("2023-02".into()));
/// assert_eq!(format_date(&PartialDate::year("2019")), Some("2019".into()));
/// ```
pub fn format_date(date: &PartialDate) -> Option<String> {
  let year = date.year.as_deref().map(str::trim).filter(|year| !year.is_empty())?;
  let Some(month) = date.month.as_deref().and_then(parse_month) else {
    return Some(year.to_string());
  };

  let day = date.day.as_deref().and_then(|day| day.trim().parse::<u32>().ok());
  let valid_day = match (year.parse::<i32>(), day) {
    (Ok(y), Some(d)) => NaiveDate::from_ymd_opt(y, month, d).map(|_| d),
    _ => None,
  };

  Some(match valid_day {
    Some(day) => format!("{year}-{month:02}-{day:02}"),
    None => format!("{year}-{month:02}"),
  })
}

/// Reads a month given as `"3"`, `"03"`, `"Mar"`, or `"March"`.
fn parse_month(month: &str) -> Option<u32> {
  let month = month.trim();
  month
    .parse::<u32>()
    .ok()
    .filter(|m| (1..=12).contains(m))
    .or_else(|| Month::from_str(month).ok().map(|m| m.number_from_month()))
}

/// Collapses runs of whitespace into single spaces and trims the ends.
fn collapse_whitespace(text: &str) -> String { WHITESPACE.replace_all(text.trim(), " ").into_owned() }
