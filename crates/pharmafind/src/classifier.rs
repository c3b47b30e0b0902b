//! Affiliation classification.
//!
//! Decides whether an author's free-text affiliation names a commercial organization
//! (pharmaceutical, biotech, or any other company) instead of an academic, clinical, or
//! governmental institution, and tries to pull the company name out of the text.
//!
//! The decision is driven by a table of [`KeywordRule`]s, each tagged with an [`Indicator`]:
//!
//! 1. any [`Indicator::Industry`] match makes the author non-academic, even when academic words
//!    are present ("University collaboration, Pfizer Inc." is industry);
//! 2. otherwise any [`Indicator::Academic`] match makes the author academic;
//! 3. otherwise a weak [`Indicator::OrganizationSuffix`] ("Therapeutics", "Biosciences", ...)
//!    makes the author non-academic;
//! 4. otherwise a commercial-looking email domain makes the author non-academic;
//! 5. otherwise there is no evidence and the author counts as academic.
//!
//! # Examples
//!
//! ```
//! use pharmafind::classifier::classify;
//!
//! let verdict = classify(Some("Dept. of Oncology, Novartis Pharmaceuticals, Basel"), None);
//! assert!(verdict.is_non_academic);
//! assert_eq!(verdict.company_name.as_deref(), Some("Novartis Pharmaceuticals"));
//!
//! let verdict = classify(Some("Department of Medicine, Harvard University"), None);
//! assert!(!verdict.is_non_academic);
//! ```

use std::ops::Range;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use super::*;

/// The built-in keyword table: `(pattern, indicator, can end a company name)`.
///
/// Patterns are regular expressions over lower-cased, accent-folded text.
#[rustfmt::skip]
pub const KEYWORD_TABLE: &[(&str, Indicator, bool)] = &[
  // academic, clinical and governmental
  (r"\buniversit\w*",                                    Indicator::Academic, false),
  (r"\buniversidad\w*",                                  Indicator::Academic, false),
  (r"\bcolleges?\b",                                     Indicator::Academic, false),
  (r"\binstitut\w*",                                     Indicator::Academic, false),
  (r"\bschool\b",                                        Indicator::Academic, false),
  (r"\bfacult\w*",                                       Indicator::Academic, false),
  (r"\bacadem\w*",                                       Indicator::Academic, false),
  (r"\bhospita\w*",                                      Indicator::Academic, false),
  (r"\bhopita\w*",                                       Indicator::Academic, false),
  (r"\bospedal\w*",                                      Indicator::Academic, false),
  (r"\bklinik\w*",                                       Indicator::Academic, false),
  (r"\bclinics?\b",                                      Indicator::Academic, false),
  (r"\bmedical cent(?:er|re)\b",                         Indicator::Academic, false),
  (r"\bhealth cent(?:er|re)\b",                          Indicator::Academic, false),
  (r"\bnhs\b",                                           Indicator::Academic, false),
  (r"\bdepartment of\b",                                 Indicator::Academic, false),
  (r"\bdept\b\.?\s*of\b",                                Indicator::Academic, false),
  (r"\blaborator(?:y|ies) of\b",                         Indicator::Academic, false),
  (r"\bnational(?:\s+\w+)?\s+lab(?:oratory|oratories)?\b", Indicator::Academic, false),
  (r"\bnational institutes? of\b",                       Indicator::Academic, false),
  (r"\bcentre national\b",                               Indicator::Academic, false),
  (r"\b(?:cnrs|inserm|csic)\b",                          Indicator::Academic, false),
  (r"\bministry of\b",                                   Indicator::Academic, false),
  (r"\bresearch council\b",                              Indicator::Academic, false),
  // legal forms and the pharmaceutical industry itself
  (r"\binc\b\.?",                                        Indicator::Industry, true),
  (r"\bincorporated\b",                                  Indicator::Industry, true),
  (r"\bltd\b\.?",                                        Indicator::Industry, true),
  (r"\blimited\b",                                       Indicator::Industry, true),
  (r"\bllc\b\.?",                                        Indicator::Industry, true),
  (r"\bcorp\b\.?",                                       Indicator::Industry, true),
  (r"\bcorporation\b",                                   Indicator::Industry, true),
  (r"\bgmbh\b",                                          Indicator::Industry, true),
  (r"&\s*co\b\.?",                                       Indicator::Industry, true),
  (r"\band co\.",                                        Indicator::Industry, true),
  (r"\bco\b\.?\s+kg(?:aa)?\b",                           Indicator::Industry, true),
  (r"\bcompany\b",                                       Indicator::Industry, true),
  (r"(?:^|[\s,])s\.\s?a\.",                              Indicator::Industry, true),
  (r"\bs\.p\.a\b\.?",                                    Indicator::Industry, true),
  (r"\bb\.v\b\.?",                                       Indicator::Industry, true),
  (r"\bn\.v\b\.?",                                       Indicator::Industry, true),
  (r"\bk\.k\b\.?",                                       Indicator::Industry, true),
  (r"\bag\b",                                            Indicator::Industry, true),
  (r"\bplc\b",                                           Indicator::Industry, true),
  (r"\bpharma\b",                                        Indicator::Industry, true),
  (r"\bpharmaceuticals?\b",                              Indicator::Industry, true),
  (r"\bbiopharm\w*",                                     Indicator::Industry, true),
  (r"\bbiotech\b",                                       Indicator::Industry, true),
  // corporate-sounding names that lose to any academic cue
  (r"\b\w*therapeutics\b",                               Indicator::OrganizationSuffix, true),
  (r"\bbiosciences?\b",                                  Indicator::OrganizationSuffix, true),
  (r"\blaboratories\b",                                  Indicator::OrganizationSuffix, true),
  (r"\bdiagnostics\b",                                   Indicator::OrganizationSuffix, true),
  (r"\bbiologics\b",                                     Indicator::OrganizationSuffix, true),
  (r"\bgenomics\b",                                      Indicator::OrganizationSuffix, true),
  (r"\btechnologies\b",                                  Indicator::OrganizationSuffix, true),
  (r"\bholdings?\b",                                     Indicator::OrganizationSuffix, true),
];

/// Mail providers whose domains say nothing about an employer.
const WEBMAIL_PROVIDERS: &[&str] = &[
  "gmail", "googlemail", "yahoo", "hotmail", "outlook", "live", "msn", "aol", "icloud", "me",
  "mail", "qq", "163", "126", "yeah", "sina", "foxmail", "protonmail", "gmx", "web", "yandex",
];

/// Second-level labels that sit between a country code and the registrable name.
const SECOND_LEVEL_LABELS: &[&str] = &["co", "com", "ac", "edu", "gov", "or", "org", "ne", "net"];

lazy_static! {
  static ref EMAIL_PATTERN: Regex = Regex::new(r"[\w.-]+@[\w.-]+\.\w+").unwrap();
  static ref ELECTRONIC_ADDRESS: Regex =
    Regex::new(r"(?i)[\s.,;]*electronic address\s*:?[\s.]*").unwrap();
  static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
  static ref DEFAULT_CLASSIFIER: Classifier =
    Classifier::from_table(KEYWORD_TABLE).expect("built-in keyword table compiles");
}

/// Which side of the academic/industry split a keyword speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
  /// Universities, hospitals, public research bodies
  Academic,
  /// Legal forms and pharmaceutical/biotech wording; beats [`Indicator::Academic`]
  Industry,
  /// Corporate-sounding name endings that only count without any academic cue
  OrganizationSuffix,
}

/// A compiled entry of the keyword table.
#[derive(Debug, Clone)]
pub struct KeywordRule {
  /// Case-insensitive pattern
  pub pattern:        Regex,
  /// What a match is evidence for
  pub indicator:      Indicator,
  /// Whether a match can terminate an extracted company name
  pub company_suffix: bool,
}

/// The outcome of classifying one author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationVerdict {
  /// True when the affiliation looks commercial
  pub is_non_academic: bool,
  /// Company name pulled from the affiliation, when one ends in a known suffix
  pub company_name:    Option<String>,
}

/// Why a verdict came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
  /// No affiliation text to look at
  Empty,
  /// An industry keyword matched
  Industry,
  /// An academic keyword matched and no industry keyword did
  Academic,
  /// Only a weak corporate suffix matched
  OrganizationSuffix,
  /// Nothing in the text matched but the email domain looks commercial
  CommercialEmail,
  /// Nothing matched at all
  NoEvidence,
}

impl Evidence {
  /// Whether this evidence makes an author non-academic.
  pub fn is_non_academic(self) -> bool {
    matches!(self, Evidence::Industry | Evidence::OrganizationSuffix | Evidence::CommercialEmail)
  }
}

/// Keyword-table driven affiliation classifier.
///
/// [`Classifier::default`] shares the built-in table; extra rules can be appended with
/// [`Classifier::with_keyword`] without touching the matching code.
#[derive(Debug, Clone)]
pub struct Classifier {
  /// Rules in table order
  rules: Vec<KeywordRule>,
}

impl Default for Classifier {
  fn default() -> Self { DEFAULT_CLASSIFIER.clone() }
}

/// Classifies an affiliation with the built-in keyword table.
///
/// See [`Classifier::classify`].
pub fn classify(affiliation: Option<&str>, email: Option<&str>) -> ClassificationVerdict {
  DEFAULT_CLASSIFIER.classify(affiliation, email)
}

impl Classifier {
  /// Compiles a classifier from `(pattern, indicator, company_suffix)` rows.
  pub fn from_table(table: &[(&str, Indicator, bool)]) -> Result<Self> {
    let rules = table
      .iter()
      .map(|(pattern, indicator, company_suffix)| {
        Ok(KeywordRule {
          pattern:        compile(pattern)?,
          indicator:      *indicator,
          company_suffix: *company_suffix,
        })
      })
      .collect::<Result<Vec<_>>>()?;
    Ok(Self { rules })
  }

  /// Appends a literal keyword (matched on word boundaries) to the table.
  ///
  /// ```
  /// use pharmafind::classifier::{Classifier, Indicator};
  ///
  /// let classifier = Classifier::default().with_keyword("Sanatorium", Indicator::Academic).unwrap();
  /// assert!(!classifier.classify(Some("Davos Sanatorium"), Some("x@davos.com")).is_non_academic);
  /// ```
  pub fn with_keyword(mut self, keyword: &str, indicator: Indicator) -> Result<Self> {
    let keyword = fold(keyword.trim());
    if keyword.is_empty() {
      return Err(PharmafindError::Config("Empty classifier keyword".to_string()));
    }
    let mut pattern = regex::escape(&keyword);
    if keyword.starts_with(|c: char| c.is_alphanumeric()) {
      pattern.insert_str(0, r"\b");
    }
    if keyword.ends_with(|c: char| c.is_alphanumeric()) {
      pattern.push_str(r"\b");
    }
    self.rules.push(KeywordRule {
      pattern:        compile(&pattern)?,
      indicator,
      company_suffix: indicator != Indicator::Academic,
    });
    Ok(self)
  }

  /// The compiled rules in table order.
  pub fn rules(&self) -> &[KeywordRule] { &self.rules }

  /// Classifies one author's affiliation, using the email only as a tie-breaker.
  ///
  /// An absent or blank affiliation is academic with no company, whatever the email says.
  /// Malformed text never fails; it simply yields no evidence.
  pub fn classify(&self, affiliation: Option<&str>, email: Option<&str>) -> ClassificationVerdict {
    let Some(text) = affiliation.map(strip_contact_details).filter(|text| !text.is_empty()) else {
      return ClassificationVerdict::default();
    };

    let evidence = self.weigh(&text, email);
    trace!("Affiliation {:?} classified with evidence {:?}", text, evidence);

    if !evidence.is_non_academic() {
      return ClassificationVerdict::default();
    }
    ClassificationVerdict { is_non_academic: true, company_name: self.extract_company(&text) }
  }

  /// Works out which rule of the precedence order decides `text`.
  pub fn evidence(&self, affiliation: Option<&str>, email: Option<&str>) -> Evidence {
    match affiliation.map(strip_contact_details).filter(|text| !text.is_empty()) {
      Some(text) => self.weigh(&text, email),
      None => Evidence::Empty,
    }
  }

  /// Applies the precedence order to already cleaned text.
  fn weigh(&self, text: &str, email: Option<&str>) -> Evidence {
    let folded = fold(text);
    if self.matches(&folded, Indicator::Industry) {
      Evidence::Industry
    } else if self.matches(&folded, Indicator::Academic) {
      Evidence::Academic
    } else if self.matches(&folded, Indicator::OrganizationSuffix) {
      Evidence::OrganizationSuffix
    } else if email.and_then(email_domain).is_some_and(|domain| is_commercial_domain(&domain)) {
      Evidence::CommercialEmail
    } else {
      Evidence::NoEvidence
    }
  }

  /// Whether any rule of the given kind matches the folded text.
  fn matches(&self, folded: &str, indicator: Indicator) -> bool {
    self.rules.iter().filter(|rule| rule.indicator == indicator).any(|rule| rule.pattern.is_match(folded))
  }

  /// The byte range from the first to the last company-suffix match in `segment`.
  fn suffix_span(&self, segment: &str) -> Option<Range<usize>> {
    self
      .rules
      .iter()
      .filter(|rule| rule.company_suffix)
      .flat_map(|rule| rule.pattern.find_iter(segment))
      .fold(None, |span: Option<Range<usize>>, found| {
        let start = found.start() + leading_separator_len(found.as_str());
        Some(match span {
          Some(span) => span.start.min(start)..span.end.max(found.end()),
          None => start..found.end(),
        })
      })
  }

  /// Whether a segment is nothing but a legal suffix, such as `"Inc."` or `"Ltd"`.
  fn is_bare_suffix(&self, segment: &str) -> bool {
    self.suffix_span(segment).is_some_and(|span| span.start == 0 && span.end == segment.len())
  }

  /// Pulls a company name out of cleaned affiliation text.
  ///
  /// Segments are the comma or semicolon separated parts of the text. The first segment that has
  /// no academic cue and contains a company suffix wins; its name runs from the segment start to
  /// the end of the last suffix. A comma-separated neighbour that is only a legal form
  /// (`"Genentech, Inc."`, `"Eisai Co., Ltd."`) is pulled in as well. A suffix with no name in
  /// front of it is not a company name.
  fn extract_company(&self, text: &str) -> Option<String> {
    let segments = segments(text);

    for (i, range) in segments.iter().enumerate() {
      let segment = &text[range.clone()];
      if segment.is_empty() || self.matches(&fold(segment), Indicator::Academic) {
        continue;
      }
      let Some(span) = self.suffix_span(segment) else {
        continue;
      };

      let mut start = range.start;
      if span.start == 0 {
        let previous = i.checked_sub(1).map(|p| segments[p].clone()).filter(|previous| {
          segment.len() == span.end
            && !previous.is_empty()
            && !text[previous.end..range.start].contains(';')
            && !self.matches(&fold(&text[previous.clone()]), Indicator::Academic)
        });
        match previous {
          Some(previous) => start = previous.start,
          None => continue,
        }
      }

      let mut end = range.start + span.end;
      for next in &segments[i + 1..] {
        if text[end..next.start].contains(';') || !self.is_bare_suffix(&text[next.clone()]) {
          break;
        }
        end = next.end;
      }

      let name = text[start..end].trim();
      if !name.is_empty() {
        return Some(name.to_string());
      }
    }
    None
  }
}

/// Compiles a table pattern case-insensitively.
fn compile(pattern: &str) -> Result<Regex> {
  Regex::new(&format!("(?i){pattern}"))
    .map_err(|e| PharmafindError::Config(format!("Invalid keyword pattern `{pattern}`: {e}")))
}

/// Length of the separator some patterns consume before the keyword itself.
fn leading_separator_len(found: &str) -> usize {
  found.len() - found.trim_start_matches(|c: char| c.is_whitespace() || c == ',').len()
}

/// Trimmed byte ranges of the `,`/`;` separated parts of `text`.
fn segments(text: &str) -> Vec<Range<usize>> {
  let mut ranges = Vec::new();
  let mut start = 0;
  for (i, c) in text.char_indices().chain(std::iter::once((text.len(), ','))) {
    if c != ',' && c != ';' {
      continue;
    }
    let part = &text[start..i];
    let lead = part.len() - part.trim_start_matches(|c: char| c.is_whitespace() || c == '(').len();
    let trimmed = part[lead..].trim_end();
    ranges.push(start + lead..start + lead + trimmed.len());
    start = i + c.len_utf8();
  }
  ranges
}

/// Lower-cases text and drops diacritics so "Universität" reads as "universitat".
pub fn fold(text: &str) -> String {
  text.nfkd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase).collect()
}

/// Removes email addresses and "Electronic address:" notes, collapsing whitespace.
pub fn strip_contact_details(affiliation: &str) -> String {
  let text = EMAIL_PATTERN.replace_all(affiliation, " ");
  let text = ELECTRONIC_ADDRESS.replace_all(&text, " ");
  let text = WHITESPACE.replace_all(text.trim(), " ");
  text.trim_end_matches(|c: char| c == ',' || c == ';' || c.is_whitespace()).to_string()
}

/// Finds the first email-shaped token in free text.
pub fn find_email(text: &str) -> Option<&str> { EMAIL_PATTERN.find(text).map(|m| m.as_str()) }

/// The lower-cased domain part of an email address.
pub fn email_domain(email: &str) -> Option<String> {
  let (_, domain) = email.trim().rsplit_once('@')?;
  let domain = domain.trim_end_matches('.').to_lowercase();
  (domain.contains('.') && !domain.starts_with('.')).then_some(domain)
}

/// Whether a domain belongs to a university, school, government, or health service.
pub fn is_academic_domain(domain: &str) -> bool {
  let labels: Vec<&str> = domain.split('.').collect();
  let n = labels.len();
  let tld = labels[n - 1];
  let second = if n >= 3 { labels[n - 2] } else { "" };

  matches!(tld, "edu" | "gov" | "mil")
    || matches!(second, "edu" | "ac" | "gov")
    || domain == "nhs.net"
    || domain.ends_with(".nhs.net")
    || domain.ends_with(".nhs.uk")
}

/// Whether a domain looks like it belongs to a company.
///
/// Academic domains and public webmail providers never count.
pub fn is_commercial_domain(domain: &str) -> bool {
  if is_academic_domain(domain) {
    return false;
  }
  let labels: Vec<&str> = domain.split('.').collect();
  let n = labels.len();
  if n < 2 {
    return false;
  }
  let tld = labels[n - 1];
  let (commercial, name) = if n >= 3 && SECOND_LEVEL_LABELS.contains(&labels[n - 2]) {
    (matches!(labels[n - 2], "co" | "com"), labels[n - 3])
  } else {
    (matches!(tld, "com" | "co" | "biz" | "io"), labels[n - 2])
  };
  commercial && !WEBMAIL_PROVIDERS.contains(&name)
}
