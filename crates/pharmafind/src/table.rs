//! The result table and its delimited text export.
//!
//! A [`ResultTable`] keeps publications in the order their identifiers came back from the
//! search step. It writes and reads a CSV layout with a fixed column order:
//!
//! | PubmedID | Title | Publication Date | Non-academic Author(s) | Company Affiliation(s) | Corresponding Author Email |
//!
//! List columns are joined with [`LIST_SEPARATOR`].

use super::*;

/// Column headers of the CSV export, in order.
pub const HEADERS: [&str; 6] = [
  "PubmedID",
  "Title",
  "Publication Date",
  "Non-academic Author(s)",
  "Company Affiliation(s)",
  "Corresponding Author Email",
];

/// Ordered collection of qualifying publications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
  /// Publications in search order
  publications: Vec<Publication>,
}

/// One CSV row.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
  /// Publication identifier
  #[serde(rename = "PubmedID")]
  id:                         String,
  /// Title
  #[serde(rename = "Title")]
  title:                      String,
  /// Normalized date
  #[serde(rename = "Publication Date")]
  publication_date:           String,
  /// Joined author names
  #[serde(rename = "Non-academic Author(s)")]
  non_academic_authors:       String,
  /// Joined company names
  #[serde(rename = "Company Affiliation(s)")]
  company_affiliations:       String,
  /// Email or empty
  #[serde(rename = "Corresponding Author Email")]
  corresponding_author_email: String,
}

impl From<&Publication> for CsvRow {
  fn from(publication: &Publication) -> Self {
    Self {
      id:                         publication.id.clone(),
      title:                      publication.title.clone(),
      publication_date:           publication.publication_date.clone(),
      non_academic_authors:       publication.joined_authors(),
      company_affiliations:       publication.joined_companies(),
      corresponding_author_email: publication
        .corresponding_author_email
        .clone()
        .unwrap_or_default(),
    }
  }
}

impl From<CsvRow> for Publication {
  fn from(row: CsvRow) -> Self {
    Self {
      id:                         row.id,
      title:                      row.title,
      publication_date:           row.publication_date,
      non_academic_authors:       split_list(&row.non_academic_authors),
      company_affiliations:       split_list(&row.company_affiliations),
      corresponding_author_email: Some(row.corresponding_author_email)
        .filter(|email| !email.is_empty()),
    }
  }
}

impl ResultTable {
  /// Creates an empty table.
  pub fn new() -> Self { Self::default() }

  /// Appends a publication at the end of the table.
  pub fn push(&mut self, publication: Publication) { self.publications.push(publication) }

  /// Number of publications.
  pub fn len(&self) -> usize { self.publications.len() }

  /// Whether the table holds no publications.
  pub fn is_empty(&self) -> bool { self.publications.is_empty() }

  /// Iterates publications in table order.
  pub fn iter(&self) -> std::slice::Iter<'_, Publication> { self.publications.iter() }

  /// The publications as a slice.
  pub fn publications(&self) -> &[Publication] { &self.publications }

  /// Writes the table as CSV, header first, even when the table is empty.
  pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(HEADERS)?;
    for publication in &self.publications {
      writer.serialize(CsvRow::from(publication))?;
    }
    writer.flush()?;
    Ok(())
  }

  /// Renders the table as a CSV string.
  pub fn to_csv_string(&self) -> Result<String> {
    let mut buffer = Vec::new();
    self.write_csv(&mut buffer)?;
    String::from_utf8(buffer)
      .map_err(|e| PharmafindError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
  }

  /// Writes the CSV export to a file, replacing it if it exists.
  pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    debug!("Writing {} publications to {}", self.len(), path.display());
    self.write_csv(std::fs::File::create(path)?)
  }

  /// Parses a CSV export back into a table.
  pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = reader.headers()?.clone();
    if headers.iter().ne(HEADERS) {
      return Err(PharmafindError::InvalidArgument(format!(
        "Unexpected CSV header: {}",
        headers.iter().collect::<Vec<_>>().join(",")
      )));
    }
    reader
      .deserialize::<CsvRow>()
      .map(|row| Ok(Publication::from(row?)))
      .collect::<Result<Vec<_>>>()
      .map(|publications| Self { publications })
  }
}

impl FromIterator<Publication> for ResultTable {
  fn from_iter<I: IntoIterator<Item = Publication>>(iter: I) -> Self {
    Self { publications: iter.into_iter().collect() }
  }
}

impl IntoIterator for ResultTable {
  type IntoIter = std::vec::IntoIter<Publication>;
  type Item = Publication;

  fn into_iter(self) -> Self::IntoIter { self.publications.into_iter() }
}

impl<'a> IntoIterator for &'a ResultTable {
  type IntoIter = std::slice::Iter<'a, Publication>;
  type Item = &'a Publication;

  fn into_iter(self) -> Self::IntoIter { self.publications.iter() }
}

impl Display for ResultTable {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for (i, publication) in self.publications.iter().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      writeln!(f, "{publication}")?;
    }
    Ok(())
  }
}

/// Splits a joined list cell; an empty cell is an empty list.
fn split_list(cell: &str) -> Vec<String> {
  cell
    .split(LIST_SEPARATOR.trim())
    .map(str::trim)
    .filter(|item| !item.is_empty())
    .map(str::to_string)
    .collect()
}
