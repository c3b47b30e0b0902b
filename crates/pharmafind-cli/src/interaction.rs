//! Everything the user sees on the terminal.

use console::{style, Term};
use pharmafind::{publication::Publication, table::ResultTable};

use super::*;

/// Prefix for information messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for warning messages
pub static WARNING_PREFIX: &str = "! ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";
/// Branch character for field lines
pub static TREE_BRANCH: &str = "├";
/// Leaf character for the last field line
pub static TREE_LEAF: &str = "└";

/// Something to show the user.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// Every publication of a table
  Table(&'a ResultTable),
  /// A completed step
  Success(&'a str),
  /// Progress or neutral information
  Info(&'a str),
  /// Something the user may want to look at
  Warning(&'a str),
  /// A fatal error, written to stderr
  Error(&'a CliError),
}

/// Output channel of the CLI.
pub trait UserInteraction {
  /// Shows one piece of content.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

/// Styled output on stdout, errors on stderr.
pub struct Terminal {
  /// Regular output
  out: Term,
  /// Error output
  err: Term,
}

impl Default for Terminal {
  fn default() -> Self { Self { out: Term::stdout(), err: Term::stderr() } }
}

impl Terminal {
  /// Writes the labelled block of one publication.
  fn publication(&self, publication: &Publication) -> Result<()> {
    self.out.write_line(&format!(
      "{} {}",
      style(&publication.id).cyan().bold(),
      style(&publication.title).bold()
    ))?;

    let email = publication.corresponding_author_email.as_deref().unwrap_or("");
    let fields = [
      ("Publication Date", publication.publication_date.clone()),
      ("Non-academic Author(s)", publication.joined_authors()),
      ("Company Affiliation(s)", publication.joined_companies()),
      ("Corresponding Author Email", email.to_string()),
    ];
    for (i, (label, value)) in fields.iter().enumerate() {
      let branch = if i + 1 == fields.len() { TREE_LEAF } else { TREE_BRANCH };
      self.out.write_line(&format!(
        "{} {}: {}",
        style(branch).dim(),
        style(label).dim(),
        if label.starts_with("Company") { style(value).yellow() } else { style(value) }
      ))?;
    }
    Ok(())
  }
}

impl UserInteraction for Terminal {
  fn reply(&self, content: ResponseContent) -> Result<()> {
    match content {
      ResponseContent::Table(table) => {
        for (i, publication) in table.iter().enumerate() {
          if i > 0 {
            self.out.write_line("")?;
          }
          self.publication(publication)?;
        }
      },
      ResponseContent::Success(message) =>
        self.out.write_line(&format!("{} {}", style(SUCCESS_PREFIX).green(), message))?,
      ResponseContent::Info(message) =>
        self.out.write_line(&format!("{} {}", style(INFO_PREFIX).cyan(), message))?,
      ResponseContent::Warning(message) =>
        self.out.write_line(&format!("{} {}", style(WARNING_PREFIX).yellow(), message))?,
      ResponseContent::Error(error) =>
        self.err.write_line(&format!("{} {}", style(ERROR_PREFIX).red(), style(error).red()))?,
    }
    Ok(())
  }
}
