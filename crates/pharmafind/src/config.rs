//! Configuration for the Entrez client and the classifier.
//!
//! Read from TOML. Every field has a default, so an empty file (or no file at all) is valid:
//!
//! ```toml
//! [entrez]
//! base_url   = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils"
//! database   = "pubmed"
//! tool       = "pharmafind"
//! email      = "me@example.org"
//! api_key    = "0123456789abcdef"
//! batch_size = 200
//!
//! [classifier]
//! academic_keywords     = ["Sanatorium"]
//! industry_keywords     = ["Contract Research Organization"]
//! organization_suffixes = ["Biologics"]
//! ```

use super::*;

/// Base URL of NCBI's E-utilities.
pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Ids per efetch request.
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Environment variable consulted for [`EntrezConfig::api_key`].
pub const API_KEY_VAR: &str = "NCBI_API_KEY";

/// Environment variable consulted for [`EntrezConfig::email`].
pub const EMAIL_VAR: &str = "NCBI_EMAIL";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// E-utilities connection settings
  pub entrez:     EntrezConfig,
  /// Extra classifier keywords
  pub classifier: ClassifierConfig,
}

/// Connection settings for NCBI E-utilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntrezConfig {
  /// Service root, without the `esearch.fcgi`/`efetch.fcgi` endpoint
  pub base_url:   String,
  /// Entrez database name
  pub database:   String,
  /// Tool name reported to NCBI
  pub tool:       String,
  /// Contact address reported to NCBI
  pub email:      Option<String>,
  /// API key; raises the allowed request rate
  pub api_key:    Option<String>,
  /// Ids per efetch request
  pub batch_size: usize,
}

impl Default for EntrezConfig {
  fn default() -> Self {
    Self {
      base_url:   DEFAULT_BASE_URL.to_string(),
      database:   "pubmed".to_string(),
      tool:       "pharmafind".to_string(),
      email:      None,
      api_key:    None,
      batch_size: DEFAULT_BATCH_SIZE,
    }
  }
}

/// Keywords appended to the built-in classifier table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
  /// Extra [`Indicator::Academic`] keywords
  pub academic_keywords:     Vec<String>,
  /// Extra [`Indicator::Industry`] keywords
  pub industry_keywords:     Vec<String>,
  /// Extra [`Indicator::OrganizationSuffix`] keywords
  pub organization_suffixes: Vec<String>,
}

impl ClassifierConfig {
  /// Whether no extra keyword is configured.
  pub fn is_empty(&self) -> bool {
    self.academic_keywords.is_empty()
      && self.industry_keywords.is_empty()
      && self.organization_suffixes.is_empty()
  }

  /// Builds a classifier from the built-in table plus the configured keywords.
  pub fn build(&self) -> Result<Classifier> {
    let groups = [
      (&self.academic_keywords, Indicator::Academic),
      (&self.industry_keywords, Indicator::Industry),
      (&self.organization_suffixes, Indicator::OrganizationSuffix),
    ];
    groups.into_iter().try_fold(Classifier::default(), |classifier, (keywords, indicator)| {
      keywords.iter().try_fold(classifier, |classifier, keyword| {
        classifier.with_keyword(keyword, indicator)
      })
    })
  }
}

impl Config {
  /// `<config dir>/pharmafind/config.toml`, or `None` on platforms without a config dir.
  pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pharmafind").join("config.toml"))
  }

  /// Reads a configuration file. The file must exist.
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    debug!("Loading configuration from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(|e| {
      PharmafindError::Config(format!("Cannot read configuration {}: {e}", path.display()))
    })?;
    Ok(toml::from_str(&content)?)
  }

  /// Reads the file at [`Config::default_path`] when it exists, falling back to defaults.
  ///
  /// Environment overrides are applied in both cases.
  pub fn load_default() -> Result<Self> {
    let config = match Self::default_path().filter(|path| path.exists()) {
      Some(path) => Self::from_path(path)?,
      None => {
        debug!("No configuration file found, using defaults");
        Self::default()
      },
    };
    Ok(config.with_env())
  }

  /// Fills unset credentials from `NCBI_API_KEY` and `NCBI_EMAIL`.
  pub fn with_env(self) -> Self { self.with_env_from(|name| std::env::var(name).ok()) }

  /// Fills unset credentials from an arbitrary variable lookup.
  pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
    let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
    if self.entrez.api_key.is_none() {
      self.entrez.api_key = lookup(API_KEY_VAR);
    }
    if self.entrez.email.is_none() {
      self.entrez.email = lookup(EMAIL_VAR);
    }
    self
  }
}
