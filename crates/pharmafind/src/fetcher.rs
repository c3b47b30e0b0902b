//! Search, fetch, normalize.
//!
//! [`Fetcher`] drives one query end to end: it asks its [`LiteratureSource`] for identifiers,
//! fetches the records, normalizes each one, and assembles the qualifying publications in the
//! order the search returned them. Collaborator failures abort the call; a single bad record
//! only shows up in [`Harvest::skipped`].

use super::*;

/// Everything a run produced, including what was left out and why.
#[derive(Debug, Default)]
pub struct Harvest {
  /// Qualifying publications in search order
  pub table:   ResultTable,
  /// Records that were fetched but did not make it into the table
  pub skipped: Vec<Skip>,
  /// Identifiers the source returned no record for
  pub missing: Vec<String>,
}

/// Orchestrates a [`LiteratureSource`] and a [`Normalizer`].
#[derive(Debug, Clone)]
pub struct Fetcher<S> {
  /// Where identifiers and records come from
  source:     S,
  /// Applied to every fetched record
  normalizer: Normalizer,
}

impl<S: LiteratureSource> Fetcher<S> {
  /// Creates a fetcher using the built-in classifier.
  pub fn new(source: S) -> Self { Self { source, normalizer: Normalizer::default() } }

  /// Replaces the classifier, e.g. one built from
  /// [`ClassifierConfig`](crate::config::ClassifierConfig).
  pub fn with_classifier(mut self, classifier: Classifier) -> Self {
    self.normalizer = Normalizer::new(classifier);
    self
  }

  /// The underlying source.
  pub fn source(&self) -> &S { &self.source }

  /// Returns the publications for `query` that have at least one non-academic author.
  ///
  /// The table is empty, not an error, when nothing matches or nothing qualifies.
  ///
  /// # Errors
  ///
  /// - [`PharmafindError::InvalidArgument`] for a blank query or `max_results == 0`
  /// - [`PharmafindError::Search`] / [`PharmafindError::Fetch`] from the source
  pub async fn fetch_and_process(&self, query: &str, max_results: usize) -> Result<ResultTable> {
    Ok(self.harvest(query, max_results).await?.table)
  }

  /// Like [`Fetcher::fetch_and_process`], but also reports skipped records and missing ids.
  pub async fn harvest(&self, query: &str, max_results: usize) -> Result<Harvest> {
    let query = query.trim();
    if query.is_empty() {
      return Err(PharmafindError::InvalidArgument("Query must not be empty".to_string()));
    }
    if max_results == 0 {
      return Err(PharmafindError::InvalidArgument("max_results must be at least 1".to_string()));
    }

    let mut seen = HashSet::new();
    let ids: Vec<String> = self
      .source
      .search(query, max_results)
      .await?
      .into_iter()
      .map(|id| id.trim().to_string())
      .filter(|id| !id.is_empty() && seen.insert(id.clone()))
      .take(max_results)
      .collect();
    debug!("Search for {:?} returned {} distinct ids", query, ids.len());

    if ids.is_empty() {
      info!("No records match {:?}", query);
      return Ok(Harvest::default());
    }

    let records = self.source.fetch(&ids).await?;
    debug!("Fetched {} records for {} ids", records.len(), ids.len());

    let mut harvest = Harvest::default();
    let mut by_id: HashMap<String, RawRecord> = HashMap::with_capacity(records.len());
    for record in records {
      match record.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) if !seen.contains(id) => trace!("Ignoring unrequested record {id}"),
        Some(id) => {
          by_id.entry(id.to_string()).or_insert(record);
        },
        None => self.record(&mut harvest, self.normalizer.process(&record)),
      }
    }

    for id in &ids {
      match by_id.remove(id) {
        Some(record) => self.record(&mut harvest, self.normalizer.process(&record)),
        None => {
          debug!("No record returned for {id}");
          harvest.missing.push(id.clone());
        },
      }
    }

    if !harvest.missing.is_empty() {
      warn!("{} of {} records were not available", harvest.missing.len(), ids.len());
    }
    info!("Found {} papers with non-academic authors", harvest.table.len());
    Ok(harvest)
  }

  /// Files one normalization outcome.
  fn record(&self, harvest: &mut Harvest, outcome: Outcome) {
    match outcome {
      Outcome::Qualified(publication) => harvest.table.push(publication),
      Outcome::Skipped(skip) => {
        match &skip {
          Skip::Malformed(e) => warn!("Skipping record: {e}"),
          Skip::NoNonAcademicAuthors { .. } => debug!("{skip}"),
        }
        harvest.skipped.push(skip);
      },
    }
  }
}
