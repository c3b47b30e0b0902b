//! NCBI E-utilities client.
//!
//! `esearch` turns a query into PMIDs (JSON), `efetch` returns the full records (XML) in
//! batches. NCBI allows three requests per second without an API key and ten with one; batches
//! are spaced accordingly.

use std::time::Duration;

use url::Url;

use super::*;
use crate::config::EntrezConfig;

/// Pause between efetch batches without an API key.
const ANONYMOUS_DELAY: Duration = Duration::from_millis(340);

/// Pause between efetch batches with an API key.
const KEYED_DELAY: Duration = Duration::from_millis(110);

/// `esearch.fcgi` JSON response.
#[derive(Debug, Deserialize)]
struct ESearchResponse {
  /// Present on success and on query errors
  esearchresult: Option<ESearchResult>,
  /// Service-level failure such as an exceeded rate limit
  error:         Option<String>,
}

/// The `esearchresult` object.
#[derive(Debug, Deserialize)]
struct ESearchResult {
  /// Matching PMIDs, best first
  #[serde(default)]
  idlist: Vec<String>,
  /// Query rejected by the service
  #[serde(rename = "ERROR")]
  error:  Option<String>,
}

/// [`LiteratureSource`] backed by NCBI Entrez.
#[derive(Debug, Clone)]
pub struct EntrezClient {
  /// Service settings
  config: EntrezConfig,
  /// Shared HTTP connection pool
  client: reqwest::Client,
}

impl Default for EntrezClient {
  fn default() -> Self { Self::new(EntrezConfig::default()) }
}

impl EntrezClient {
  /// Creates a client for the given settings.
  pub fn new(config: EntrezConfig) -> Self { Self { config, client: reqwest::Client::new() } }

  /// The settings in use.
  pub fn config(&self) -> &EntrezConfig { &self.config }

  /// Pause between two efetch requests.
  pub fn request_delay(&self) -> Duration {
    match self.config.api_key {
      Some(_) => KEYED_DELAY,
      None => ANONYMOUS_DELAY,
    }
  }

  /// Builds the URL of an E-utility with the common parameters appended.
  fn endpoint(&self, utility: &str, params: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/{utility}", self.config.base_url.trim_end_matches('/')))?;
    {
      let mut query = url.query_pairs_mut();
      query.append_pair("db", &self.config.database);
      for (key, value) in params {
        query.append_pair(key, value);
      }
      query.append_pair("tool", &self.config.tool);
      if let Some(email) = &self.config.email {
        query.append_pair("email", email);
      }
      if let Some(api_key) = &self.config.api_key {
        query.append_pair("api_key", api_key);
      }
    }
    Ok(url)
  }

  /// Issues a GET and returns the body of a successful response.
  async fn get(&self, url: Url) -> Result<String> {
    trace!("GET {}", url.path());
    let response = self.client.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
  }

  /// Runs `esearch` and returns the id list.
  async fn esearch(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
    let retmax = max_results.to_string();
    let url =
      self.endpoint("esearch.fcgi", &[("term", query), ("retmax", &retmax), ("retmode", "json")])?;
    let body = self.get(url).await?;

    let response: ESearchResponse = serde_json::from_str(&body)?;
    let result = match (response.esearchresult, response.error) {
      (_, Some(error)) => return Err(PharmafindError::Search(error)),
      (Some(result), None) => result,
      (None, None) => return Err(PharmafindError::Search("response has no esearchresult".into())),
    };
    if let Some(error) = result.error {
      return Err(PharmafindError::Search(error));
    }

    let mut ids = result.idlist;
    ids.truncate(max_results);
    Ok(ids)
  }

  /// Runs one `efetch` request.
  async fn efetch(&self, ids: &[String]) -> Result<Vec<RawRecord>> {
    let joined = ids.join(",");
    let url = self.endpoint("efetch.fcgi", &[("id", &joined), ("retmode", "xml")])?;
    let body = self.get(url).await?;
    xml::parse_articles(&body)
  }
}

#[async_trait]
impl LiteratureSource for EntrezClient {
  async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
    info!("Searching {} for {:?}", self.config.database, query);
    let ids = self.esearch(query, max_results).await.map_err(|e| match e {
      PharmafindError::Search(_) => e,
      e => PharmafindError::Search(e.to_string()),
    })?;
    info!("Search returned {} ids", ids.len());
    Ok(ids)
  }

  async fn fetch(&self, ids: &[String]) -> Result<Vec<RawRecord>> {
    let batches: Vec<&[String]> = ids.chunks(self.config.batch_size.max(1)).collect();
    let mut records = Vec::with_capacity(ids.len());

    for (i, batch) in batches.iter().enumerate() {
      if i > 0 {
        tokio::time::sleep(self.request_delay()).await;
      }
      debug!("Fetching batch {}/{} ({} ids)", i + 1, batches.len(), batch.len());
      let fetched =
        self.efetch(batch).await.map_err(|e| PharmafindError::Fetch(e.to_string()))?;
      trace!("Batch {} yielded {} records", i + 1, fetched.len());
      records.extend(fetched);
    }
    Ok(records)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(config: EntrezConfig) -> EntrezClient { EntrezClient::new(config) }

  #[test]
  fn test_endpoint_parameters() {
    let config = EntrezConfig {
      base_url: "http://localhost:9000/eutils/".to_string(),
      email: Some("me@example.org".to_string()),
      api_key: Some("key".to_string()),
      ..EntrezConfig::default()
    };
    let url = client(config)
      .endpoint("esearch.fcgi", &[("term", "cancer AND pfizer[ad]"), ("retmode", "json")])
      .unwrap();

    assert_eq!(url.path(), "/eutils/esearch.fcgi");
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let get = |key: &str| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());
    assert_eq!(get("db"), Some("pubmed"));
    assert_eq!(get("term"), Some("cancer AND pfizer[ad]"));
    assert_eq!(get("tool"), Some("pharmafind"));
    assert_eq!(get("email"), Some("me@example.org"));
    assert_eq!(get("api_key"), Some("key"));
  }

  #[test]
  fn test_optional_parameters_are_omitted() {
    let url = EntrezClient::default().endpoint("efetch.fcgi", &[("id", "1,2")]).unwrap();
    assert!(url.as_str().starts_with(crate::config::DEFAULT_BASE_URL));
    assert!(!url.as_str().contains("email="));
    assert!(!url.as_str().contains("api_key="));
  }

  #[test]
  fn test_request_delay() {
    assert_eq!(EntrezClient::default().request_delay(), ANONYMOUS_DELAY);
    let keyed = client(EntrezConfig { api_key: Some("k".into()), ..EntrezConfig::default() });
    assert_eq!(keyed.request_delay(), KEYED_DELAY);
    assert_eq!(keyed.config().api_key.as_deref(), Some("k"));
  }

  #[test]
  fn test_invalid_base_url() {
    let bad = client(EntrezConfig { base_url: "not a url".into(), ..EntrezConfig::default() });
    assert!(matches!(bad.endpoint("esearch.fcgi", &[]), Err(PharmafindError::Url(_))));
  }

  #[traced_test]
  #[tokio::test]
  async fn test_empty_fetch_sends_nothing() {
    let offline = client(EntrezConfig {
      base_url: "http://127.0.0.1:1".into(),
      ..EntrezConfig::default()
    });
    assert!(offline.fetch(&[]).await.unwrap().is_empty());
    assert!(!logs_contain("Fetching batch"));
  }

  #[tokio::test]
  async fn test_unreachable_service_is_search_error() {
    let offline = client(EntrezConfig {
      base_url: "http://127.0.0.1:1".into(),
      ..EntrezConfig::default()
    });
    assert!(matches!(offline.search("aspirin", 5).await, Err(PharmafindError::Search(_))));
    assert!(matches!(offline.fetch(&["1".into()]).await, Err(PharmafindError::Fetch(_))));
  }
}
