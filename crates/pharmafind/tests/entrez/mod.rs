use serde_json::json;
use wiremock::{
  matchers::{method, path, query_param},
  Mock, MockServer, ResponseTemplate,
};

use super::*;

fn client(server: &MockServer, batch_size: usize) -> EntrezClient {
  EntrezClient::new(EntrezConfig {
    base_url: server.uri(),
    email: Some("tests@example.org".to_string()),
    batch_size,
    ..EntrezConfig::default()
  })
}

async fn mount_search(server: &MockServer, ids: &[&str]) {
  Mock::given(method("GET"))
    .and(path("/esearch.fcgi"))
    .and(query_param("db", "pubmed"))
    .and(query_param("retmode", "json"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "header": { "type": "esearch", "version": "0.3" },
      "esearchresult": {
        "count": ids.len().to_string(),
        "retmax": ids.len().to_string(),
        "retstart": "0",
        "idlist": ids,
      }
    })))
    .mount(server)
    .await;
}

#[traced_test]
#[tokio::test]
async fn test_search_returns_ids() -> TestResult<()> {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/esearch.fcgi"))
    .and(query_param("term", "cancer immunotherapy"))
    .and(query_param("retmax", "2"))
    .and(query_param("tool", "pharmafind"))
    .and(query_param("email", "tests@example.org"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "esearchresult": { "count": "812", "idlist": ["38000003", "38000001"] }
    })))
    .expect(1)
    .mount(&server)
    .await;

  let ids = client(&server, 200).search("cancer immunotherapy", 2).await?;
  assert_eq!(ids, ["38000003", "38000001"]);
  Ok(())
}

#[tokio::test]
async fn test_search_without_hits() -> TestResult<()> {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/esearch.fcgi"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "esearchresult": { "count": "0", "retmax": "0", "idlist": [] }
    })))
    .mount(&server)
    .await;

  assert!(client(&server, 200).search("zzzz", 10).await?.is_empty());
  Ok(())
}

#[tokio::test]
async fn test_search_rejected_query() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/esearch.fcgi"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "esearchresult": { "ERROR": "Invalid query syntax" }
    })))
    .mount(&server)
    .await;

  match client(&server, 200).search("((", 10).await {
    Err(PharmafindError::Search(reason)) => assert_eq!(reason, "Invalid query syntax"),
    other => panic!("Expected a search error, got {other:?}"),
  }
}

#[tokio::test]
async fn test_search_rate_limited() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/esearch.fcgi"))
    .respond_with(ResponseTemplate::new(429).set_body_json(json!({
      "error": "API rate limit exceeded", "count": "11"
    })))
    .mount(&server)
    .await;

  let result = client(&server, 200).search("aspirin", 10).await;
  assert!(matches!(result, Err(PharmafindError::Search(_))));
}

#[tokio::test]
async fn test_fetch_decodes_articles() -> TestResult<()> {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/efetch.fcgi"))
    .and(query_param("id", "38000001,38000002,38000003"))
    .and(query_param("retmode", "xml"))
    .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_XML))
    .expect(1)
    .mount(&server)
    .await;

  let ids: Vec<String> = ["38000001", "38000002", "38000003"].map(String::from).to_vec();
  let records = client(&server, 200).fetch(&ids).await?;
  assert_eq!(records, parse_articles(EFETCH_XML)?);
  assert_eq!(records[2].title.as_deref(), Some("Anti-KRAS antibodies in solid tumours."));
  assert_eq!(records[0].authors[1].email.as_deref(), Some("john.roe@pfizer.com"));
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_fetch_in_batches() -> TestResult<()> {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/efetch.fcgi"))
    .and(query_param("id", "38000001,38000002"))
    .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_XML))
    .expect(1)
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/efetch.fcgi"))
    .and(query_param("id", "38000003"))
    .respond_with(
      ResponseTemplate::new(200).set_body_string("<PubmedArticleSet></PubmedArticleSet>"),
    )
    .expect(1)
    .mount(&server)
    .await;

  let ids: Vec<String> = ["38000001", "38000002", "38000003"].map(String::from).to_vec();
  let records = client(&server, 2).fetch(&ids).await?;
  assert_eq!(records.len(), 3);
  Ok(())
}

#[tokio::test]
async fn test_fetch_server_error() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/efetch.fcgi"))
    .respond_with(ResponseTemplate::new(500))
    .mount(&server)
    .await;

  let result = client(&server, 200).fetch(&["38000001".to_string()]).await;
  assert!(matches!(result, Err(PharmafindError::Fetch(_))));
}

#[tokio::test]
async fn test_fetch_unreadable_body() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/efetch.fcgi"))
    .respond_with(
      ResponseTemplate::new(200).set_body_string("<PubmedArticleSet><Oops></PubmedArticleSet>"),
    )
    .mount(&server)
    .await;

  let result = client(&server, 200).fetch(&["38000001".to_string()]).await;
  assert!(matches!(result, Err(PharmafindError::Fetch(_))));
}

#[traced_test]
#[tokio::test]
async fn test_fetch_and_process_against_entrez() -> TestResult<()> {
  let server = MockServer::start().await;
  mount_search(&server, &["38000003", "38000002", "38000001"]).await;
  Mock::given(method("GET"))
    .and(path("/efetch.fcgi"))
    .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_XML))
    .expect(1)
    .mount(&server)
    .await;

  let table = Fetcher::new(client(&server, 200)).fetch_and_process("oncology", 10).await?;
  let ids: Vec<&str> = table.iter().map(|p| p.id.as_str()).collect();
  assert_eq!(ids, ["38000003", "38000001"]);

  let genentech = &table.publications()[0];
  assert_eq!(genentech.title, "Anti-KRAS antibodies in solid tumours.");
  assert_eq!(genentech.publication_date, "2022 Nov-Dec");
  assert_eq!(genentech.non_academic_authors, ["Ann Lee"]);
  assert_eq!(genentech.company_affiliations, ["Genentech, Inc."]);
  assert_eq!(genentech.corresponding_author_email.as_deref(), Some("ann.lee@gene.com"));

  let pfizer = &table.publications()[1];
  assert_eq!(pfizer.publication_date, "2023-01-15");
  assert_eq!(pfizer.non_academic_authors, ["John Roe"]);
  assert_eq!(pfizer.company_affiliations, ["Pfizer Inc."]);
  assert_eq!(pfizer.corresponding_author_email.as_deref(), Some("john.roe@pfizer.com"));

  Ok(())
}
