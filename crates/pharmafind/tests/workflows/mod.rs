use super::*;

mod export;

fn stub() -> StubSource {
  StubSource::new(&["5", "4", "3", "2", "1"], vec![
    record("1", vec![
      RawAuthor::new("Jane Doe").with_affiliation("Harvard University"),
      RawAuthor::new("John Roe").with_affiliation("Pfizer Inc.").with_email("john.roe@pfizer.com"),
    ]),
    record("2", vec![RawAuthor::new("Kim Park").with_affiliation("Stanford University")]),
    record("3", vec![
      RawAuthor::new("Ann Lee").with_affiliation("Genentech, Inc., South San Francisco, CA"),
      RawAuthor::new("Bo Chen").with_affiliation("Eisai Co., Ltd., Tokyo, Japan"),
    ]),
    record("5", vec![
      RawAuthor::new("Sam Poe").with_affiliation("Dept. of Oncology, Novartis Pharmaceuticals, Basel")
    ]),
  ])
}

#[traced_test]
#[tokio::test]
async fn test_table_follows_search_order() -> TestResult<()> {
  let source = stub();
  let table = Fetcher::new(&source).fetch_and_process("oncology", 5).await?;

  let ids: Vec<&str> = table.iter().map(|p| p.id.as_str()).collect();
  assert_eq!(ids, ["5", "3", "1"]);
  assert_eq!(table.publications()[0].company_affiliations, ["Novartis Pharmaceuticals"]);
  assert_eq!(table.publications()[1].company_affiliations, ["Genentech, Inc.", "Eisai Co., Ltd."]);
  assert_eq!(table.publications()[1].corresponding_author_email, None);
  Ok(())
}

#[tokio::test]
async fn test_max_results_caps_the_search() -> TestResult<()> {
  let source = stub();
  let harvest = Fetcher::new(&source).harvest("oncology", 2).await?;

  assert_eq!(harvest.table.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), ["5"]);
  assert_eq!(harvest.missing, ["4"]);
  Ok(())
}

#[tokio::test]
async fn test_zero_hits_is_an_empty_table() -> TestResult<()> {
  let source = StubSource::default();
  let table = Fetcher::new(&source).fetch_and_process("nothing matches this", 10).await?;
  assert!(table.is_empty());
  assert_eq!(source.fetch_calls(), 0);
  Ok(())
}

#[tokio::test]
async fn test_nothing_qualifies() -> TestResult<()> {
  let source = StubSource::new(&["2"], stub().records);
  let harvest = Fetcher::new(&source).harvest("transplant", 10).await?;
  assert!(harvest.table.is_empty());
  assert_eq!(harvest.skipped.len(), 1);
  Ok(())
}

#[tokio::test]
async fn test_search_failure_is_fatal() {
  let source = StubSource { fail_search: true, ..stub() };
  let result = Fetcher::new(&source).fetch_and_process("oncology", 5).await;
  assert!(matches!(result, Err(PharmafindError::Search(_))));
  assert_eq!(source.fetch_calls(), 0);
}

#[tokio::test]
async fn test_fetch_failure_is_fatal() {
  let source = StubSource { fail_fetch: true, ..stub() };
  match Fetcher::new(&source).fetch_and_process("oncology", 5).await {
    Err(e @ PharmafindError::Fetch(_)) => {
      assert!(e.is_fatal());
      assert_eq!(e.to_string(), "Fetch failed: connection reset");
    },
    other => panic!("Expected a fetch error, got {other:?}"),
  }
}

#[tokio::test]
async fn test_decoded_records_flow_through() -> TestResult<()> {
  let source = StubSource::new(&["38000002", "38000001", "38000003"], parse_articles(EFETCH_XML)?);
  let table = Fetcher::new(Box::new(source)).fetch_and_process("oncology", 3).await?;
  assert_eq!(table.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), ["38000001", "38000003"]);
  Ok(())
}
