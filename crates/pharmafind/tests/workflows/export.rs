use super::*;

#[tokio::test]
async fn test_csv_round_trip() -> TestResult<()> {
  let source = stub();
  let table = Fetcher::new(&source).fetch_and_process("oncology", 5).await?;

  let dir = tempdir()?;
  let path = dir.path().join("results.csv");
  table.save_csv(&path)?;

  let parsed = ResultTable::from_csv_reader(std::fs::File::open(&path)?)?;
  let tuples = |table: &ResultTable| {
    table
      .iter()
      .map(|p| (p.id.clone(), p.non_academic_authors.clone(), p.company_affiliations.clone()))
      .collect::<Vec<_>>()
  };
  assert_eq!(tuples(&parsed), tuples(&table));
  assert_eq!(parsed, table);
  Ok(())
}

#[tokio::test]
async fn test_empty_export_has_header_only() -> TestResult<()> {
  let table = Fetcher::new(StubSource::default()).fetch_and_process("nothing", 1).await?;
  let csv = table.to_csv_string()?;
  assert_eq!(
    csv.trim_end(),
    "PubmedID,Title,Publication Date,Non-academic Author(s),Company Affiliation(s),Corresponding \
     Author Email"
  );
  Ok(())
}

#[tokio::test]
async fn test_console_listing() -> TestResult<()> {
  let source = stub();
  let table = Fetcher::new(&source).fetch_and_process("oncology", 1).await?;
  assert_eq!(
    table.to_string(),
    "PubmedID: 5\n  Title: Paper 5\n  Publication Date: \n  Non-academic Author(s): Sam Poe\n  \
     Company Affiliation(s): Novartis Pharmaceuticals\n  Corresponding Author Email: \n"
  );
  Ok(())
}
