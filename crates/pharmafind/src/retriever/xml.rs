//! Decoding of PubMed `efetch` XML.
//!
//! The document is first folded into a JSON tree (attributes as `@name`, text as `$text`,
//! repeated children as arrays), then each `PubmedArticle` is read into a [`RawRecord`] by path.
//! Inline markup such as `<i>` or `<sup>` inside titles and affiliations is merged into the
//! surrounding text.

use quick_xml::{
  events::{BytesStart, Event},
  Reader,
};
use serde_json::{Map, Value};

use super::*;

/// Elements that only style text and are flattened into their parent's text.
const INLINE_TAGS: &[&str] = &["i", "b", "u", "sup", "sub", "em", "strong", "mml:math", "math"];

/// Parses an efetch `PubmedArticleSet` document into raw records, in document order.
///
/// Articles without a `MedlineCitation` are still returned (with no id) so the normalizer can
/// report them; `PubmedBookArticle` entries are ignored.
pub fn parse_articles(xml: &str) -> Result<Vec<RawRecord>> {
  let tree = convert_to_json(xml)?;
  let records: Vec<RawRecord> = as_list(tree.pointer("/PubmedArticleSet/PubmedArticle"))
    .into_iter()
    .map(parse_article)
    .collect();
  trace!("Decoded {} articles from efetch response", records.len());
  Ok(records)
}

/// Folds an XML document into a JSON value.
pub fn convert_to_json(xml: &str) -> Result<Value> {
  let mut reader = Reader::from_str(xml);
  let mut stack: Vec<(String, Map<String, Value>)> = Vec::new();
  let mut current = Map::new();

  loop {
    match reader.read_event()? {
      Event::Start(ref e) => {
        let parent = std::mem::replace(&mut current, attributes(e));
        stack.push((tag_name(e), parent));
      },
      Event::Empty(ref e) => {
        let value = Value::Object(attributes(e));
        attach(&mut current, tag_name(e), value);
      },
      Event::Text(e) => {
        let text = match e.unescape() {
          Ok(text) => text.into_owned(),
          Err(_) => String::from_utf8_lossy(&e).into_owned(),
        };
        append_text(&mut current, &text);
      },
      Event::CData(e) => append_text(&mut current, &String::from_utf8_lossy(&e)),
      Event::End(_) => {
        let Some((tag, mut parent)) = stack.pop() else {
          continue;
        };
        let mut element = std::mem::replace(&mut current, Map::new());
        finish_text(&mut element);
        let value = if element.is_empty() {
          Value::String(String::new())
        } else if element.len() == 1 && element.contains_key("$text") {
          element.remove("$text").unwrap_or_default()
        } else {
          Value::Object(element)
        };

        match value {
          Value::String(text) if INLINE_TAGS.contains(&tag.as_str()) =>
            append_text(&mut parent, &text),
          value => attach(&mut parent, tag, value),
        }
        current = parent;
      },
      Event::Eof => break,
      _ => (),
    }
  }

  Ok(Value::Object(current))
}

/// The qualified element name.
fn tag_name(e: &BytesStart) -> String { String::from_utf8_lossy(e.name().as_ref()).into_owned() }

/// Attributes of an element as `@name` entries.
fn attributes(e: &BytesStart) -> Map<String, Value> {
  let mut map = Map::new();
  for attr in e.attributes().flatten() {
    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
    if let Ok(value) = attr.unescape_value() {
      map.insert(format!("@{key}"), Value::String(value.into_owned()));
    }
  }
  map
}

/// Adds a child value, turning repeated tags into arrays.
fn attach(parent: &mut Map<String, Value>, tag: String, value: Value) {
  match parent.get_mut(&tag) {
    Some(Value::Array(items)) => items.push(value),
    Some(existing) => {
      let first = existing.take();
      *existing = Value::Array(vec![first, value]);
    },
    None => {
      parent.insert(tag, value);
    },
  }
}

/// Appends a raw text fragment to an element's `$text`.
///
/// Whitespace-only fragments are dropped until the element has some real text, so indentation
/// between child elements never becomes content.
fn append_text(element: &mut Map<String, Value>, text: &str) {
  match element.get_mut("$text") {
    Some(Value::String(existing)) => existing.push_str(text),
    _ if text.trim().is_empty() => (),
    _ => {
      element.insert("$text".to_string(), Value::String(text.to_string()));
    },
  }
}

/// Collapses the whitespace of a finished element's `$text`, dropping it when blank.
fn finish_text(element: &mut Map<String, Value>) {
  if let Some(Value::String(text)) = element.get_mut("$text") {
    *text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
      element.remove("$text");
    }
  }
}

/// A value as a list: arrays as-is, single values as one element, nothing as empty.
fn as_list(value: Option<&Value>) -> Vec<&Value> {
  match value {
    Some(Value::Array(items)) => items.iter().collect(),
    Some(value) => vec![value],
    None => Vec::new(),
  }
}

/// The text of an element, whether or not it carried attributes.
fn text_of(value: Option<&Value>) -> Option<String> {
  let text = match value? {
    Value::String(text) => text.as_str(),
    Value::Object(map) => map.get("$text")?.as_str()?,
    _ => return None,
  };
  let text = text.trim();
  (!text.is_empty()).then(|| text.to_string())
}

/// Reads one `PubmedArticle`.
fn parse_article(article: &Value) -> RawRecord {
  let citation = article.get("MedlineCitation");
  let body = citation.and_then(|c| c.get("Article"));
  let field = |path: &str| body.and_then(|b| b.pointer(path));

  let id = text_of(citation.and_then(|c| c.get("PMID")));
  let pub_date = field("/Journal/JournalIssue/PubDate");

  RawRecord {
    title: text_of(field("/ArticleTitle")),
    pub_date: pub_date.map(partial_date).filter(|date| !date.is_empty()),
    medline_date: text_of(pub_date.and_then(|d| d.get("MedlineDate"))),
    article_date: as_list(field("/ArticleDate")).first().map(|d| partial_date(d)),
    authors: as_list(field("/AuthorList/Author")).into_iter().filter_map(parse_author).collect(),
    id,
  }
}

/// Reads a `Year`/`Month`/`Day` element group.
fn partial_date(date: &Value) -> PartialDate {
  PartialDate {
    year:  text_of(date.get("Year")),
    month: text_of(date.get("Month")),
    day:   text_of(date.get("Day")),
  }
}

/// Reads one `Author`; entries with neither a personal nor a collective name are dropped.
fn parse_author(author: &Value) -> Option<RawAuthor> {
  let last = text_of(author.get("LastName"));
  let fore = text_of(author.get("ForeName"));
  let name = match (fore, last) {
    (Some(fore), Some(last)) => format!("{fore} {last}"),
    (None, Some(last)) => last,
    _ => text_of(author.get("CollectiveName"))?,
  };

  let affiliations: Vec<String> = as_list(author.get("AffiliationInfo"))
    .into_iter()
    .filter_map(|info| text_of(info.get("Affiliation")))
    .collect();

  let email = as_list(author.get("Identifier"))
    .into_iter()
    .find(|identifier| identifier.get("@Source").and_then(Value::as_str) == Some("Email"))
    .and_then(|identifier| text_of(Some(identifier)));

  Some(RawAuthor {
    name,
    affiliation: (!affiliations.is_empty()).then(|| affiliations.join("; ")),
    email,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  const ARTICLE_SET: &str = r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">38000002</PMID>
      <Article PubModel="Print">
        <Journal>
          <JournalIssue CitedMedium="Internet">
            <PubDate><Year>2023</Year><Month>Nov</Month></PubDate>
          </JournalIssue>
        </Journal>
        <ArticleTitle>Targeting <i>KRAS</i> G12C &amp; beyond.</ArticleTitle>
        <AuthorList CompleteYN="Y">
          <Author ValidYN="Y">
            <LastName>Roe</LastName>
            <ForeName>John</ForeName>
            <Initials>J</Initials>
            <Identifier Source="ORCID">0000-0001-2345-6789</Identifier>
            <Identifier Source="Email">john.roe@pfizer.com</Identifier>
            <AffiliationInfo><Affiliation>Pfizer Inc., Groton, CT, USA.</Affiliation></AffiliationInfo>
            <AffiliationInfo><Affiliation>Yale University, New Haven, CT, USA.</Affiliation></AffiliationInfo>
          </Author>
          <Author ValidYN="Y">
            <CollectiveName>KRAS Study Group</CollectiveName>
          </Author>
          <Author ValidYN="Y">
            <Initials>X</Initials>
          </Author>
        </AuthorList>
        <ArticleDate DateType="Electronic"><Year>2023</Year><Month>10</Month><Day>02</Day></ArticleDate>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">38000001</PMID>
      <Article>
        <Journal><JournalIssue><PubDate><MedlineDate>2023 Jul-Aug</MedlineDate></PubDate></JournalIssue></Journal>
        <ArticleTitle>Single author paper</ArticleTitle>
        <AuthorList>
          <Author><LastName>Doe</LastName><AffiliationInfo><Affiliation>Harvard University</Affiliation></AffiliationInfo></Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedBookArticle><BookDocument><PMID>1</PMID></BookDocument></PubmedBookArticle>
</PubmedArticleSet>"#;

  #[test]
  fn test_parse_articles() {
    let records = parse_articles(ARTICLE_SET).unwrap();
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.id.as_deref(), Some("38000002"));
    assert_eq!(first.title.as_deref(), Some("Targeting KRAS G12C & beyond."));
    assert_eq!(
      first.pub_date,
      Some(PartialDate { year: Some("2023".into()), month: Some("Nov".into()), day: None })
    );
    assert_eq!(first.article_date, Some(PartialDate::ymd("2023", "10", "02")));
    assert_eq!(first.authors.len(), 2);
    assert_eq!(first.authors[0].name, "John Roe");
    assert_eq!(
      first.authors[0].affiliation.as_deref(),
      Some("Pfizer Inc., Groton, CT, USA.; Yale University, New Haven, CT, USA.")
    );
    assert_eq!(first.authors[0].email.as_deref(), Some("john.roe@pfizer.com"));
    assert_eq!(first.authors[1], RawAuthor::new("KRAS Study Group"));

    let second = &records[1];
    assert_eq!(second.id.as_deref(), Some("38000001"));
    assert_eq!(second.pub_date, None);
    assert_eq!(second.medline_date.as_deref(), Some("2023 Jul-Aug"));
    assert_eq!(second.authors, vec![RawAuthor::new("Doe").with_affiliation("Harvard University")]);
  }

  #[test]
  fn test_empty_set() {
    assert!(parse_articles("<PubmedArticleSet></PubmedArticleSet>").unwrap().is_empty());
    assert!(parse_articles("<PubmedArticleSet/>").unwrap().is_empty());
  }

  #[test]
  fn test_article_without_citation() {
    let records =
      parse_articles("<PubmedArticleSet><PubmedArticle><PubmedData/></PubmedArticle></PubmedArticleSet>")
        .unwrap();
    assert_eq!(records, vec![RawRecord::default()]);
  }

  #[test]
  fn test_malformed_xml() {
    assert!(parse_articles("<PubmedArticleSet><PubmedArticle></Wrong></PubmedArticleSet>").is_err());
  }

  #[test]
  fn test_repeated_children_become_arrays() {
    let json = convert_to_json("<a x=\"1\"><item>one</item><item>two</item><c/></a>").unwrap();
    assert_eq!(json.pointer("/a/@x"), Some(&Value::String("1".into())));
    assert_eq!(json.pointer("/a/item/1"), Some(&Value::String("two".into())));
    assert_eq!(json.pointer("/a/c"), Some(&Value::Object(Map::new())));
  }

  #[test]
  fn test_markup_in_title_is_flattened() {
    let json = convert_to_json(
      "<ArticleTitle><b>Bold</b> claims about <b>drug X</b> in <i>E. coli</i>.</ArticleTitle>",
    )
    .unwrap();
    assert_eq!(
      json.pointer("/ArticleTitle"),
      Some(&Value::String("Bold claims about drug X in E. coli.".into()))
    );
  }
}
