//! Extractor for paper pages of the ECVA archive (www.ecva.net).
//!
//! ECVA pages link their PDF and supplementary material with paths relative to the site root,
//! written as `../../../../papers/...`. Those are resolved against the configured ECVA root;
//! any other relative form is left unresolved and reported as a gap.

use lazy_static::lazy_static;
use url::Url;

use super::*;
use crate::{
  format::normalize_title,
  html::{concatenated_text, find, selector, squash_newlines},
};

/// Prefix of links relative to the ECVA site root.
const SITE_RELATIVE_PREFIX: &str = "../../../../";

/// Position of the author line among the children of `#authors` when it is not in italics.
const AUTHORS_FALLBACK_POSITION: usize = 0;

/// Extractor for ECVA paper pages.
#[derive(Debug, Clone)]
pub struct EcvaExtractor {
  /// Root that site-relative links are resolved against.
  root: Url,
}

impl EcvaExtractor {
  /// Creates an extractor resolving links against `config.ecva_root_url`.
  ///
  /// # Errors
  ///
  /// Returns [`ScrapeError::InvalidUrl`] if the configured root is not a valid URL.
  pub fn new(config: &Config) -> Result<Self, ScrapeError> {
    Ok(Self { root: Url::parse(&config.ecva_root_url)? })
  }

  /// Scrapes the paper page at `url`.
  ///
  /// # Errors
  ///
  /// Fails if the page cannot be fetched or the caller cancels.
  pub async fn scrape(
    &self,
    fetcher: &Fetcher,
    record: &mut PaperRecord,
    url: &str,
  ) -> Result<Gaps, ScrapeError> {
    scrape_page(self, fetcher, record, url).await
  }

  /// Rewrites a `../../../../`-relative link onto the ECVA root.
  ///
  /// Returns `None` for links of any other form.
  pub fn resolve(&self, href: &str) -> Option<String> {
    let rest = href.strip_prefix(SITE_RELATIVE_PREFIX)?;
    self.root.join(rest).ok().map(String::from)
  }

  /// Reads a root-relative link from the only anchor labelled `text`.
  fn relative_link(
    &self,
    document: &Html,
    text: &str,
    field: Field,
    gaps: &mut Gaps,
  ) -> Option<String> {
    let href = unique_anchor(document, text, field, gaps)?;
    let resolved = self.resolve(&href);
    if resolved.is_none() {
      gaps.record(field, GapReason::UnresolvedLink(href));
    }
    resolved
  }
}

lazy_static! {
  static ref TITLE: Selector = selector("#papertitle");
  static ref ABSTRACT: Selector = selector("#abstract");
}

impl SiteExtractor for EcvaExtractor {
  const SITE: SourceSite = SourceSite::ECVA;

  fn parse_page(&self, html: &str, record: &mut PaperRecord, gaps: &mut Gaps) {
    let document = Html::parse_document(html);

    match first_text(&document, &TITLE) {
      Some(title) => record.title = title,
      None => gaps.record(Field::Title, GapReason::Missing),
    }

    match author_line(&document, AUTHORS_FALLBACK_POSITION) {
      Ok(line) => record.authors = split_authors(&line),
      Err(reason) => gaps.record(Field::Authors, reason),
    }

    let abstract_text = find(&document, &ABSTRACT).map(|section| {
      let text = concatenated_text(section);
      squash_newlines(text.trim_matches(|c: char| c.is_whitespace() || c == '"'))
    });
    match abstract_text {
      Some(abstract_text) if !abstract_text.is_empty() => record.abstract_text = abstract_text,
      _ => gaps.record(Field::Abstract, GapReason::Missing),
    }

    if let Some(pdf_url) = self.relative_link(&document, "pdf", Field::PdfUrl, gaps) {
      record.pdf_url = Some(pdf_url);
    }

    if let Some(href) = unique_anchor(&document, "DOI", Field::DoiUrl, gaps) {
      match Url::parse(&href) {
        Ok(doi) if doi.scheme() == "https" => record.doi_url = Some(href),
        _ => gaps.record(Field::DoiUrl, GapReason::UnresolvedLink(href)),
      }
    }

    if let Some(supplementary_url) =
      self.relative_link(&document, "supplementary material", Field::SupplementaryUrl, gaps)
    {
      record.supplementary_url = Some(supplementary_url);
    }

    match download_filename(record) {
      Some(filename) => record.download_filename = Some(filename),
      None if !record.title.is_empty() => gaps.record(Field::DownloadFilename, GapReason::Missing),
      None => {},
    }
  }
}

/// Splits an ECVA author line on commas, dropping the `*` affiliation markers.
pub fn split_authors(line: &str) -> Vec<String> {
  line
    .split(',')
    .map(|name| name.trim_matches(|c: char| c.is_whitespace() || c == '*'))
    .filter(|name| !name.is_empty())
    .map(str::to_owned)
    .collect()
}

/// Builds `{year}_{venue}_{paper_id}_{title}.pdf` once all four parts are known.
fn download_filename(record: &PaperRecord) -> Option<String> {
  let year = record.year?;
  let venue = record.venue.as_deref().filter(|venue| !venue.is_empty())?;
  if record.paper_id.is_empty() || record.title.is_empty() {
    return None;
  }
  Some(format!("{year}_{venue}_{}_{}.pdf", record.paper_id, normalize_title(&record.title, None)))
}

#[cfg(test)]
mod tests {
  use super::*;

  const PAGE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/ecva_paper.html"));

  fn extractor() -> EcvaExtractor { EcvaExtractor::new(&Config::default()).unwrap() }

  fn parse(html: &str) -> (PaperRecord, Vec<PartialExtraction>) {
    let mut record = PaperRecord::new("136610001", "ECVA").with_year(2022).with_venue("ECCV");
    let mut gaps = Gaps::new(&record.paper_id);
    extractor().parse_page(html, &mut record, &mut gaps);
    (record, gaps.into_vec())
  }

  #[traced_test]
  #[test]
  fn test_parse_fixture_page() {
    let (record, gaps) = parse(PAGE);

    assert!(gaps.is_empty(), "unexpected gaps: {gaps:?}");
    assert_eq!(record.title, "Sparse Attention for Efficient Video Transformers");
    assert_eq!(record.authors, vec!["Jane Doe", "John Smith", "Marie Curie"]);
    assert!(record.abstract_text.starts_with("Video transformers"));
    assert!(record.abstract_text.ends_with("baselines."));
    assert!(!record.abstract_text.contains('\n'));
    assert_eq!(
      record.pdf_url.as_deref(),
      Some("https://www.ecva.net/papers/eccv_2022/papers_ECCV/papers/136610001.pdf")
    );
    assert_eq!(record.doi_url.as_deref(), Some("https://doi.org/10.1007/978-3-031-19775-8_1"));
    assert_eq!(
      record.supplementary_url.as_deref(),
      Some("https://www.ecva.net/papers/eccv_2022/papers_ECCV/papers/136610001-supp.pdf")
    );
    assert_eq!(
      record.download_filename.as_deref(),
      Some("2022_ECCV_136610001_Sparse_Attention_for_Efficient_Video_Transformers.pdf")
    );
  }

  #[test]
  fn test_resolve_relative_links() {
    let extractor = extractor();
    assert_eq!(
      extractor.resolve("../../../../papers/foo.pdf").as_deref(),
      Some("https://www.ecva.net/papers/foo.pdf")
    );
    assert_eq!(extractor.resolve("../../papers/foo.pdf"), None);
    assert_eq!(extractor.resolve("/papers/foo.pdf"), None);
    assert_eq!(extractor.resolve("https://elsewhere.org/foo.pdf"), None);
  }

  #[traced_test]
  #[test]
  fn test_unresolved_links_leave_fields_unset() {
    let (record, gaps) = parse(
      "<div id=\"papertitle\">T</div>\
       <a href=\"../../papers/foo.pdf\">pdf</a>\
       <a href=\"10.1007/xyz\">DOI</a>\
       <a href=\"papers/foo-supp.zip\">supplementary material</a>",
    );

    assert!(record.pdf_url.is_none());
    assert!(record.doi_url.is_none());
    assert!(record.supplementary_url.is_none());
    assert!(gaps.contains(&PartialExtraction {
      field:  Field::PdfUrl,
      reason: GapReason::UnresolvedLink("../../papers/foo.pdf".into()),
    }));
    assert!(gaps.iter().any(|gap| gap.field == Field::DoiUrl));
    assert!(gaps.iter().any(|gap| gap.field == Field::SupplementaryUrl));
    assert!(logs_contain("unresolved link"));
  }

  #[test]
  fn test_split_authors_strips_markers() {
    assert_eq!(split_authors("Jane Doe*, John Smith **"), vec!["Jane Doe", "John Smith"]);
    assert_eq!(split_authors("*Solo*"), vec!["Solo"]);
    assert!(split_authors(" , ").is_empty());
  }

  #[test]
  fn test_abstract_strips_quotes() {
    let (record, _) = parse("<div id=\"abstract\">\n\"Quoted\nabstract.\"\n</div>");
    assert_eq!(record.abstract_text, "Quoted abstract.");
  }

  #[traced_test]
  #[test]
  fn test_download_filename_needs_year_and_venue() {
    let mut record = PaperRecord::new("136610001", "ECVA");
    let mut gaps = Gaps::new(&record.paper_id);
    extractor().parse_page("<div id=\"papertitle\">Title</div>", &mut record, &mut gaps);

    assert_eq!(record.title, "Title");
    assert!(record.download_filename.is_none());
    assert!(gaps.contains(Field::DownloadFilename));
  }
}
