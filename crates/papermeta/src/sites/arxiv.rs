//! Extractor for arXiv abstract pages.
//!
//! Title, authors, abstract and comments are read from the abstract page
//! (e.g. https://arxiv.org/abs/2301.07041). Two best-effort lookups follow:
//! - the per-paper BibTeX endpoint (https://arxiv.org/bibtex/{id})
//! - the Papers with Code API (https://arxiv.paperswithcode.com/api/v0/papers/{id}), which lists
//!   official implementations and the paper's Papers with Code page
//!
//! Only the abstract page is required; a failing lookup leaves its fields empty.
//!
//! # Examples
//!
//! ```no_run
//! use papermeta::{config::Config, Dispatcher, PaperRecord};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::new(Config::default())?;
//! let mut record = PaperRecord::new("2301.07041", "ArXiv")
//!   .with_abstract_page_url("https://arxiv.org/abs/2301.07041");
//!
//! dispatcher.scrape_metadata(&mut record).await;
//! println!("Saving as: {:?}", record.download_filename);
//! # Ok(())
//! # }
//! ```

use lazy_static::lazy_static;

use super::*;
use crate::{
  format::normalize_title,
  html::{find, selector, squash_newlines, trimmed_child_strings},
};

/// Response of the Papers with Code lookup API.
///
/// Only the fields used here are modelled; the API returns many more.
#[derive(Debug, Deserialize)]
struct PaperswithcodeEntry {
  /// Repositories flagged as official implementations
  #[serde(default)]
  all_official: Option<Vec<Repository>>,
  /// The paper's page on paperswithcode.com
  #[serde(default)]
  paper_url:    Option<String>,
}

/// A code repository listed by Papers with Code.
#[derive(Debug, Deserialize)]
struct Repository {
  /// Repository URL
  #[serde(default)]
  url: Option<String>,
}

/// Extractor for arXiv abstract pages.
#[derive(Debug, Clone)]
pub struct ArxivExtractor {
  /// Base of the BibTeX endpoint; the paper id is appended.
  bibtex_url:             String,
  /// Base of the Papers with Code lookup API; the paper id is appended.
  paperswithcode_api_url: String,
}

impl ArxivExtractor {
  /// Creates an extractor using the endpoints from `config`.
  pub fn new(config: &Config) -> Self {
    Self {
      bibtex_url:             config.arxiv_bibtex_url.trim_end_matches('/').to_owned(),
      paperswithcode_api_url: config.paperswithcode_api_url.trim_end_matches('/').to_owned(),
    }
  }

  /// Scrapes the abstract page at `url`, then runs the best-effort lookups.
  ///
  /// # Errors
  ///
  /// Fails if the abstract page cannot be fetched or the caller cancels. Lookup failures are
  /// recorded as gaps instead.
  pub async fn scrape(
    &self,
    fetcher: &Fetcher,
    record: &mut PaperRecord,
    url: &str,
  ) -> Result<Gaps, ScrapeError> {
    let mut gaps = scrape_page(self, fetcher, record, url).await?;
    self.fetch_code_links(fetcher, record, &mut gaps).await?;
    self.fetch_bibtex(fetcher, record, &mut gaps).await?;
    Ok(gaps)
  }

  /// Looks up official implementations on Papers with Code.
  async fn fetch_code_links(
    &self,
    fetcher: &Fetcher,
    record: &mut PaperRecord,
    gaps: &mut Gaps,
  ) -> Result<(), ScrapeError> {
    record.official_code_urls = Vec::new();
    record.paperswithcode_url = None;

    let url = format!("{}/{}", self.paperswithcode_api_url, record.paper_id);
    let Some(body) = fetcher.optional_text(&url, Field::CodeLinks, gaps).await? else {
      return Ok(());
    };

    match serde_json::from_str::<PaperswithcodeEntry>(&body) {
      Ok(entry) => {
        record.official_code_urls = entry
          .all_official
          .unwrap_or_default()
          .into_iter()
          .filter_map(|repository| repository.url)
          .map(|url| url.trim().to_owned())
          .filter(|url| !url.is_empty())
          .collect();
        record.paperswithcode_url =
          entry.paper_url.map(|url| url.trim().to_owned()).filter(|url| !url.is_empty());
        debug!("Found {} official implementations", record.official_code_urls.len());
      },
      Err(e) => gaps.record(Field::CodeLinks, GapReason::Malformed(e.to_string())),
    }
    Ok(())
  }

  /// Fetches the paper's BibTeX entry.
  async fn fetch_bibtex(
    &self,
    fetcher: &Fetcher,
    record: &mut PaperRecord,
    gaps: &mut Gaps,
  ) -> Result<(), ScrapeError> {
    let url = format!("{}/{}", self.bibtex_url, record.paper_id);
    record.bibtex = fetcher
      .optional_text(&url, Field::Bibtex, gaps)
      .await?
      .map(|bibtex| bibtex.trim().to_owned())
      .unwrap_or_default();
    Ok(())
  }
}

impl SiteExtractor for ArxivExtractor {
  const SITE: SourceSite = SourceSite::Arxiv;

  fn parse_page(&self, html: &str, record: &mut PaperRecord, gaps: &mut Gaps) {
    let document = Html::parse_document(html);

    match parse_title(&document) {
      Some(title) => record.title = title,
      None => gaps.record(Field::Title, GapReason::Missing),
    }

    match parse_authors(&document) {
      Some(authors) => record.authors = authors,
      None => {
        record.authors = Vec::new();
        gaps.record(Field::Authors, GapReason::UnexpectedStructure);
      },
    }

    match parse_abstract(&document) {
      Some(abstract_text) => record.abstract_text = abstract_text,
      None => gaps.record(Field::Abstract, GapReason::Missing),
    }

    record.comments = parse_comments(&document);

    if !record.title.is_empty() {
      record.download_filename =
        Some(format!("{}_{}.pdf", record.paper_id, normalize_title(&record.title, None)));
    }
  }
}

/// Selectors for the sections of an arXiv abstract page.
struct Selectors {
  /// The title heading; its first child is the "Title:" descriptor
  title:         Selector,
  /// The author list; its first child is the "Authors:" descriptor
  authors:       Selector,
  /// The abstract; its first child is the "Abstract:" descriptor
  abstract_text: Selector,
  /// The comments cell of the metadata table, absent on many papers
  comments:      Selector,
}

lazy_static! {
  static ref SELECTORS: Selectors = Selectors {
    title:         selector("h1.title"),
    authors:       selector("div.authors"),
    abstract_text: selector("blockquote.abstract"),
    comments:      selector("td.tablecell.comments"),
  };
}

/// Takes the last text child of the title heading, which skips the "Title:" descriptor.
pub fn parse_title(document: &Html) -> Option<String> {
  let heading = find(document, &SELECTORS.title)?;
  trimmed_child_strings(heading).pop()
}

/// Reads the author names, dropping the leading descriptor and the comma separators.
///
/// Returns `None` when the author container is missing or holds no text children at all.
pub fn parse_authors(document: &Html) -> Option<Vec<String>> {
  let container = find(document, &SELECTORS.authors)?;
  let mut entries = trimmed_child_strings(container);
  if entries.is_empty() {
    return None;
  }
  entries.remove(0);
  entries.retain(|entry| entry != ",");
  Some(entries)
}

/// Takes the last text child of the abstract, joined onto one line.
pub fn parse_abstract(document: &Html) -> Option<String> {
  let blockquote = find(document, &SELECTORS.abstract_text)?;
  trimmed_child_strings(blockquote)
    .pop()
    .map(|text| squash_newlines(&text))
    .filter(|text| !text.is_empty())
}

/// Joins the comments cell into one line; an absent cell means no comments.
pub fn parse_comments(document: &Html) -> String {
  find(document, &SELECTORS.comments)
    .map(|cell| squash_newlines(&trimmed_child_strings(cell).join(" ")))
    .unwrap_or_default()
}
