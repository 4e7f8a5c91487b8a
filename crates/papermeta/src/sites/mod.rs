//! Extractor implementations for the supported publication sites.
//!
//! Each submodule knows where one site keeps its metadata:
//! - [`arxiv`] - Abstract pages on arxiv.org, enriched with BibTeX and Papers with Code links
//! - [`cvf`] - Paper pages of the CVF open access archive
//! - [`ecva`] - Paper pages of the ECVA archive
//!
//! All of them follow the same shape: one required fetch of the abstract page, a synchronous
//! [`SiteExtractor::parse_page`] pass over the parsed document in which every field is looked up
//! independently, and for arXiv a few best-effort lookups afterwards. The parsed document never
//! lives across an `.await`.
//!
//! # Examples
//!
//! ```
//! use papermeta::{
//!   errors::Gaps,
//!   sites::{ecva::EcvaExtractor, SiteExtractor},
//!   config::Config,
//!   PaperRecord,
//! };
//!
//! let html = r#"<div id="papertitle">A Paper</div>
//!   <div id="authors"><b><i>Jane Doe*, John Smith</i></b></div>
//!   <div id="abstract">"An abstract."</div>"#;
//!
//! let extractor = EcvaExtractor::new(&Config::default()).unwrap();
//! let mut record = PaperRecord::new("1", "ECVA");
//! let mut gaps = Gaps::new(&record.paper_id);
//! extractor.parse_page(html, &mut record, &mut gaps);
//!
//! assert_eq!(record.authors, vec!["Jane Doe", "John Smith"]);
//! ```

use lazy_static::lazy_static;

use super::*;
use crate::html::{child_strings, find, selector, trimmed_child_strings};

pub mod arxiv;
pub mod cvf;
pub mod ecva;

pub use arxiv::ArxivExtractor;
pub use cvf::CvfExtractor;
pub use ecva::EcvaExtractor;

/// The common capability of every site extractor: filling a record from an abstract page.
pub trait SiteExtractor {
  /// The site whose markup this extractor understands.
  const SITE: SourceSite;

  /// Reads every field available on the abstract page into `record`.
  ///
  /// Fields are looked up independently; a field that cannot be found is recorded in `gaps` and
  /// the remaining fields are still extracted.
  fn parse_page(&self, html: &str, record: &mut PaperRecord, gaps: &mut Gaps);
}

/// Fetches the abstract page at `url` and runs the extractor's page pass over it.
///
/// This is the only fatal step of every extraction.
pub(crate) async fn scrape_page<E: SiteExtractor>(
  extractor: &E,
  fetcher: &Fetcher,
  record: &mut PaperRecord,
  url: &str,
) -> Result<Gaps, ScrapeError> {
  debug!(site = %E::SITE, paper_id = %record.paper_id, "[Processing] Retrieving paper metadata...");
  let html = fetcher.required(url).await?;

  let mut gaps = Gaps::new(&record.paper_id);
  extractor.parse_page(&html, record, &mut gaps);
  Ok(gaps)
}

/// Returns the first non-empty text child of the element matching `selector`.
pub(crate) fn first_text(document: &Html, selector: &Selector) -> Option<String> {
  find(document, selector).and_then(|element| trimmed_child_strings(element).into_iter().next())
}

/// Reads the comma-separated author line of a CVF or ECVA paper page.
///
/// Both sites render the names in italics inside `#authors`; that named line is preferred. Pages
/// without it fall back to the child string at `fallback_position`.
pub(crate) fn author_line(document: &Html, fallback_position: usize) -> Result<String, GapReason> {
  lazy_static! {
    static ref AUTHORS: Selector = selector("#authors");
    static ref ITALIC: Selector = selector("i");
  }

  let container = find(document, &AUTHORS).ok_or(GapReason::Missing)?;

  let named = container
    .select(&ITALIC)
    .map(|line| line.text().collect::<String>().trim().to_owned())
    .find(|line| !line.is_empty());
  if let Some(line) = named {
    return Ok(line);
  }

  child_strings(container)
    .get(fallback_position)
    .map(|line| line.trim().to_owned())
    .filter(|line| !line.is_empty())
    .ok_or(GapReason::UnexpectedStructure)
}

/// Returns the link of the only anchor whose text is `text`.
///
/// No anchor leaves the field unset without complaint, since many papers simply have no such
/// artifact. Several anchors, with or without an `href`, are recorded as an
/// [`GapReason::Ambiguous`] gap on `field`; a single anchor without an `href` as
/// [`GapReason::Missing`].
pub(crate) fn unique_anchor(
  document: &Html,
  text: &str,
  field: Field,
  gaps: &mut Gaps,
) -> Option<String> {
  match html::anchors_with_text(document, text).as_slice() {
    [] => None,
    [Some(href)] => Some((*href).to_owned()),
    [None] => {
      gaps.record(field, GapReason::Missing);
      None
    },
    many => {
      gaps.record(field, GapReason::Ambiguous(many.len()));
      None
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_author_line_prefers_italics() {
    let document = Html::parse_document(
      r#"<div id="authors"><br><b><i>Jane Doe, John Smith</i></b>; CVPR 2023</div>"#,
    );
    assert_eq!(author_line(&document, 1).unwrap(), "Jane Doe, John Smith");
  }

  #[test]
  fn test_author_line_positional_fallback() {
    let document =
      Html::parse_document(r#"<div id="authors"><b>Authors:</b> Jane Doe, John Smith </div>"#);
    assert_eq!(author_line(&document, 1).unwrap(), "Jane Doe, John Smith");
    assert_eq!(author_line(&document, 0).unwrap(), "Authors:");
    assert_eq!(author_line(&document, 5), Err(GapReason::UnexpectedStructure));
  }

  #[test]
  fn test_author_line_missing_container() {
    let document = Html::parse_document("<div id=\"abstract\">text</div>");
    assert_eq!(author_line(&document, 0), Err(GapReason::Missing));
  }

  #[traced_test]
  #[test]
  fn test_unique_anchor() {
    let document = Html::parse_document(
      r#"<a href="/a.pdf">pdf</a><a href="/s1.zip">supp</a><a href="/s2.zip">supp</a>"#,
    );
    let mut gaps = Gaps::new("1");

    assert_eq!(unique_anchor(&document, "pdf", Field::PdfUrl, &mut gaps), Some("/a.pdf".into()));
    assert_eq!(unique_anchor(&document, "DOI", Field::DoiUrl, &mut gaps), None);
    assert!(gaps.into_vec().is_empty());

    let mut gaps = Gaps::new("1");
    assert_eq!(unique_anchor(&document, "supp", Field::SupplementaryUrl, &mut gaps), None);
    assert_eq!(gaps.into_vec(), vec![PartialExtraction {
      field:  Field::SupplementaryUrl,
      reason: GapReason::Ambiguous(2),
    }]);
  }

  #[traced_test]
  #[test]
  fn test_unique_anchor_counts_anchors_without_href() {
    let document = Html::parse_document(r#"<a>pdf</a><a>supp</a><a href="/s.pdf">supp</a>"#);
    let mut gaps = Gaps::new("1");

    assert_eq!(unique_anchor(&document, "pdf", Field::PdfUrl, &mut gaps), None);
    assert_eq!(unique_anchor(&document, "supp", Field::SupplementaryUrl, &mut gaps), None);
    assert_eq!(gaps.into_vec(), vec![
      PartialExtraction { field: Field::PdfUrl, reason: GapReason::Missing },
      PartialExtraction { field: Field::SupplementaryUrl, reason: GapReason::Ambiguous(2) },
    ]);
  }
}
