//! Extractor for paper pages of the CVF open access archive (openaccess.thecvf.com).
//!
//! The PDF link on these pages is relative and its depth differs from one conference year to the
//! next, so no absolute URL can be derived from it reliably; `pdf_url` is never set here. The
//! supplementary material link, when there is exactly one, is taken verbatim.

use lazy_static::lazy_static;

use super::*;
use crate::html::{concatenated_text, find, selector, squash_newlines};

/// Position of the author line among the children of `#authors` when it is not in italics.
/// The first child is the label.
const AUTHORS_FALLBACK_POSITION: usize = 1;

/// Extractor for CVF paper pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct CvfExtractor;

impl CvfExtractor {
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
}

lazy_static! {
  static ref TITLE: Selector = selector("#papertitle");
  static ref ABSTRACT: Selector = selector("#abstract");
  static ref BIBREF: Selector = selector(".bibref");
}

impl SiteExtractor for CvfExtractor {
  const SITE: SourceSite = SourceSite::CVF;

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

    match find(&document, &ABSTRACT).map(|section| squash_newlines(&concatenated_text(section))) {
      Some(abstract_text) if !abstract_text.is_empty() => record.abstract_text = abstract_text,
      _ => gaps.record(Field::Abstract, GapReason::Missing),
    }

    match find(&document, &BIBREF).map(|section| concatenated_text(section).trim().to_owned()) {
      Some(bibtex) if !bibtex.is_empty() => record.bibtex = bibtex,
      _ => gaps.record(Field::Bibtex, GapReason::Missing),
    }

    if let Some(href) = unique_anchor(&document, "supp", Field::SupplementaryUrl, gaps) {
      record.supplementary_url = Some(href);
    }
  }
}

/// Splits a CVF author line on commas.
fn split_authors(line: &str) -> Vec<String> {
  line.split(',').map(str::trim).filter(|name| !name.is_empty()).map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  const PAGE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/cvf_paper.html"));

  fn parse(html: &str) -> (PaperRecord, Vec<PartialExtraction>) {
    let mut record = PaperRecord::new("Doe_Example_Paper_CVPR_2023", "CVF");
    let mut gaps = Gaps::new(&record.paper_id);
    CvfExtractor.parse_page(html, &mut record, &mut gaps);
    (record, gaps.into_vec())
  }

  #[traced_test]
  #[test]
  fn test_parse_fixture_page() {
    let (record, gaps) = parse(PAGE);

    assert!(gaps.is_empty(), "unexpected gaps: {gaps:?}");
    assert_eq!(record.title, "Learning to Segment Everything From Few Examples");
    assert_eq!(record.authors, vec!["Jane Doe", "John Smith", "Wei Zhang"]);
    assert!(record.abstract_text.starts_with("We present a method"));
    assert!(!record.abstract_text.contains('\n'));
    assert!(record.bibtex.starts_with("@InProceedings{Doe_2023_CVPR,"));
    assert!(record.bibtex.ends_with('}'));
    assert!(!record.bibtex.contains('\n'));
    assert_eq!(
      record.supplementary_url.as_deref(),
      Some("/content/CVPR2023/supplemental/Doe_Learning_to_Segment_CVPR_2023_supplemental.pdf")
    );
    assert!(record.pdf_url.is_none());
    assert!(record.download_filename.is_none());
  }

  #[test]
  fn test_supplementary_requires_unique_match() {
    let base = "<div id=\"papertitle\">T</div><div id=\"abstract\">A</div>";

    let (record, gaps) = parse(base);
    assert!(record.supplementary_url.is_none());
    assert!(!gaps.iter().any(|gap| gap.field == Field::SupplementaryUrl));

    let (record, _) = parse(&format!("{base}<a href=\"/s.pdf\">supp</a>"));
    assert_eq!(record.supplementary_url.as_deref(), Some("/s.pdf"));

    let (record, gaps) =
      parse(&format!("{base}<a href=\"/s1.pdf\">supp</a><a href=\"/s2.pdf\">supp</a>"));
    assert!(record.supplementary_url.is_none());
    assert!(gaps.contains(&PartialExtraction {
      field:  Field::SupplementaryUrl,
      reason: GapReason::Ambiguous(2),
    }));
  }

  #[traced_test]
  #[test]
  fn test_supplementary_anchor_without_href_still_counts() {
    let (record, gaps) =
      parse("<div id=\"papertitle\">T</div><a>supp</a><a href=\"/s.pdf\">supp</a>");

    assert!(record.supplementary_url.is_none());
    assert!(gaps.contains(&PartialExtraction {
      field:  Field::SupplementaryUrl,
      reason: GapReason::Ambiguous(2),
    }));
  }

  #[test]
  fn test_missing_sections_do_not_abort() {
    let (record, gaps) = parse("<div id=\"abstract\">\n  Only an abstract.\n</div>");

    assert_eq!(record.abstract_text, "Only an abstract.");
    assert!(record.title.is_empty());
    assert!(record.authors.is_empty());
    let fields = gaps.iter().map(|gap| gap.field).collect::<Vec<_>>();
    assert_eq!(fields, vec![Field::Title, Field::Authors, Field::Bibtex]);
  }

  #[test]
  fn test_split_authors() {
    assert_eq!(split_authors(" Jane Doe,John Smith , ,"), vec!["Jane Doe", "John Smith"]);
    assert!(split_authors("").is_empty());
  }
}
