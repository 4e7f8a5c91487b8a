//! Paper records and source-site identification.
//!
//! A [`PaperRecord`] is created by the caller with the identity of a paper already known (its
//! id, the tag of the site hosting it and the URL of its abstract page) and is then filled in
//! by exactly one extractor. The record is plain data: it is serializable so that the component
//! downloading files can pick it up from wherever the caller stores it.
//!
//! # Examples
//!
//! ```
//! use papermeta::paper::{PaperRecord, SourceSite};
//!
//! let record = PaperRecord::new("136610001", SourceSite::ECVA.to_string())
//!   .with_abstract_page_url("https://www.ecva.net/papers/eccv_2022/papers_ECCV/html/1_ECCV_2022_paper.php")
//!   .with_year(2022)
//!   .with_venue("ECCV");
//!
//! assert_eq!(record.site().unwrap(), SourceSite::ECVA);
//! assert!(record.title.is_empty());
//! ```

use super::*;

/// The publication host a paper's metadata is drawn from.
///
/// This is a closed set: every variant either has an extractor or is explicitly reported as
/// unsupported by the [`Dispatcher`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum SourceSite {
  /// Abstract pages on arxiv.org
  Arxiv,
  /// The Computer Vision Foundation open access archive (CVPR, ICCV, WACV)
  CVF,
  /// The European Computer Vision Association archive (ECCV)
  ECVA,
  /// NeurIPS proceedings, not yet supported
  NeurIPS,
  /// OpenReview, not yet supported
  OpenReview,
}

impl SourceSite {
  /// Returns whether an extractor exists for this site.
  pub fn is_supported(&self) -> bool {
    matches!(self, SourceSite::Arxiv | SourceSite::CVF | SourceSite::ECVA)
  }
}

impl fmt::Display for SourceSite {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SourceSite::Arxiv => write!(f, "ArXiv"),
      SourceSite::CVF => write!(f, "CVF"),
      SourceSite::ECVA => write!(f, "ECVA"),
      SourceSite::NeurIPS => write!(f, "NeurIPS"),
      SourceSite::OpenReview => write!(f, "OpenReview"),
    }
  }
}

impl FromStr for SourceSite {
  type Err = ScrapeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match &s.trim().to_lowercase() as &str {
      "arxiv" => Ok(SourceSite::Arxiv),
      "cvf" => Ok(SourceSite::CVF),
      "ecva" => Ok(SourceSite::ECVA),
      "neurips" => Ok(SourceSite::NeurIPS),
      "openreview" => Ok(SourceSite::OpenReview),
      _ => Err(ScrapeError::UnknownSource(s.to_owned())),
    }
  }
}

/// A paper's identity plus the metadata scraped for it.
///
/// Identity fields are set by the caller; everything else starts empty and is populated by the
/// extractor for [`PaperRecord::source_site`]. Text fields use the empty string for "not
/// scraped", link fields use `None`.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
  /// The site-specific paper identifier (e.g. "2301.07041" on arXiv)
  pub paper_id:           String,
  /// The raw source-site tag, parsed into a [`SourceSite`] at dispatch time
  pub source_site:        String,
  /// URL of the paper's abstract page, if known
  pub abstract_page_url:  Option<String>,
  /// Publication year, required to name ECVA downloads
  pub year:               Option<u16>,
  /// Venue short name (e.g. "ECCV"), required to name ECVA downloads
  pub venue:              Option<String>,
  /// The paper's title
  pub title:              String,
  /// Author names in publication order
  pub authors:            Vec<String>,
  /// The paper's abstract on a single line
  pub abstract_text:      String,
  /// Free-form author comments (arXiv only)
  pub comments:           String,
  /// BibTeX entry for the paper
  pub bibtex:             String,
  /// Absolute URL of the paper's PDF
  pub pdf_url:            Option<String>,
  /// Absolute DOI link
  pub doi_url:            Option<String>,
  /// URL of the supplementary material
  pub supplementary_url:  Option<String>,
  /// Repositories listed as official implementations
  pub official_code_urls: Vec<String>,
  /// The paper's page on Papers with Code
  pub paperswithcode_url: Option<String>,
  /// File name the downloader should save the PDF under
  pub download_filename:  Option<String>,
}

impl PaperRecord {
  /// Creates a record carrying only the paper's identity.
  ///
  /// The tag is kept verbatim; it is only checked against the known sites when the record is
  /// dispatched, so that unknown tags can be reported rather than rejected up front.
  pub fn new(paper_id: impl Into<String>, source_site: impl Into<String>) -> Self {
    Self { paper_id: paper_id.into(), source_site: source_site.into(), ..Default::default() }
  }

  /// Sets the abstract page URL.
  pub fn with_abstract_page_url(mut self, url: impl Into<String>) -> Self {
    self.abstract_page_url = Some(url.into());
    self
  }

  /// Sets the publication year.
  pub fn with_year(mut self, year: u16) -> Self {
    self.year = Some(year);
    self
  }

  /// Sets the venue.
  pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
    self.venue = Some(venue.into());
    self
  }

  /// Parses the source-site tag.
  pub fn site(&self) -> Result<SourceSite, ScrapeError> { self.source_site.parse() }
}
