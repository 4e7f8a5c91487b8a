//! Error and gap types for the papermeta library.
//!
//! Failures come in two weights:
//! - A [`ScrapeError`] aborts extraction for a record. The primary page could not be fetched, the
//!   site is not supported, the tag is unknown, the caller cancelled, or something unexpected
//!   happened inside an extractor.
//! - A [`PartialExtraction`] is a field-level gap. One section of the page was missing, an anchor
//!   match was ambiguous, or a best-effort lookup failed. Gaps never abort the remaining fields;
//!   they are logged and handed back to the caller alongside the scraped record.
//!
//! # Examples
//!
//! ```no_run
//! use papermeta::{config::Config, errors::ScrapeError, Dispatcher, PaperRecord, ScrapeOutcome};
//!
//! # async fn example() -> Result<(), ScrapeError> {
//! let dispatcher = Dispatcher::new(Config::default())?;
//! let mut record = PaperRecord::new("2301.07041", "ArXiv")
//!   .with_abstract_page_url("https://arxiv.org/abs/2301.07041");
//!
//! match dispatcher.scrape_metadata(&mut record).await {
//!   ScrapeOutcome::Failed(ScrapeError::FetchFailed { url, status }) => {
//!     println!("{url} answered with HTTP {status}")
//!   },
//!   ScrapeOutcome::Failed(e) => println!("Other error: {e}"),
//!   ScrapeOutcome::Scraped(gaps) => {
//!     for gap in gaps {
//!       println!("Missing: {gap}");
//!     }
//!   },
//!   ScrapeOutcome::NotAttempted => {},
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

use super::*;

/// Errors that abort metadata extraction for a single record.
#[derive(Error, Debug)]
pub enum ScrapeError {
  /// The primary abstract page answered with something other than HTTP 200.
  #[error("Cannot connect to {url} (HTTP {status})")]
  FetchFailed {
    /// The abstract page URL that was requested
    url:    String,
    /// The status code the server answered with
    status: u16,
  },

  /// The record points at a site whose extractor has not been written.
  #[error("{0} scraper is not implemented yet")]
  NotSupported(SourceSite),

  /// The record's source tag does not name any known site.
  #[error("Invalid source website: '{0}'")]
  UnknownSource(String),

  /// An unexpected failure inside an extractor, caught at the dispatch boundary.
  ///
  /// The wrapped error is the raw cause, typically a transport failure on the primary fetch.
  #[error("Error while scraping {site} paper '{paper_id}': {source}")]
  ExtractionFailed {
    /// The site whose extractor failed
    site:     SourceSite,
    /// The identifier of the paper being scraped
    paper_id: String,
    /// The underlying cause
    #[source]
    source:   Box<ScrapeError>,
  },

  /// The caller cancelled the extraction between two network calls.
  #[error("Extraction cancelled")]
  Cancelled,

  /// A network request failed before a status code was received.
  ///
  /// This covers DNS, TLS and connection failures as well as timeouts.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// A configured or scraped URL could not be parsed.
  #[error(transparent)]
  InvalidUrl(#[from] url::ParseError),
}

impl ScrapeError {
  /// Wraps unexpected causes into [`ScrapeError::ExtractionFailed`].
  ///
  /// Errors that already belong to the reported taxonomy are passed through unchanged.
  pub(crate) fn at_boundary(self, site: SourceSite, paper_id: &str) -> Self {
    match self {
      e @ (ScrapeError::FetchFailed { .. }
      | ScrapeError::NotSupported(_)
      | ScrapeError::UnknownSource(_)
      | ScrapeError::ExtractionFailed { .. }
      | ScrapeError::Cancelled) => e,
      e =>
        ScrapeError::ExtractionFailed { site, paper_id: paper_id.to_owned(), source: Box::new(e) },
    }
  }
}

/// The record fields an extractor can fail to populate.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Field {
  /// [`PaperRecord::title`]
  Title,
  /// [`PaperRecord::authors`]
  Authors,
  /// [`PaperRecord::abstract_text`]
  Abstract,
  /// [`PaperRecord::bibtex`]
  Bibtex,
  /// [`PaperRecord::official_code_urls`] and [`PaperRecord::paperswithcode_url`]
  CodeLinks,
  /// [`PaperRecord::pdf_url`]
  PdfUrl,
  /// [`PaperRecord::doi_url`]
  DoiUrl,
  /// [`PaperRecord::supplementary_url`]
  SupplementaryUrl,
  /// [`PaperRecord::download_filename`]
  DownloadFilename,
}

impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Field::Title => "title",
      Field::Authors => "authors",
      Field::Abstract => "abstract",
      Field::Bibtex => "bibtex",
      Field::CodeLinks => "code links",
      Field::PdfUrl => "pdf url",
      Field::DoiUrl => "doi url",
      Field::SupplementaryUrl => "supplementary url",
      Field::DownloadFilename => "download filename",
    };
    f.write_str(name)
  }
}

/// Why a field was left empty.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum GapReason {
  /// The section holding the field is absent from the page.
  Missing,
  /// The section exists but its markup does not have the expected shape.
  UnexpectedStructure,
  /// More than one anchor matched where exactly one was required.
  Ambiguous(usize),
  /// A link was found but could not be turned into an absolute URL.
  UnresolvedLink(String),
  /// A best-effort request did not succeed. Carries the URL and the reason.
  FetchFailed(String),
  /// A best-effort response could not be decoded.
  Malformed(String),
}

impl fmt::Display for GapReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GapReason::Missing => write!(f, "section not found"),
      GapReason::UnexpectedStructure => write!(f, "unexpected markup structure"),
      GapReason::Ambiguous(count) => write!(f, "{count} candidates, expected exactly one"),
      GapReason::UnresolvedLink(link) => write!(f, "unresolved link '{link}'"),
      GapReason::FetchFailed(detail) => write!(f, "request failed: {detail}"),
      GapReason::Malformed(detail) => write!(f, "malformed response: {detail}"),
    }
  }
}

/// A non-fatal, field-level gap in an otherwise successful extraction.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PartialExtraction {
  /// The field that was left empty
  pub field:  Field,
  /// Why it was left empty
  pub reason: GapReason,
}

impl fmt::Display for PartialExtraction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.field, self.reason)
  }
}

/// Collects the gaps of one extraction and logs each as it is recorded.
#[derive(Debug, Default)]
pub struct Gaps {
  /// Identifier of the paper the gaps belong to, used as log context
  paper_id: String,
  /// Gaps in the order they were found
  entries:  Vec<PartialExtraction>,
}

impl Gaps {
  /// Starts an empty collection for the given paper.
  pub fn new(paper_id: &str) -> Self {
    Self { paper_id: paper_id.to_owned(), entries: Vec::new() }
  }

  /// Records a gap and emits a warning for it.
  pub fn record(&mut self, field: Field, reason: GapReason) {
    warn!(paper_id = %self.paper_id, %field, "[Warn] Unable to retrieve {field}: {reason}");
    self.entries.push(PartialExtraction { field, reason });
  }

  /// Returns whether a gap was recorded for `field`.
  pub fn contains(&self, field: Field) -> bool {
    self.entries.iter().any(|gap| gap.field == field)
  }

  /// Consumes the collection, yielding the gaps in order.
  pub fn into_vec(self) -> Vec<PartialExtraction> { self.entries }
}
