//! Routing of paper records to the extractor for their source site.
//!
//! The [`Dispatcher`] is the only entry point callers need. It reads the record's source tag,
//! hands a working copy of the record to the matching extractor and writes the copy back only
//! when extraction succeeds. Every outcome, including failures, is returned as a
//! [`ScrapeOutcome`]; nothing is propagated as an error and nothing panics on bad input.
//!
//! # Examples
//!
//! ```no_run
//! use papermeta::{config::Config, Dispatcher, PaperRecord, ScrapeOutcome};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::new(Config::from_env())?;
//!
//! let mut records = vec![
//!   PaperRecord::new("2301.07041", "ArXiv")
//!     .with_abstract_page_url("https://arxiv.org/abs/2301.07041"),
//!   PaperRecord::new("1", "OpenReview")
//!     .with_abstract_page_url("https://openreview.net/forum?id=1"),
//! ];
//!
//! for record in &mut records {
//!   if let ScrapeOutcome::Failed(e) = dispatcher.scrape_metadata(record).await {
//!     eprintln!("{}: {e}", record.paper_id);
//!   }
//! }
//! # Ok(())
//! # }
//! ```

use super::*;
use crate::sites::{ArxivExtractor, CvfExtractor, EcvaExtractor};

/// The result of one [`Dispatcher::scrape_metadata`] call.
#[derive(Debug)]
pub enum ScrapeOutcome {
  /// The record was populated. Carries the field-level gaps, empty when every field was found.
  Scraped(Vec<PartialExtraction>),
  /// Extraction was aborted; the record was left untouched.
  Failed(ScrapeError),
  /// The record has no abstract page URL, or only a blank one, so nothing was fetched.
  NotAttempted,
}

impl ScrapeOutcome {
  /// Returns whether the record was populated.
  pub fn is_scraped(&self) -> bool { matches!(self, ScrapeOutcome::Scraped(_)) }

  /// The gaps of a successful extraction; empty for any other outcome.
  pub fn gaps(&self) -> &[PartialExtraction] {
    match self {
      ScrapeOutcome::Scraped(gaps) => gaps,
      _ => &[],
    }
  }

  /// The error of a failed extraction.
  pub fn error(&self) -> Option<&ScrapeError> {
    match self {
      ScrapeOutcome::Failed(e) => Some(e),
      _ => None,
    }
  }
}

/// Selects and runs the extractor for a record's source site.
///
/// A dispatcher holds one HTTP client and is meant to be reused across records. Concurrent calls
/// on distinct records are fine; each call touches only the record it was given.
#[derive(Debug, Clone)]
pub struct Dispatcher {
  /// Shared HTTP access
  fetcher: Fetcher,
  /// Extractor for arXiv abstract pages
  arxiv:   ArxivExtractor,
  /// Extractor for CVF paper pages
  cvf:     CvfExtractor,
  /// Extractor for ECVA paper pages
  ecva:    EcvaExtractor,
}

impl Dispatcher {
  /// Builds the HTTP client and the extractors from `config`.
  ///
  /// # Errors
  ///
  /// - [`ScrapeError::Network`] if the HTTP client cannot be built
  /// - [`ScrapeError::InvalidUrl`] if the configured ECVA root is not a URL
  pub fn new(config: Config) -> Result<Self, ScrapeError> {
    let fetcher = Fetcher::new(&config, CancellationToken::new())?;
    Ok(Self {
      fetcher,
      arxiv: ArxivExtractor::new(&config),
      cvf: CvfExtractor,
      ecva: EcvaExtractor::new(&config)?,
    })
  }

  /// Returns the token that cancels in-flight extractions.
  ///
  /// Cancellation is observed before each network request; extractions that have not yet
  /// issued their abstract page request fail with [`ScrapeError::Cancelled`], later ones
  /// stop before their next lookup.
  pub fn cancellation_token(&self) -> CancellationToken {
    self.fetcher.cancellation_token().clone()
  }

  /// Populates `record` with the metadata found on its abstract page.
  ///
  /// The record is modified only when the outcome is [`ScrapeOutcome::Scraped`].
  pub async fn scrape_metadata(&self, record: &mut PaperRecord) -> ScrapeOutcome {
    let Some(url) = record.abstract_page_url.clone().filter(|url| !url.trim().is_empty()) else {
      warn!(paper_id = %record.paper_id, "[Warn] No abstract URL");
      return ScrapeOutcome::NotAttempted;
    };

    let site = match record.site() {
      Ok(site) => site,
      Err(e) => {
        error!(paper_id = %record.paper_id, "[Error] {e}");
        return ScrapeOutcome::Failed(e);
      },
    };

    let mut working = record.clone();
    let result = match site {
      SourceSite::Arxiv => self.arxiv.scrape(&self.fetcher, &mut working, &url).await,
      SourceSite::CVF => self.cvf.scrape(&self.fetcher, &mut working, &url).await,
      SourceSite::ECVA => self.ecva.scrape(&self.fetcher, &mut working, &url).await,
      SourceSite::NeurIPS | SourceSite::OpenReview => Err(ScrapeError::NotSupported(site)),
    };

    match result {
      Ok(gaps) => {
        *record = working;
        let gaps = gaps.into_vec();
        info!(
          %site,
          paper_id = %record.paper_id,
          gaps = gaps.len(),
          "[Success] Retrieved metadata for \"{}\"",
          record.title
        );
        ScrapeOutcome::Scraped(gaps)
      },
      Err(e) => {
        let e = e.at_boundary(site, &record.paper_id);
        error!(%site, paper_id = %record.paper_id, %url, "[Error] {e}");
        ScrapeOutcome::Failed(e)
      },
    }
  }
}
