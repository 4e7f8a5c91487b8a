//! A library for scraping bibliographic metadata of academic papers from the sites that host
//! them, including arXiv, the CVF open access archive, and the ECVA archive.
//!
//! The caller hands over a [`PaperRecord`] carrying the paper's identity (id, source site tag and
//! abstract page URL) and the [`Dispatcher`] fills in title, authors, abstract, bibtex and
//! artifact links by fetching and parsing the site's pages.
//!
//! # Example
//! ```rust,no_run
//! use papermeta::{config::Config, Dispatcher, PaperRecord, ScrapeOutcome};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!   let dispatcher = Dispatcher::new(Config::default())?;
//!   let mut record = PaperRecord::new("2301.07041", "ArXiv")
//!     .with_abstract_page_url("https://arxiv.org/abs/2301.07041");
//!
//!   match dispatcher.scrape_metadata(&mut record).await {
//!     ScrapeOutcome::Scraped(_) => println!("Title: {}", record.title),
//!     ScrapeOutcome::Failed(e) => eprintln!("Failed: {e}"),
//!     ScrapeOutcome::NotAttempted => eprintln!("No abstract page to scrape"),
//!   }
//!
//!   Ok(())
//! }
//! ```

#![warn(missing_docs, clippy::missing_docs_in_private_items)]
use std::{fmt, str::FromStr};

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
#[cfg(test)] use tracing_test::traced_test;

pub mod config;
pub mod dispatch;
pub mod errors;
pub mod fetch;
pub mod format;
pub mod html;
pub mod paper;
pub mod sites;

use config::Config;
pub use dispatch::{Dispatcher, ScrapeOutcome};
use errors::{Field, GapReason, Gaps, PartialExtraction, ScrapeError};
use fetch::Fetcher;
pub use paper::{PaperRecord, SourceSite};
