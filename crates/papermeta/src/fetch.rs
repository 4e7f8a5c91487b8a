//! HTTP access for the extractors.
//!
//! Every request an extractor makes is either *required* or *optional*:
//! - [`Fetcher::required`] is used for the abstract page. Anything other than HTTP 200 aborts the
//!   extraction with [`ScrapeError::FetchFailed`].
//! - [`Fetcher::optional`] is used for enrichment lookups (BibTeX, code links). A failure is
//!   recorded as a gap on the affected field and the extraction carries on.
//!
//! Both check the fetcher's [`CancellationToken`] before issuing the request, so a cancelled
//! extraction stops between network calls rather than in the middle of one. Both run with the
//! timeouts from [`Config`].

use reqwest::{Response, StatusCode};

use super::*;

/// HTTP client shared by all extractors of a [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct Fetcher {
  /// Internal web client, configured with timeouts and user agent.
  client: reqwest::Client,
  /// Checked before every request.
  cancel: CancellationToken,
}

impl Fetcher {
  /// Builds the HTTP client from `config`.
  ///
  /// # Errors
  ///
  /// Returns [`ScrapeError::Network`] if the TLS backend cannot be initialized.
  pub fn new(config: &Config, cancel: CancellationToken) -> Result<Self, ScrapeError> {
    let client = reqwest::Client::builder()
      .user_agent(config.user_agent.as_str())
      .timeout(config.request_timeout)
      .connect_timeout(config.connect_timeout)
      .build()?;
    Ok(Self { client, cancel })
  }

  /// The token checked before every request.
  pub fn cancellation_token(&self) -> &CancellationToken { &self.cancel }

  /// Fails with [`ScrapeError::Cancelled`] once the token has been cancelled.
  fn ensure_active(&self, url: &str) -> Result<(), ScrapeError> {
    if self.cancel.is_cancelled() {
      debug!("Cancelled before requesting {url}");
      return Err(ScrapeError::Cancelled);
    }
    Ok(())
  }

  /// Fetches a page whose absence makes the whole extraction pointless.
  ///
  /// # Errors
  ///
  /// - [`ScrapeError::Cancelled`] if the token was cancelled before the request
  /// - [`ScrapeError::FetchFailed`] if the server answers with anything but HTTP 200
  /// - [`ScrapeError::Network`] on transport failures and timeouts
  pub async fn required(&self, url: &str) -> Result<String, ScrapeError> {
    self.ensure_active(url)?;
    debug!("Fetching {url}");

    let response = self.client.get(url).send().await?;
    let status = response.status();
    if status != StatusCode::OK {
      error!(%url, status = status.as_u16(), "Cannot connect to {url}");
      return Err(ScrapeError::FetchFailed { url: url.to_owned(), status: status.as_u16() });
    }

    Ok(response.text().await?)
  }

  /// Fetches an enrichment resource, degrading to a gap on `field` when it is unavailable.
  ///
  /// Returns `Ok(None)` after recording the gap for non-200 answers and transport failures.
  ///
  /// # Errors
  ///
  /// Only [`ScrapeError::Cancelled`]; cancellation still aborts the extraction.
  pub async fn optional(
    &self,
    url: &str,
    field: Field,
    gaps: &mut Gaps,
  ) -> Result<Option<Response>, ScrapeError> {
    self.ensure_active(url)?;
    debug!("Fetching {url} for {field}");

    match self.client.get(url).send().await {
      Ok(response) if response.status() == StatusCode::OK => Ok(Some(response)),
      Ok(response) => {
        gaps.record(field, GapReason::FetchFailed(format!("{url} (HTTP {})", response.status())));
        Ok(None)
      },
      Err(e) => {
        gaps.record(field, GapReason::FetchFailed(format!("{url} ({e})")));
        Ok(None)
      },
    }
  }

  /// Like [`Fetcher::optional`], reading the body as text.
  ///
  /// A body that cannot be read is recorded as [`GapReason::Malformed`].
  pub async fn optional_text(
    &self,
    url: &str,
    field: Field,
    gaps: &mut Gaps,
  ) -> Result<Option<String>, ScrapeError> {
    let Some(response) = self.optional(url, field, gaps).await? else {
      return Ok(None);
    };
    match response.text().await {
      Ok(text) => Ok(Some(text)),
      Err(e) => {
        gaps.record(field, GapReason::Malformed(e.to_string()));
        Ok(None)
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
  };

  use super::*;

  fn fetcher(server: &MockServer) -> Fetcher {
    Fetcher::new(&Config::for_testing(&server.uri()), CancellationToken::new()).unwrap()
  }

  #[traced_test]
  #[tokio::test]
  async fn test_required_returns_body() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/abs/1"))
      .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
      .mount(&server)
      .await;

    let body = fetcher(&server).required(&format!("{}/abs/1", server.uri())).await?;
    assert_eq!(body, "<html></html>");
    Ok(())
  }

  #[traced_test]
  #[tokio::test]
  async fn test_required_fails_on_non_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(404))
      .mount(&server)
      .await;

    let url = format!("{}/abs/missing", server.uri());
    match fetcher(&server).required(&url).await {
      Err(ScrapeError::FetchFailed { url: failed, status }) => {
        assert_eq!(failed, url);
        assert_eq!(status, 404);
      },
      other => panic!("expected FetchFailed, got {other:?}"),
    }
    assert!(logs_contain("Cannot connect to"));
  }

  #[traced_test]
  #[tokio::test]
  async fn test_optional_records_gap() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(503))
      .mount(&server)
      .await;

    let mut gaps = Gaps::new("1");
    let body = fetcher(&server)
      .optional_text(&format!("{}/bibtex/1", server.uri()), Field::Bibtex, &mut gaps)
      .await?;
    assert!(body.is_none());
    assert!(gaps.contains(Field::Bibtex));
    Ok(())
  }

  #[traced_test]
  #[tokio::test]
  async fn test_cancelled_fetcher_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200))
      .expect(0)
      .mount(&server)
      .await;

    let fetcher = fetcher(&server);
    fetcher.cancellation_token().cancel();

    let mut gaps = Gaps::new("1");
    let url = format!("{}/anything", server.uri());
    assert!(matches!(fetcher.required(&url).await, Err(ScrapeError::Cancelled)));
    assert!(matches!(
      fetcher.optional(&url, Field::Bibtex, &mut gaps).await,
      Err(ScrapeError::Cancelled)
    ));
    assert!(!gaps.contains(Field::Bibtex));
  }
}
