//! Configuration for the HTTP layer and the external endpoints the extractors talk to.

use std::time::Duration;

use super::*;

/// Default endpoints and limits.
pub mod defaults {
  use std::time::Duration;

  /// Per-paper BibTeX endpoint on arXiv; the paper id is appended as a path segment.
  pub const ARXIV_BIBTEX_URL: &str = "https://arxiv.org/bibtex";

  /// Papers with Code lookup API for arXiv papers; the paper id is appended as a path segment.
  pub const PAPERSWITHCODE_API_URL: &str = "https://arxiv.paperswithcode.com/api/v0/papers";

  /// Root that ECVA's `../../../../` relative links point at.
  pub const ECVA_ROOT_URL: &str = "https://www.ecva.net/";

  /// Total time allowed for a single request, body included.
  pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

  /// Time allowed to establish a connection.
  pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

  /// User agent sent with every request.
  pub const USER_AGENT: &str = concat!("papermeta/", env!("CARGO_PKG_VERSION"));
}

/// Environment variable overriding [`Config::request_timeout`], in whole seconds.
pub const TIMEOUT_ENV: &str = "PAPERMETA_TIMEOUT_SECS";

/// Environment variable overriding [`Config::user_agent`].
pub const USER_AGENT_ENV: &str = "PAPERMETA_USER_AGENT";

/// Settings for a [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct Config {
  /// Base URL of the arXiv BibTeX endpoint
  pub arxiv_bibtex_url:       String,
  /// Base URL of the Papers with Code lookup API
  pub paperswithcode_api_url: String,
  /// Root URL used to resolve ECVA relative links, with a trailing slash
  pub ecva_root_url:          String,
  /// Total time allowed for a single request
  pub request_timeout:        Duration,
  /// Time allowed to establish a connection
  pub connect_timeout:        Duration,
  /// User agent sent with every request
  pub user_agent:             String,
}

impl Config {
  /// Creates a configuration pointing every endpoint at a mock server.
  ///
  /// Abstract page URLs are taken from the records themselves, so tests point those at the same
  /// server.
  pub fn for_testing(base_url: &str) -> Self {
    let base_url = base_url.trim_end_matches('/');
    Self {
      arxiv_bibtex_url:       format!("{base_url}/bibtex"),
      paperswithcode_api_url: format!("{base_url}/api/v0/papers"),
      ecva_root_url:          format!("{base_url}/"),
      request_timeout:        Duration::from_secs(5),
      connect_timeout:        Duration::from_secs(2),
      user_agent:             defaults::USER_AGENT.to_string(),
    }
  }

  /// Creates the default configuration, applying overrides from the environment.
  ///
  /// Values that cannot be parsed are logged and ignored.
  pub fn from_env() -> Self {
    let mut config = Self::default();

    if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
      match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
        _ => warn!("Ignoring invalid {TIMEOUT_ENV} value: {raw:?}"),
      }
    }

    if let Ok(user_agent) = std::env::var(USER_AGENT_ENV) {
      if user_agent.trim().is_empty() {
        warn!("Ignoring empty {USER_AGENT_ENV}");
      } else {
        config.user_agent = user_agent;
      }
    }

    debug!("Loaded configuration: {config:?}");
    config
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      arxiv_bibtex_url:       defaults::ARXIV_BIBTEX_URL.to_string(),
      paperswithcode_api_url: defaults::PAPERSWITHCODE_API_URL.to_string(),
      ecva_root_url:          defaults::ECVA_ROOT_URL.to_string(),
      request_timeout:        defaults::REQUEST_TIMEOUT,
      connect_timeout:        defaults::CONNECT_TIMEOUT,
      user_agent:             defaults::USER_AGENT.to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.arxiv_bibtex_url, "https://arxiv.org/bibtex");
    assert_eq!(config.ecva_root_url, "https://www.ecva.net/");
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert!(config.user_agent.starts_with("papermeta/"));
  }

  #[test]
  fn test_config_for_testing() {
    let config = Config::for_testing("http://127.0.0.1:4000/");
    assert_eq!(config.arxiv_bibtex_url, "http://127.0.0.1:4000/bibtex");
    assert_eq!(config.paperswithcode_api_url, "http://127.0.0.1:4000/api/v0/papers");
    assert_eq!(config.ecva_root_url, "http://127.0.0.1:4000/");
    assert!(config.request_timeout < defaults::REQUEST_TIMEOUT);
  }
}
