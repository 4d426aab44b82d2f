//! Validated runtime configuration.
//!
//! [`Config`] is built once from the parsed [`Cli`] and passed by reference to
//! everything that talks to the network. Building it is the only place a
//! missing API key is detected, so a bad configuration stops the run before
//! the query prompt and before any request is made.

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::feeds::FailurePolicy;

/// Everything a run needs besides the query itself.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub newsapi_url: Url,
    pub feeds: Vec<Url>,
    pub timeout: Duration,
    pub failure_policy: FailurePolicy,
    /// Maximum results kept from each NewsAPI query.
    pub max_api_results: usize,
    /// Maximum entries considered from each feed.
    pub max_feed_entries: usize,
}

impl Config {
    /// Results kept from each NewsAPI endpoint.
    pub const MAX_API_RESULTS: usize = 10;
    /// Entries considered per feed.
    pub const MAX_FEED_ENTRIES: usize = 30;

    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let api_key = cli
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?
            .to_string();

        if cli.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(cli.timeout_secs));
        }

        // Joining endpoint names onto the base needs a trailing slash.
        let mut base = cli.newsapi_url.trim_end_matches('/').to_string();
        base.push('/');
        let newsapi_url = parse_url(&base)?;

        let feeds = cli
            .feeds
            .iter()
            .map(|feed| parse_url(feed))
            .collect::<Result<Vec<_>, _>>()?;
        if feeds.is_empty() {
            return Err(ConfigError::NoFeeds);
        }

        let failure_policy = if cli.skip_failed_feeds {
            FailurePolicy::Skip
        } else {
            FailurePolicy::Abort
        };

        let config = Self {
            api_key,
            newsapi_url,
            feeds,
            timeout: Duration::from_secs(cli.timeout_secs),
            failure_policy,
            max_api_results: Self::MAX_API_RESULTS,
            max_feed_entries: Self::MAX_FEED_ENTRIES,
        };
        debug!(
            feeds = config.feeds.len(),
            timeout = ?config.timeout,
            policy = ?config.failure_policy,
            "Configuration loaded"
        );
        Ok(config)
    }
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}
