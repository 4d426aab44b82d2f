//! Error types shared by the fetchers and the entry point.
//!
//! Configuration problems are reported through [`ConfigError`] and are always
//! raised before any network activity. Everything that can go wrong while
//! talking to NewsAPI or an RSS feed ends up as a [`NewsError`] and, unless the
//! caller opted into skipping failed feeds, terminates the run.

use thiserror::Error;

/// Problems with the startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "NewsAPI key not found. Set the NEWSAPI_KEY environment variable, add it to a .env file, or pass --api-key"
    )]
    MissingApiKey,

    #[error("timeout must be at least one second, got {0}")]
    InvalidTimeout(u64),

    #[error("no RSS feeds configured")]
    NoFeeds,

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Errors raised while collecting articles.
#[derive(Debug, Error)]
pub enum NewsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("NewsAPI returned an error ({code}): {message}")]
    Api { code: String, message: String },

    #[error("could not decode NewsAPI response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not parse feed {url}: {source}")]
    Xml {
        url: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("feed {url} contains no XML elements")]
    EmptyFeed { url: String },

    #[error("feed {url} is neither RSS nor Atom (root element <{root}>)")]
    UnsupportedFeed { url: String, root: String },

    #[error("feed {url} has an entry without a {field}")]
    MalformedEntry { url: String, field: &'static str },

    #[error("search query is empty")]
    EmptyQuery,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
