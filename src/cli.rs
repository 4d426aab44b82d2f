//! Command-line interface definitions for News Digest.
//!
//! Every option is optional on the command line. The API key and the tuning
//! knobs also fall back to environment variables, which may come from a
//! `.env` file loaded before parsing.

use clap::Parser;

/// RSS feed searched when no `--feed` is given.
pub const DEFAULT_FEED: &str = "https://www.indiatoday.in/rss/1206578";

/// Command-line arguments for the News Digest application.
///
/// # Examples
///
/// ```sh
/// # Prompt for a query, key taken from NEWSAPI_KEY or .env
/// news_digest
///
/// # Non-interactive, two feeds
/// news_digest --query election \
///     --feed https://feeds.bbci.co.uk/news/rss.xml \
///     --feed https://www.indiatoday.in/rss/1206578
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// NewsAPI key
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Search query; prompted for when omitted
    #[arg(short, long)]
    pub query: Option<String>,

    /// RSS or Atom feed to search (repeatable)
    #[arg(short, long = "feed", default_value = DEFAULT_FEED)]
    pub feeds: Vec<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "NEWS_DIGEST_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// NewsAPI base URL
    #[arg(long, env = "NEWSAPI_BASE_URL", default_value = "https://newsapi.org/v2")]
    pub newsapi_url: String,

    /// Log and skip feeds that fail instead of aborting the run
    #[arg(long)]
    pub skip_failed_feeds: bool,
}
