//! # News Digest
//!
//! Searches NewsAPI and a list of RSS/Atom feeds for a keyword and prints a
//! plain-text digest of the matches.
//!
//! ## Usage
//!
//! ```sh
//! NEWSAPI_KEY=... news_digest
//! Enter your search query: election
//! ```
//!
//! ## Architecture
//!
//! One query, one pass, no state kept between runs:
//! 1. **Configuration**: `.env`, environment and flags become a [`Config`];
//!    a missing API key stops here
//! 2. **Query**: taken from `--query` or prompted for on the terminal
//! 3. **NewsAPI**: top headlines, then a relevance-sorted full search
//! 4. **Feeds**: each feed fetched in order and filtered on the query
//! 5. **Output**: a three-section text report on stdout

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod dates;
mod digest;
mod error;
mod feeds;
mod models;
mod outputs;
mod utils;

use api::NewsApiClient;
use cli::Cli;
use config::Config;
use error::NewsError;
use feeds::HttpFeedSource;
use outputs::text::render_digest;
use utils::read_query;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before clap reads the environment.
    let dotenv = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    match &dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) => debug!(error = %e, "No .env loaded"),
    }

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(feeds = ?args.feeds, query = ?args.query, "Parsed CLI arguments");

    let stdin = io::stdin();
    match run(&args, stdin.lock(), io::stdout()).await {
        Ok(()) => {
            info!(elapsed = ?start_time.elapsed(), "Execution complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Validate the configuration, obtain the query, collect and print the digest.
///
/// Configuration errors are returned before anything is written to `output`
/// and before any HTTP client exists.
async fn run<R: BufRead, W: Write>(cli: &Cli, input: R, mut output: W) -> Result<(), NewsError> {
    let config = Config::from_cli(cli)?;

    let query = match cli.query.as_deref() {
        Some(query) if query.trim().is_empty() => return Err(NewsError::EmptyQuery),
        Some(query) => query.to_string(),
        None => read_query(input, &mut output)?,
    };
    info!(%query, "Searching");

    let http = reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(USER_AGENT)
        .build()?;
    let api = NewsApiClient::new(&http, &config);
    let feeds = HttpFeedSource::new(&http);

    let digest = digest::collect(&api, &feeds, &config, &query).await?;

    output.write_all(render_digest(&digest).as_bytes())?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[tokio::test]
    async fn test_missing_key_stops_before_prompt() {
        let mut cli = Cli::parse_from(["news_digest"]);
        cli.api_key = None;
        let mut out = Vec::new();

        let err = run(&cli, &b"election\n"[..], &mut out).await.unwrap_err();

        assert!(matches!(err, NewsError::Config(ConfigError::MissingApiKey)));
        assert!(err.to_string().contains("NEWSAPI_KEY"));
        assert!(out.is_empty(), "nothing should be printed before the key check");
    }

    #[tokio::test]
    async fn test_blank_query_flag_is_rejected() {
        let cli = Cli::parse_from(["news_digest", "--api-key", "k", "--query", "   "]);
        let mut out = Vec::new();

        let err = run(&cli, &b""[..], &mut out).await.unwrap_err();

        assert!(matches!(err, NewsError::EmptyQuery));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_blank_prompt_answer_is_rejected() {
        let cli = Cli::parse_from(["news_digest", "--api-key", "k"]);
        let mut out = Vec::new();

        let err = run(&cli, &b"\n"[..], &mut out).await.unwrap_err();

        assert!(matches!(err, NewsError::EmptyQuery));
        assert_eq!(String::from_utf8(out).unwrap(), utils::QUERY_PROMPT);
    }
}
