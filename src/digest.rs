//! Collection of a full digest for one query.
//!
//! The steps run strictly in sequence: both NewsAPI queries, then every RSS
//! feed in configuration order. The first error ends the run unless the
//! configuration asks for failing feeds to be skipped.

use tracing::{info, instrument};

use crate::api::{SearchApi, fetch_search_results};
use crate::config::Config;
use crate::error::NewsError;
use crate::feeds::{FeedSource, fetch_rss_results};
use crate::models::Digest;

/// Gather NewsAPI and RSS results for `query`.
#[instrument(level = "info", skip(api, feeds, config))]
pub async fn collect<A: SearchApi, F: FeedSource>(
    api: &A,
    feeds: &F,
    config: &Config,
    query: &str,
) -> Result<Digest, NewsError> {
    let (headlines, everything) = fetch_search_results(api, query, config.max_api_results).await?;

    let rss = fetch_rss_results(
        feeds,
        &config.feeds,
        query,
        config.max_feed_entries,
        config.failure_policy,
    )
    .await?;

    info!(
        headlines = headlines.len(),
        everything = everything.len(),
        rss = rss.len(),
        "Digest collected"
    );
    Ok(Digest {
        headlines,
        everything,
        rss,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{MockSearchApi, article};
    use crate::cli::Cli;
    use crate::dates::{INVALID_DATE_FORMAT, NO_DATE_AVAILABLE, is_display_format};
    use crate::feeds::tests::{MockFeedSource, entry};
    use crate::models::Feed;
    use crate::outputs::text::render_digest;
    use clap::Parser;

    const FEED_URL: &str = "https://www.indiatoday.in/rss/1206578";

    fn config(extra: &[&str]) -> Config {
        let mut argv = vec!["news_digest", "--api-key", "test-key", "--feed", FEED_URL];
        argv.extend_from_slice(extra);
        Config::from_cli(&Cli::parse_from(argv)).unwrap()
    }

    fn election_feed() -> Feed {
        Feed {
            title: Some("India Today".to_string()),
            entries: vec![
                entry("Markets open flat", None, Some("Sat, 18 Oct 2025 09:00:00 +0530")),
                entry(
                    "Election dates announced",
                    None,
                    Some("Sat, 18 Oct 2025 10:30:00 +0530"),
                ),
                entry("Cricket: India win", Some("A famous victory"), None),
                entry("Weather update", Some("Rain expected"), None),
                entry("State ELECTION results", None, None),
            ],
        }
    }

    #[tokio::test]
    async fn test_election_scenario() {
        let api = MockSearchApi {
            headlines: vec![article("election h1"), article("election h2")],
            everything: vec![
                article("election e1"),
                article("election e2"),
                article("election e3"),
            ],
            ..Default::default()
        };
        let mut feeds = MockFeedSource::default();
        feeds.feeds.insert(FEED_URL.to_string(), election_feed());

        let digest = collect(&api, &feeds, &config(&[]), "election").await.unwrap();

        assert_eq!(digest.headlines.len(), 2);
        assert_eq!(digest.everything.len(), 3);
        assert_eq!(digest.rss.len(), 2);
        assert_eq!(digest.rss[0].title, "Election dates announced");
        assert_eq!(digest.rss[1].title, "State ELECTION results");
        for article in &digest.rss {
            assert!(
                is_display_format(&article.published)
                    || article.published == NO_DATE_AVAILABLE
                    || article.published == INVALID_DATE_FORMAT,
                "unexpected date {}",
                article.published
            );
        }

        let report = render_digest(&digest);
        assert_eq!(report.matches("Title: ").count(), 7);
        assert!(report.contains("Source: India Today\nPublished: 18/10/25 10:30\n"));
    }

    #[tokio::test]
    async fn test_search_failure_skips_feeds() {
        let api = MockSearchApi {
            fail_headlines: true,
            ..Default::default()
        };
        let feeds = MockFeedSource::default();

        let err = collect(&api, &feeds, &config(&[]), "election")
            .await
            .unwrap_err();
        assert!(matches!(err, NewsError::Api { .. }));
        assert!(feeds.fetched.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_failing_feed_is_fatal_by_default() {
        let api = MockSearchApi::default();
        let feeds = MockFeedSource::default();

        let err = collect(&api, &feeds, &config(&[]), "election")
            .await
            .unwrap_err();
        assert!(matches!(err, NewsError::UnsupportedFeed { .. }));
    }

    #[tokio::test]
    async fn test_failing_feed_can_be_skipped() {
        let api = MockSearchApi {
            headlines: vec![article("election h1")],
            ..Default::default()
        };
        let feeds = MockFeedSource::default();

        let digest = collect(&api, &feeds, &config(&["--skip-failed-feeds"]), "election")
            .await
            .unwrap();
        assert_eq!(digest.headlines.len(), 1);
        assert!(digest.rss.is_empty());
    }
}
