//! RSS and Atom feed retrieval and keyword filtering.
//!
//! Each configured feed is fetched, parsed into a [`Feed`] and filtered
//! against the query:
//!
//! 1. Only the first `max_entries` entries (30 by default) are looked at.
//! 2. An entry is kept when the query is a case-insensitive substring of its
//!    title, or of its summary when it has one.
//! 3. Kept entries become [`RssArticle`]s with a normalized date and the feed
//!    title as their source.
//!
//! Feeds are handled one after the other and their matches are concatenated
//! in feed order, then entry order. Nothing is sorted or deduplicated.
//!
//! # Supported formats
//!
//! | Root element | Format | Date element |
//! |--------------|--------|--------------|
//! | `<rss>` | RSS 2.0 | `pubDate` |
//! | `<rdf:RDF>` | RSS 1.0 | `pubDate` if present |
//! | `<feed>` | Atom 1.0 | `published`, else `updated` |
//!
//! An RSS item without `<link>` falls back to a permalink `<guid>`.

use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::dates::{self, NO_DATE_AVAILABLE};
use crate::error::NewsError;
use crate::models::{Feed, RssArticle, UNKNOWN_SOURCE};
use crate::utils::contains_ignore_case;

mod parser;

use parser::parse_feed;

/// What to do when a single feed cannot be fetched or parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the whole run with the feed's error.
    #[default]
    Abort,
    /// Log the error and carry on with the remaining feeds.
    Skip,
}

/// Something that can turn a feed URL into a parsed [`Feed`].
pub trait FeedSource {
    async fn fetch(&self, url: &Url) -> Result<Feed, NewsError>;
}

/// [`FeedSource`] that downloads feeds over HTTP.
#[derive(Debug)]
pub struct HttpFeedSource<'a> {
    pub http: &'a reqwest::Client,
}

impl<'a> HttpFeedSource<'a> {
    pub fn new(http: &'a reqwest::Client) -> Self {
        Self { http }
    }
}

impl FeedSource for HttpFeedSource<'_> {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<Feed, NewsError> {
        let res = self
            .http
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;
        let body = res.text().await?;
        debug!(bytes = body.len(), "Downloaded feed");
        parse_feed(url.as_str(), &body)
    }
}

/// Keep the entries of `feed` that mention `query`.
///
/// Only the first `max_entries` entries are examined. An examined entry
/// without a title, or a kept entry without a link, is reported as
/// [`NewsError::MalformedEntry`].
pub fn filter_feed(
    url: &str,
    feed: &Feed,
    query: &str,
    max_entries: usize,
) -> Result<Vec<RssArticle>, NewsError> {
    let source = feed.title.as_deref().unwrap_or(UNKNOWN_SOURCE);
    let malformed = |field: &'static str| NewsError::MalformedEntry {
        url: url.to_string(),
        field,
    };

    let mut kept = Vec::new();
    for entry in feed.entries.iter().take(max_entries) {
        let title = entry.title.as_deref().ok_or_else(|| malformed("title"))?;
        let matches = contains_ignore_case(title, query)
            || entry
                .summary
                .as_deref()
                .is_some_and(|summary| contains_ignore_case(summary, query));
        if !matches {
            continue;
        }

        let link = entry.link.as_deref().ok_or_else(|| malformed("link"))?;
        let published = match entry.published.as_deref() {
            Some(raw) => dates::normalize(raw),
            None => NO_DATE_AVAILABLE.to_string(),
        };

        kept.push(RssArticle {
            title: title.to_string(),
            source: source.to_string(),
            published,
            link: link.to_string(),
        });
    }
    Ok(kept)
}

/// Fetch every feed in `feed_urls`, in order, and collect the entries that
/// match `query`.
///
/// With [`FailurePolicy::Abort`] the first failing feed ends the call. With
/// [`FailurePolicy::Skip`] it is logged and left out of the results.
#[instrument(level = "info", skip(source, feed_urls), fields(feeds = feed_urls.len()))]
pub async fn fetch_rss_results<F: FeedSource>(
    source: &F,
    feed_urls: &[Url],
    query: &str,
    max_entries: usize,
    policy: FailurePolicy,
) -> Result<Vec<RssArticle>, NewsError> {
    let mut articles = Vec::new();

    for url in feed_urls {
        let result = match source.fetch(url).await {
            Ok(feed) => filter_feed(url.as_str(), &feed, query, max_entries),
            Err(e) => Err(e),
        };

        match result {
            Ok(kept) => {
                info!(%url, count = kept.len(), "Matched feed entries");
                articles.extend(kept);
            }
            Err(e) if policy == FailurePolicy::Skip => {
                warn!(%url, error = %e, "Skipping feed");
            }
            Err(e) => return Err(e),
        }
    }

    info!(count = articles.len(), "Collected RSS articles");
    Ok(articles)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dates::{INVALID_DATE_FORMAT, is_display_format};
    use crate::models::FeedEntry;
    use std::cell::RefCell;
    use std::collections::HashMap;

    pub(crate) fn entry(title: &str, summary: Option<&str>, published: Option<&str>) -> FeedEntry {
        FeedEntry {
            title: Some(title.to_string()),
            summary: summary.map(str::to_string),
            link: Some(format!("https://feed.example/{}", title.replace(' ', "-"))),
            published: published.map(str::to_string),
        }
    }

    /// In-memory [`FeedSource`]; URLs without a feed fail to fetch.
    #[derive(Default)]
    pub(crate) struct MockFeedSource {
        pub feeds: HashMap<String, Feed>,
        pub fetched: RefCell<Vec<String>>,
    }

    impl FeedSource for MockFeedSource {
        async fn fetch(&self, url: &Url) -> Result<Feed, NewsError> {
            self.fetched.borrow_mut().push(url.to_string());
            self.feeds
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| NewsError::UnsupportedFeed {
                    url: url.to_string(),
                    root: "html".to_string(),
                })
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let feed = Feed {
            title: Some("Wire".to_string()),
            entries: vec![entry("Breaking NEWS on Markets", None, None)],
        };
        let kept = filter_feed("u", &feed, "news", 30).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Breaking NEWS on Markets");
    }

    #[test]
    fn test_filter_matches_summary() {
        let feed = Feed {
            title: None,
            entries: vec![entry("Budget day", Some("The election is near"), None)],
        };
        let kept = filter_feed("u", &feed, "Election", 30).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source, UNKNOWN_SOURCE);
        assert_eq!(kept[0].published, NO_DATE_AVAILABLE);
    }

    #[test]
    fn test_filter_excludes_non_matching() {
        let feed = Feed {
            title: Some("Wire".to_string()),
            entries: vec![
                entry("Budget day", Some("Spending plans"), None),
                entry("Weather", None, None),
            ],
        };
        assert!(filter_feed("u", &feed, "election", 30).unwrap().is_empty());
    }

    #[test]
    fn test_filter_caps_examined_entries() {
        let mut entries: Vec<_> = (0..30).map(|i| entry(&format!("other {i}"), None, None)).collect();
        entries.push(entry("election late", None, None));
        let feed = Feed {
            title: None,
            entries,
        };

        assert!(filter_feed("u", &feed, "election", 30).unwrap().is_empty());
        assert_eq!(filter_feed("u", &feed, "election", 31).unwrap().len(), 1);
    }

    #[test]
    fn test_entries_beyond_cap_are_never_validated() {
        let mut entries: Vec<_> = (0..30).map(|i| entry(&format!("item {i}"), None, None)).collect();
        entries.push(FeedEntry::default());
        let feed = Feed {
            title: None,
            entries,
        };
        assert!(filter_feed("u", &feed, "zzz", 30).unwrap().is_empty());
    }

    #[test]
    fn test_filter_normalizes_dates() {
        let feed = Feed {
            title: Some("Wire".to_string()),
            entries: vec![
                entry("vote one", None, Some("Sat, 18 Oct 2025 10:30:00 +0530")),
                entry("vote two", None, Some("sometime soon")),
            ],
        };
        let kept = filter_feed("u", &feed, "vote", 30).unwrap();
        assert_eq!(kept[0].published, "18/10/25 10:30");
        assert!(is_display_format(&kept[0].published));
        assert_eq!(kept[1].published, INVALID_DATE_FORMAT);
    }

    #[test]
    fn test_missing_title_is_malformed() {
        let feed = Feed {
            title: None,
            entries: vec![FeedEntry {
                link: Some("https://x".to_string()),
                ..Default::default()
            }],
        };
        let err = filter_feed("u", &feed, "x", 30).unwrap_err();
        assert!(matches!(err, NewsError::MalformedEntry { field: "title", .. }));
    }

    #[test]
    fn test_missing_link_on_kept_entry_is_malformed() {
        let feed = Feed {
            title: None,
            entries: vec![FeedEntry {
                title: Some("election".to_string()),
                ..Default::default()
            }],
        };
        let err = filter_feed("u", &feed, "election", 30).unwrap_err();
        assert!(matches!(err, NewsError::MalformedEntry { field: "link", .. }));

        // The same entry is fine when it does not match.
        assert!(filter_feed("u", &feed, "budget", 30).unwrap().is_empty());
    }

    #[test]
    fn test_real_world_items_are_kept() {
        let xml = r#"<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Wire</title>
    <item>
      <title>Election news</title>
      <media:title>Pic</media:title>
      <dc:title>Other</dc:title>
      <link>https://x/1</link>
    </item>
    <item>
      <title>Election two</title>
      <guid isPermaLink="true">https://x/2</guid>
      <pubDate>Sat, 18 Oct 2025 10:30:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;
        let feed = parse_feed("u", xml).unwrap();
        let kept = filter_feed("u", &feed, "election", 30).unwrap();

        assert_eq!(
            kept,
            vec![
                RssArticle {
                    title: "Election news".to_string(),
                    source: "Wire".to_string(),
                    published: NO_DATE_AVAILABLE.to_string(),
                    link: "https://x/1".to_string(),
                },
                RssArticle {
                    title: "Election two".to_string(),
                    source: "Wire".to_string(),
                    published: "18/10/25 10:30".to_string(),
                    link: "https://x/2".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_results_follow_feed_order() {
        let mut source = MockFeedSource::default();
        source.feeds.insert(
            "https://a.example/rss".to_string(),
            Feed {
                title: Some("A".to_string()),
                entries: vec![entry("rust a1", None, None), entry("rust a2", None, None)],
            },
        );
        source.feeds.insert(
            "https://b.example/rss".to_string(),
            Feed {
                title: Some("B".to_string()),
                entries: vec![entry("rust b1", None, None)],
            },
        );
        let urls = [url("https://b.example/rss"), url("https://a.example/rss")];

        let articles = fetch_rss_results(&source, &urls, "rust", 30, FailurePolicy::Abort)
            .await
            .unwrap();
        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["rust b1", "rust a1", "rust a2"]);
        assert_eq!(articles[0].source, "B");
    }

    #[tokio::test]
    async fn test_abort_policy_stops_at_failing_feed() {
        let mut source = MockFeedSource::default();
        source.feeds.insert(
            "https://ok.example/rss".to_string(),
            Feed {
                title: None,
                entries: vec![entry("rust", None, None)],
            },
        );
        let urls = [
            url("https://down.example/rss"),
            url("https://ok.example/rss"),
        ];

        let err = fetch_rss_results(&source, &urls, "rust", 30, FailurePolicy::Abort)
            .await
            .unwrap_err();
        assert!(matches!(err, NewsError::UnsupportedFeed { .. }));
        assert_eq!(source.fetched.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_skip_policy_continues() {
        let mut source = MockFeedSource::default();
        source.feeds.insert(
            "https://ok.example/rss".to_string(),
            Feed {
                title: None,
                entries: vec![entry("rust", None, None)],
            },
        );
        let urls = [
            url("https://down.example/rss"),
            url("https://ok.example/rss"),
        ];

        let articles = fetch_rss_results(&source, &urls, "rust", 30, FailurePolicy::Skip)
            .await
            .unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(source.fetched.borrow().len(), 2);
    }
}
