//! Data models for articles collected from NewsAPI and RSS feeds.
//!
//! - [`ApiArticle`]: one record from NewsAPI, used for both the top headlines
//!   ([`HeadlineArticle`]) and the full search ([`SearchArticle`]) results
//! - [`RssArticle`]: a feed entry that matched the query, with its date
//!   already normalized
//! - [`Feed`] / [`FeedEntry`]: a parsed feed before filtering
//! - [`Digest`]: the three collections handed to the renderer
//!
//! All of these are plain values built once per run and never mutated.

use serde::{Deserialize, Deserializer};

/// Fallback used when a feed has no title.
pub const UNKNOWN_SOURCE: &str = "Unknown Source";

/// Publisher information attached to a NewsAPI article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// An article as returned by the NewsAPI `top-headlines` and `everything`
/// endpoints.
///
/// NewsAPI occasionally sends `null` for the title or URL of removed
/// articles; those come through as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiArticle {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub source: ArticleSource,
    /// Source-native timestamp, usually ISO-8601 in UTC.
    pub published_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
}

impl ApiArticle {
    /// Publisher name, or [`UNKNOWN_SOURCE`] when NewsAPI did not name one.
    pub fn source_name(&self) -> &str {
        self.source.name.as_deref().unwrap_or(UNKNOWN_SOURCE)
    }
}

/// A result from the curated top-headlines query.
pub type HeadlineArticle = ApiArticle;

/// A result from the relevance-sorted full search.
pub type SearchArticle = ApiArticle;

/// A feed entry that matched the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RssArticle {
    pub title: String,
    /// Feed-level title, or [`UNKNOWN_SOURCE`].
    pub source: String,
    /// `DD/MM/YY HH:MM`, or one of the date sentinels.
    pub published: String,
    pub link: String,
}

/// A parsed RSS or Atom feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    pub title: Option<String>,
    pub entries: Vec<FeedEntry>,
}

/// One item of a feed, as written by the publisher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub link: Option<String>,
    /// Raw publication date string.
    pub published: Option<String>,
}

/// Everything collected for one query, in render order.
#[derive(Debug, Clone, Default)]
pub struct Digest {
    pub headlines: Vec<HeadlineArticle>,
    pub everything: Vec<SearchArticle>,
    pub rss: Vec<RssArticle>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
