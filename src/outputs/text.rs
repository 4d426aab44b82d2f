//! Plain-text report rendering.
//!
//! The report has three sections in a fixed order, each listing its articles
//! exactly as given: no sorting, filtering or truncation happens here. NewsAPI
//! timestamps are normalized at render time; RSS articles already carry a
//! normalized date.

use std::fmt::Write;

use crate::dates::normalize_opt;
use crate::models::{Digest, HeadlineArticle, RssArticle, SearchArticle};

pub const HEADLINES_HEADING: &str = "Top Headlines from News API";
pub const EVERYTHING_HEADING: &str = "All Articles from News API";
pub const RSS_HEADING: &str = "Articles from RSS Feeds";

/// Render the three article collections as one report.
pub fn render(
    headlines: &[HeadlineArticle],
    everything: &[SearchArticle],
    rss: &[RssArticle],
) -> String {
    let mut out = String::new();

    section(&mut out, HEADLINES_HEADING);
    for article in headlines {
        let published = normalize_opt(article.published_at.as_deref());
        entry(&mut out, &article.title, article.source_name(), &published, &article.url);
    }

    section(&mut out, EVERYTHING_HEADING);
    for article in everything {
        let published = normalize_opt(article.published_at.as_deref());
        entry(&mut out, &article.title, article.source_name(), &published, &article.url);
    }

    section(&mut out, RSS_HEADING);
    for article in rss {
        entry(&mut out, &article.title, &article.source, &article.published, &article.link);
    }

    out
}

/// Render a collected [`Digest`].
pub fn render_digest(digest: &Digest) -> String {
    render(&digest.headlines, &digest.everything, &digest.rss)
}

// Writing into a String cannot fail.

fn section(out: &mut String, heading: &str) {
    let _ = write!(out, "\n{heading}:\n\n");
}

fn entry(out: &mut String, title: &str, source: &str, published: &str, url: &str) {
    let _ = write!(
        out,
        "Title: {title}\nSource: {source}\nPublished: {published}\nURL: {url}\n\n"
    );
}
