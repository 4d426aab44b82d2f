//! NewsAPI access.
//!
//! The rest of the crate only sees the [`SearchApi`] trait, which exposes the
//! two NewsAPI queries the digest needs. [`NewsApiClient`] implements it over
//! HTTP with `reqwest`; tests substitute an in-memory implementation.
//!
//! # Queries
//!
//! | Query | Endpoint | Fixed parameters |
//! |-------|----------|------------------|
//! | Top headlines | `/top-headlines` | `language=en`, `country=us` |
//! | Full search | `/everything` | `language=en`, `sortBy=relevancy` |
//!
//! Failures are not retried. Whatever goes wrong (transport, timeout, a
//! NewsAPI error body) is returned to the caller as a [`NewsError`].

use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::error::{ConfigError, NewsError};
use crate::models::{ApiArticle, HeadlineArticle, SearchArticle};
use crate::utils::truncate_for_log;

/// A source of NewsAPI-shaped search results.
pub trait SearchApi {
    /// Curated headlines matching `query`.
    async fn top_headlines(&self, query: &str) -> Result<Vec<HeadlineArticle>, NewsError>;

    /// Full-text search for `query`, most relevant first.
    async fn everything(&self, query: &str) -> Result<Vec<SearchArticle>, NewsError>;
}

/// Envelope shared by every NewsAPI response.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum ApiResponse {
    Ok {
        #[serde(default)]
        articles: Vec<ApiArticle>,
    },
    Error {
        code: String,
        message: String,
    },
}

/// HTTP implementation of [`SearchApi`] against NewsAPI v2.
#[derive(Debug)]
pub struct NewsApiClient<'a> {
    /// Shared client, already configured with the request timeout.
    pub http: &'a reqwest::Client,
    pub config: &'a Config,
}

impl<'a> NewsApiClient<'a> {
    pub fn new(http: &'a reqwest::Client, config: &'a Config) -> Self {
        Self { http, config }
    }

    #[instrument(level = "debug", skip(self, params))]
    async fn get(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<ApiArticle>, NewsError> {
        let url = self
            .config
            .newsapi_url
            .join(endpoint)
            .map_err(|source| ConfigError::InvalidUrl {
                url: format!("{}{endpoint}", self.config.newsapi_url),
                source,
            })?;

        let t0 = Instant::now();
        let res = self
            .http
            .get(url)
            .header("X-Api-Key", &self.config.api_key)
            .query(params)
            .send()
            .await?;
        let status = res.status();
        let body = res.text().await?;
        debug!(
            %status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "NewsAPI responded"
        );

        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(ApiResponse::Ok { articles }) if status.is_success() => Ok(articles),
            Ok(ApiResponse::Ok { .. }) => Err(NewsError::Api {
                code: status.as_str().to_string(),
                message: truncate_for_log(&body, 300),
            }),
            Ok(ApiResponse::Error { code, message }) => {
                warn!(%status, %code, "NewsAPI rejected the request");
                Err(NewsError::Api { code, message })
            }
            Err(_) if !status.is_success() => Err(NewsError::Api {
                code: status.as_str().to_string(),
                message: truncate_for_log(&body, 300),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

impl SearchApi for NewsApiClient<'_> {
    async fn top_headlines(&self, query: &str) -> Result<Vec<HeadlineArticle>, NewsError> {
        let page_size = self.config.max_api_results.to_string();
        self.get(
            "top-headlines",
            &[
                ("q", query),
                ("language", "en"),
                ("country", "us"),
                ("pageSize", page_size.as_str()),
            ],
        )
        .await
    }

    async fn everything(&self, query: &str) -> Result<Vec<SearchArticle>, NewsError> {
        let page_size = self.config.max_api_results.to_string();
        self.get(
            "everything",
            &[
                ("q", query),
                ("language", "en"),
                ("sortBy", "relevancy"),
                ("pageSize", page_size.as_str()),
            ],
        )
        .await
    }
}

/// Run both NewsAPI queries for `query`, keeping at most `limit` results each.
///
/// Top headlines are fetched first. Either failure ends the call; nothing is
/// deduplicated between the two result sets and the relevance order of the
/// full search is preserved.
#[instrument(level = "info", skip(api))]
pub async fn fetch_search_results<A: SearchApi>(
    api: &A,
    query: &str,
    limit: usize,
) -> Result<(Vec<HeadlineArticle>, Vec<SearchArticle>), NewsError> {
    let mut headlines = api.top_headlines(query).await?;
    headlines.truncate(limit);
    info!(count = headlines.len(), "Fetched top headlines");

    let mut everything = api.everything(query).await?;
    everything.truncate(limit);
    info!(count = everything.len(), "Fetched full search results");

    Ok((headlines, everything))
}
