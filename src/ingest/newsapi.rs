// src/ingest/newsapi.rs
// News-search collaborator. Disabled (empty results) without credentials;
// transport failures degrade to empty results, never to batch errors.

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use serde::Deserialize;

use crate::ingest::feed_parse::parse_feed_date;
use crate::ingest::types::{CandidateItem, SourceProvider};
use crate::keywords::{match_keywords, AI_KEYWORDS};

const NEWS_API_URL: &str = "https://newsapi.org/v2/everything";

/// Hard cap on items contributed per search call.
const MAX_SEARCH_RESULTS: usize = 20;
const MAX_SOURCE_RESULTS: usize = 15;

/// Descriptions shorter than this signal a stub article.
const MIN_DESCRIPTION_LEN: usize = 50;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    source: Option<ArticleSource>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

pub struct NewsApiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    sources: Vec<String>,
    days_back: i64,
}

impl NewsApiClient {
    pub fn new(api_key: Option<String>, sources: Vec<String>, days_back: i64) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("ai-news-curator/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key: api_key.filter(|k| !k.is_empty()),
            sources,
            days_back,
        }
    }

    /// Credential comes from `NEWS_API_KEY`; a missing key disables the
    /// collaborator for the run rather than failing it.
    pub fn from_env(sources: Vec<String>, days_back: i64) -> Self {
        let _ = dotenvy::dotenv();
        Self::new(std::env::var("NEWS_API_KEY").ok(), sources, days_back)
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search recent articles matching the topical vocabulary. Bounded to
    /// 20 results; silently empty on missing credentials or transport
    /// failure.
    pub async fn search_recent(&self, keywords: &[&str], days_back: i64) -> Vec<CandidateItem> {
        let Some(api_key) = &self.api_key else {
            return Vec::new();
        };

        let query = keywords
            .iter()
            .take(10)
            .map(|kw| format!("\"{kw}\""))
            .collect::<Vec<_>>()
            .join(" OR ");
        let from = (Utc::now() - chrono::Duration::days(days_back))
            .format("%Y-%m-%d")
            .to_string();

        let resp = self
            .http
            .get(NEWS_API_URL)
            .query(&[
                ("q", query.as_str()),
                ("from", from.as_str()),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("pageSize", "50"),
                ("apiKey", api_key.as_str()),
            ])
            .send()
            .await;

        match parse_response(resp, "Unknown", MIN_DESCRIPTION_LEN).await {
            Ok(mut items) => {
                items.truncate(MAX_SEARCH_RESULTS);
                items
            }
            Err(e) => {
                tracing::warn!(error = ?e, "news search failed");
                Vec::new()
            }
        }
    }

    /// Variant restricted to a curated publisher list.
    pub async fn search_sources(&self, days_back: i64) -> Vec<CandidateItem> {
        let Some(api_key) = &self.api_key else {
            return Vec::new();
        };
        if self.sources.is_empty() {
            return Vec::new();
        }

        let from = (Utc::now() - chrono::Duration::days(days_back))
            .format("%Y-%m-%d")
            .to_string();
        let sources = self.sources.join(",");

        let resp = self
            .http
            .get(NEWS_API_URL)
            .query(&[
                (
                    "q",
                    "artificial intelligence OR machine learning OR AI OR deep learning",
                ),
                ("sources", sources.as_str()),
                ("from", from.as_str()),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("pageSize", "30"),
                ("apiKey", api_key.as_str()),
            ])
            .send()
            .await;

        match parse_response(resp, "Tech News", 0).await {
            Ok(mut items) => {
                items.truncate(MAX_SOURCE_RESULTS);
                items
            }
            Err(e) => {
                tracing::warn!(error = ?e, "news source search failed");
                Vec::new()
            }
        }
    }
}

async fn parse_response(
    resp: Result<reqwest::Response, reqwest::Error>,
    default_source: &str,
    min_description_len: usize,
) -> Result<Vec<CandidateItem>> {
    let resp = resp?;
    if !resp.status().is_success() {
        anyhow::bail!("news api returned {}", resp.status());
    }
    let body: SearchResponse = resp.json().await?;
    Ok(candidates_from_articles(
        body.articles,
        default_source,
        min_description_len,
    ))
}

/// Drop stub articles, then normalize the rest into candidates.
fn candidates_from_articles(
    articles: Vec<Article>,
    default_source: &str,
    min_description_len: usize,
) -> Vec<CandidateItem> {
    articles
        .into_iter()
        .filter_map(|a| {
            let title = a.title?;
            let description = a.description?;
            let url = a.url?;
            if title.is_empty() || url.is_empty() || description.len() < min_description_len {
                return None;
            }
            let publisher = a
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| default_source.to_string());
            let matched_keywords = match_keywords(&title, &description);
            Some(CandidateItem {
                title,
                url,
                content: description,
                published_at: a.published_at.as_deref().and_then(parse_feed_date),
                source: format!("NewsAPI - {publisher}"),
                matched_keywords,
            })
        })
        .collect()
}

#[async_trait::async_trait]
impl SourceProvider for NewsApiClient {
    async fn fetch_latest(&self) -> Result<Vec<CandidateItem>> {
        Ok(self.search_recent(AI_KEYWORDS, self.days_back).await)
    }

    fn name(&self) -> &'static str {
        "NewsAPI"
    }
}
