// src/ingest/mod.rs
pub mod feed_parse;
pub mod feeds;
pub mod newsapi;
pub mod scrape;
pub mod types;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;

use crate::config::CuratorConfig;
use crate::ingest::feed_parse::FeedEntry;
use crate::ingest::feeds::FeedResolver;
use crate::ingest::newsapi::NewsApiClient;
use crate::ingest::types::{CandidateItem, FetchReport, SourceProvider};
use crate::keywords::match_keywords;

/// At most this many feed entries are taken per source and cycle.
const MAX_FEED_ENTRIES: usize = 3;

/// One-time metrics registration (so series show up when an exporter is installed).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("curator_items_total", "Candidate items fetched from sources.");
        describe_counter!(
            "curator_source_errors_total",
            "Sources skipped due to fetch/parse errors."
        );
        describe_histogram!("curator_feed_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!(
            "curator_last_run_ts",
            "Unix ts when an aggregation cycle last ran."
        );
    });
}

/// Normalize text: decode HTML entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize curly quotes to ASCII
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap: 2000 chars
    if out.chars().count() > 2000 {
        out = out.chars().take(2000).collect();
    }

    out
}

/// Friendly origin label for a site URL; unknown sites keep the URL.
pub fn source_label(site_url: &str) -> String {
    const NAMES: &[(&str, &str)] = &[
        ("deepmind.google", "DeepMind Blog"),
        ("microsoft.com/en-us/research", "Microsoft Research"),
        ("anthropic.com/news", "Anthropic News"),
        ("developer.nvidia.com", "NVIDIA Developer Blog"),
        ("venturebeat.com", "VentureBeat AI"),
        ("technologyreview.com", "MIT Technology Review"),
        ("techcrunch.com", "TechCrunch AI"),
        ("theverge.com", "The Verge AI"),
        ("wired.com", "Wired AI"),
        ("distill.pub", "Distill Research"),
        ("blog.research.google", "Google Research"),
        ("huggingface.co", "Hugging Face Blog"),
        ("pytorch.org", "PyTorch Blog"),
        ("blog.tensorflow.org", "TensorFlow Blog"),
    ];
    for (domain, name) in NAMES {
        if site_url.contains(domain) {
            return (*name).to_string();
        }
    }
    site_url.to_string()
}

/// First calendar day of a `range_days` window ending at `end_date`.
///
/// A range of N days ending at `end` reaches back to `end - N` inclusive
/// (so an item dated 2025-01-02 is in the 7-day window ending 2025-01-09,
/// while 2025-01-01 is not).
pub fn date_window_start(end_date: NaiveDate, range_days: u32) -> NaiveDate {
    end_date - chrono::Days::new(u64::from(range_days))
}

/// Retain items whose calendar date falls within the window. Items with
/// no parseable date are retained when `include_undated` is set — the
/// deliberate completeness-over-precision default.
pub fn filter_by_date(
    items: Vec<CandidateItem>,
    end_date: NaiveDate,
    range_days: u32,
    include_undated: bool,
) -> Vec<CandidateItem> {
    let start = date_window_start(end_date, range_days);
    items
        .into_iter()
        .filter(|item| match item.published_at {
            Some(ts) => {
                let day = ts.date_naive();
                day >= start && day <= end_date
            }
            None => include_undated,
        })
        .collect()
}

/// Drop items that matched no topical keywords. This is the standard
/// filter applied between aggregation and scoring.
pub fn filter_topical(items: Vec<CandidateItem>) -> Vec<CandidateItem> {
    items
        .into_iter()
        .filter(|item| !item.matched_keywords.is_empty())
        .collect()
}

/// Run a set of providers once, tolerating individual failures.
pub async fn run_providers(providers: &[Box<dyn SourceProvider>]) -> FetchReport {
    ensure_metrics_described();

    let mut report = FetchReport::default();
    for p in providers {
        match p.fetch_latest().await {
            Ok(mut v) => {
                counter!("curator_items_total").increment(v.len() as u64);
                report.items.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "provider error");
                counter!("curator_source_errors_total").increment(1);
                report.sources_failed += 1;
            }
        }
    }
    report
}

/// Fetches candidate items from configured sites (feed first, scrape
/// fallback) and the optional news-search collaborator.
pub struct Aggregator {
    http: reqwest::Client,
    resolver: FeedResolver,
    news: Option<NewsApiClient>,
    fetch_concurrency: usize,
    recent_window_days: i64,
    include_undated: bool,
}

impl Aggregator {
    pub fn new(config: &CuratorConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("ai-news-curator/0.1")
            .connect_timeout(std::time::Duration::from_secs(4))
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        let news = config.news_api_enabled.then(|| {
            NewsApiClient::from_env(
                config.news_sources.clone(),
                i64::from(config.date_range_days),
            )
        });
        Self {
            resolver: FeedResolver::new(http.clone()),
            http,
            news,
            fetch_concurrency: config.fetch_concurrency.max(1),
            recent_window_days: i64::from(config.max_search_days),
            include_undated: config.include_undated,
        }
    }

    /// Fetch all configured sites plus the news collaborator, with
    /// bounded-concurrency fan-out. One failing source never aborts the
    /// batch; it is logged, counted, and skipped.
    pub async fn fetch_all(&self, site_urls: &[String]) -> FetchReport {
        ensure_metrics_described();

        let results: Vec<(String, Result<Vec<CandidateItem>>)> =
            stream::iter(site_urls.iter().map(|url| async move {
                (url.clone(), self.fetch_site(url).await)
            }))
            .buffer_unordered(self.fetch_concurrency)
            .collect()
            .await;

        let mut report = FetchReport::default();
        for (url, result) in results {
            match result {
                Ok(mut items) => {
                    tracing::info!(site = %url, count = items.len(), "source fetched");
                    counter!("curator_items_total").increment(items.len() as u64);
                    report.items.append(&mut items);
                }
                Err(e) => {
                    tracing::warn!(site = %url, error = ?e, "source fetch failed");
                    counter!("curator_source_errors_total").increment(1);
                    report.sources_failed += 1;
                }
            }
        }

        if let Some(news) = &self.news {
            match news.fetch_latest().await {
                Ok(mut items) => {
                    tracing::info!(count = items.len(), "news search items added");
                    counter!("curator_items_total").increment(items.len() as u64);
                    report.items.append(&mut items);
                }
                Err(e) => {
                    tracing::warn!(error = ?e, "news search failed");
                    report.sources_failed += 1;
                }
            }
        }

        gauge!("curator_last_run_ts").set(Utc::now().timestamp() as f64);
        report
    }

    /// Date-window variant: aggregate, then retain items whose calendar
    /// date falls within `range_days` ending at `end_date`.
    pub async fn fetch_by_date(
        &self,
        site_urls: &[String],
        end_date: NaiveDate,
        range_days: u32,
    ) -> FetchReport {
        let mut report = self.fetch_all(site_urls).await;
        report.items = filter_by_date(report.items, end_date, range_days, self.include_undated);
        report
    }

    /// One site: resolve the feed endpoint, parse it, and fall back to
    /// scraping the raw page when the feed yields nothing.
    async fn fetch_site(&self, site_url: &str) -> Result<Vec<CandidateItem>> {
        let endpoint = self.resolver.resolve(site_url).await;
        let body = self
            .http
            .get(&endpoint)
            .send()
            .await
            .with_context(|| format!("fetching {endpoint}"))?
            .text()
            .await
            .with_context(|| format!("reading body of {endpoint}"))?;

        let t0 = std::time::Instant::now();
        let entries = match feed_parse::parse_feed(&body) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(url = %endpoint, error = ?e, "not a parseable feed");
                Vec::new()
            }
        };
        histogram!("curator_feed_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        if !entries.is_empty() {
            return Ok(self.candidates_from_entries(entries, site_url, Utc::now()));
        }

        // Scrape fallback. Reuse the body when the probe already returned
        // the raw page; otherwise fetch the site root.
        let html = if endpoint == site_url {
            body
        } else {
            self.http
                .get(site_url)
                .send()
                .await
                .with_context(|| format!("fetching {site_url} for scraping"))?
                .text()
                .await
                .with_context(|| format!("reading body of {site_url}"))?
        };
        let source = source_label(site_url);
        let mut items = scrape::extract_links(&html, site_url, &source);
        for item in &mut items {
            item.title = normalize_text(&item.title);
            item.matched_keywords = match_keywords(&item.title, &item.content);
        }
        Ok(items)
    }

    /// Convert feed entries into candidates: drop entries outside the
    /// recency window (dateless entries are optimistically kept), cap at
    /// three per source, normalize text, and tag keywords and source.
    pub fn candidates_from_entries(
        &self,
        entries: Vec<FeedEntry>,
        site_url: &str,
        now: DateTime<Utc>,
    ) -> Vec<CandidateItem> {
        let source = source_label(site_url);
        let cutoff = now - Duration::days(self.recent_window_days);
        entries
            .into_iter()
            .filter(|e| match e.published_at {
                Some(ts) => ts >= cutoff,
                None => self.include_undated,
            })
            .take(MAX_FEED_ENTRIES)
            .map(|e| {
                let title = normalize_text(&e.title);
                let content = normalize_text(&e.summary);
                let matched_keywords = match_keywords(&title, &content);
                CandidateItem {
                    title,
                    url: e.link,
                    content,
                    published_at: e.published_at,
                    source: source.clone(),
                    matched_keywords,
                }
            })
            .collect()
    }

    /// Lazily fetch the full article text for one candidate URL.
    pub async fn full_content(&self, url: &str) -> Result<String> {
        let body = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("fetching {url}"))?
            .text()
            .await
            .with_context(|| format!("reading body of {url}"))?;
        Ok(scrape::extract_full_content(&body))
    }
}
