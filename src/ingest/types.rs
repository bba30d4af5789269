// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// One discovered piece of content, before ranking/approval.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct CandidateItem {
    pub title: String,
    /// Canonical link; identity key once persisted downstream.
    pub url: String,
    /// Best-effort extracted text; empty when only a title/link was found.
    pub content: String,
    /// `None` when the source provides no reliable date.
    pub published_at: Option<DateTime<Utc>>,
    pub source: String, // e.g., "DeepMind Blog", "NewsAPI - Wired"
    /// Topical keywords found in title+content, in vocabulary order.
    pub matched_keywords: Vec<String>,
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<CandidateItem>>;
    fn name(&self) -> &'static str;
}

/// Outcome of one aggregation cycle. Failure is always partial:
/// "N items fetched, M sources failed", never an all-or-nothing error.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub items: Vec<CandidateItem>,
    pub sources_failed: usize,
}
