//! # Trending Keywords & Relevance
//! Process-wide frequency counter over topical keywords seen in recent
//! batches, and the relevance score derived from it.
//!
//! The table only grows while the process lives; callers needing
//! durability snapshot/restore it themselves.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::ingest::types::CandidateItem;

/// Items older than this no longer feed the trending tally.
pub const TRENDING_WINDOW_DAYS: i64 = 3;

/// How many top keywords participate in trending alignment.
pub const TRENDING_TOP_N: usize = 10;

/// Relevance recency decay horizon, in days.
pub const RECENCY_DECAY_DAYS: f32 = 7.0;

/// Thread-safe rolling frequency table over topical keywords.
#[derive(Debug, Default)]
pub struct TrendingTable {
    counts: Mutex<HashMap<String, u64>>,
}

fn normalize_keyword(kw: &str) -> String {
    kw.trim().to_lowercase()
}

/// Sort a tally descending by count, ties broken alphabetically so the
/// result is deterministic.
fn most_common(counts: &HashMap<String, u64>, n: usize) -> Vec<(String, u64)> {
    let mut pairs: Vec<(String, u64)> = counts
        .iter()
        .map(|(k, v)| (k.clone(), *v))
        .collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs.truncate(n);
    pairs
}

impl TrendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally matched keywords of items published within the trending
    /// window, merge the tally into the global table, and return the
    /// batch-local top keywords (not the merged global view).
    ///
    /// Dateless items count as fresh.
    pub fn update(&self, items: &[CandidateItem]) -> Vec<(String, u64)> {
        self.update_at(items, Utc::now())
    }

    pub fn update_at(&self, items: &[CandidateItem], now: DateTime<Utc>) -> Vec<(String, u64)> {
        let cutoff = now - Duration::days(TRENDING_WINDOW_DAYS);
        let mut batch: HashMap<String, u64> = HashMap::new();

        for item in items {
            let fresh = item.published_at.map(|ts| ts > cutoff).unwrap_or(true);
            if !fresh {
                continue;
            }
            for kw in &item.matched_keywords {
                let kw = normalize_keyword(kw);
                if kw.is_empty() {
                    continue;
                }
                *batch.entry(kw).or_insert(0) += 1;
            }
        }

        {
            let mut counts = self.counts.lock().expect("trending table mutex poisoned");
            for (kw, n) in &batch {
                *counts.entry(kw.clone()).or_insert(0) += n;
            }
        }

        most_common(&batch, TRENDING_TOP_N)
    }

    /// Relevance in [0,1]: trending alignment (0.4) + recency decay (0.3)
    /// + keyword density (0.3).
    pub fn relevance_score(&self, item: &CandidateItem) -> f32 {
        self.relevance_score_at(item, Utc::now())
    }

    pub fn relevance_score_at(&self, item: &CandidateItem, now: DateTime<Utc>) -> f32 {
        let text = format!("{} {}", item.title, item.content).to_lowercase();

        // Items matching currently-hot topics score proportionally to how
        // hot each topic is.
        let trending_score = {
            let counts = self.counts.lock().expect("trending table mutex poisoned");
            let max = counts.values().copied().max().unwrap_or(0);
            if max == 0 {
                0.0
            } else {
                most_common(&counts, TRENDING_TOP_N)
                    .iter()
                    .filter(|(kw, _)| text.contains(kw.as_str()))
                    .map(|(_, count)| *count as f32 / max as f32)
                    .sum()
            }
        };

        // Unknown age is not penalized, consistent with the aggregator's
        // handling of missing dates.
        let recency_score = match item.published_at {
            Some(ts) => {
                let days_old = (now - ts).num_days().max(0) as f32;
                (1.0 - days_old / RECENCY_DECAY_DAYS).max(0.0)
            }
            None => 1.0,
        };

        let keyword_score = item.matched_keywords.len() as f32 / 10.0;

        (trending_score * 0.4 + recency_score * 0.3 + keyword_score * 0.3).clamp(0.0, 1.0)
    }

    /// Copy of the current counts, for callers that persist state.
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counts
            .lock()
            .expect("trending table mutex poisoned")
            .clone()
    }

    /// Replace the table contents (e.g., restoring a snapshot at startup).
    pub fn restore(&self, counts: HashMap<String, u64>) {
        *self.counts.lock().expect("trending table mutex poisoned") = counts;
    }
}
