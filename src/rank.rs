//! # Ranking Orchestrator
//! Composes deduplication, relevance, personalization, and the external
//! engagement estimate into one ordered output. Pure composition — every
//! scoring policy lives in its own module.
//!
//! Policy: `composite = relevance*0.3 + personalization*0.3 +
//! (engagement.overall/10)*0.4`; stable sort descending, so tied items
//! keep their input order.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::ingest::types::CandidateItem;
use crate::preferences::{ApprovedRecord, PreferenceProfile};
use crate::similarity::{dedupe, DEFAULT_SIMILARITY_THRESHOLD};
use crate::textgen::{EngagementEstimate, EngagementEstimator};
use crate::trending::TrendingTable;

const W_RELEVANCE: f32 = 0.3;
const W_PERSONALIZATION: f32 = 0.3;
const W_ENGAGEMENT: f32 = 0.4;

/// A candidate enriched with all sub-scores, for caller inspection.
#[derive(Debug, Clone)]
pub struct RankedItem {
    pub item: CandidateItem,
    pub relevance: f32,
    pub personalization: f32,
    pub engagement: EngagementEstimate,
    pub composite: f32,
}

/// Long-lived orchestrator owning the process-wide trending table and
/// preference profile.
pub struct Curator {
    trending: TrendingTable,
    preferences: PreferenceProfile,
    estimator: Arc<dyn EngagementEstimator>,
    engagement_concurrency: usize,
}

impl Curator {
    pub fn new(estimator: Arc<dyn EngagementEstimator>) -> Self {
        Self {
            trending: TrendingTable::new(),
            preferences: PreferenceProfile::new(),
            estimator,
            engagement_concurrency: 4,
        }
    }

    /// Bound on concurrent engagement-estimate calls during ranking.
    pub fn with_engagement_concurrency(mut self, limit: usize) -> Self {
        self.engagement_concurrency = limit.max(1);
        self
    }

    pub fn trending(&self) -> &TrendingTable {
        &self.trending
    }

    pub fn preferences(&self) -> &PreferenceProfile {
        &self.preferences
    }

    /// Feed a fresh batch into the trending table; returns the batch-local
    /// top keywords.
    pub fn note_trending(&self, items: &[CandidateItem]) -> Vec<(String, u64)> {
        self.trending.update(items)
    }

    /// Learn preferences from the caller's approval history.
    pub fn learn(&self, approved: &[ApprovedRecord]) {
        self.preferences.learn(approved);
    }

    /// Rank a batch: dedupe, score each survivor, sort by composite
    /// descending. `promos` maps item URLs to previously-generated
    /// promotional text for the engagement estimate; items without one are
    /// estimated from their own content.
    ///
    /// A failed engagement call downgrades that one item to the neutral
    /// estimate; it never aborts the batch.
    pub async fn rank(
        &self,
        items: Vec<CandidateItem>,
        promos: &HashMap<String, String>,
    ) -> Vec<RankedItem> {
        let unique = dedupe(items, DEFAULT_SIMILARITY_THRESHOLD);

        let scored = stream::iter(unique.into_iter().map(|item| {
            let promo = promos
                .get(&item.url)
                .cloned()
                .unwrap_or_else(|| item.content.chars().take(500).collect());
            async move {
                let relevance = self.trending.relevance_score(&item);
                let personalization = self.preferences.personalized_score(&item);
                let engagement = match self.estimator.estimate(&item.title, &promo).await {
                    Ok(est) => est,
                    Err(e) => {
                        tracing::warn!(title = %item.title, error = ?e, "engagement estimate failed");
                        EngagementEstimate::neutral()
                    }
                };
                let composite = relevance * W_RELEVANCE
                    + personalization * W_PERSONALIZATION
                    + (f32::from(engagement.overall) / 10.0) * W_ENGAGEMENT;
                RankedItem {
                    item,
                    relevance,
                    personalization,
                    engagement,
                    composite,
                }
            }
        }))
        // `buffered` (not unordered) keeps input order, which the stable
        // sort below relies on for ties.
        .buffered(self.engagement_concurrency)
        .collect::<Vec<_>>()
        .await;

        let mut ranked = scored;
        ranked.sort_by(|a, b| {
            b.composite
                .partial_cmp(&a.composite)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}
