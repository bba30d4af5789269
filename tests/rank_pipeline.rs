// tests/rank_pipeline.rs
// End-to-end ranking: dedup composition, engagement failure isolation,
// stable ordering.

use std::collections::HashMap;
use std::sync::Arc;

use ai_news_curator::textgen::{EngagementEstimate, EngagementEstimator};
use ai_news_curator::{CandidateItem, Curator};
use anyhow::{anyhow, Result};

fn item(title: &str, url: &str, keywords: &[&str]) -> CandidateItem {
    CandidateItem {
        title: title.to_string(),
        url: url.to_string(),
        content: String::new(),
        published_at: None,
        source: "Test".to_string(),
        matched_keywords: keywords.iter().map(|s| s.to_string()).collect(),
    }
}

/// Fails for one specific title, answers a fixed estimate otherwise.
struct FlakyEstimator {
    fail_title: String,
    overall: u8,
}

#[async_trait::async_trait]
impl EngagementEstimator for FlakyEstimator {
    async fn estimate(&self, title: &str, _promo: &str) -> Result<EngagementEstimate> {
        if title == self.fail_title {
            return Err(anyhow!("simulated upstream outage"));
        }
        Ok(EngagementEstimate {
            engagement: self.overall,
            shareability: self.overall,
            relevance: self.overall,
            trending: self.overall,
            overall: self.overall,
        })
    }
}

#[tokio::test]
async fn one_failed_engagement_call_does_not_abort_the_batch() {
    let curator = Curator::new(Arc::new(FlakyEstimator {
        fail_title: "Second entry about nothing".to_string(),
        overall: 8,
    }));

    let ranked = curator
        .rank(
            vec![
                item("First entry completely unique", "https://example.test/1", &[]),
                item("Second entry about nothing", "https://example.test/2", &[]),
                item("Third entry on other things", "https://example.test/3", &[]),
            ],
            &HashMap::new(),
        )
        .await;

    assert_eq!(ranked.len(), 3);
    let failed = ranked
        .iter()
        .find(|r| r.item.url == "https://example.test/2")
        .unwrap();
    assert_eq!(failed.engagement, EngagementEstimate::neutral());
    // The healthy items got the real estimate and therefore outrank it.
    assert_eq!(ranked[2].item.url, "https://example.test/2");
}

#[tokio::test]
async fn near_duplicates_are_removed_before_scoring() {
    let curator = Curator::new(Arc::new(FlakyEstimator {
        fail_title: String::new(),
        overall: 5,
    }));

    let ranked = curator
        .rank(
            vec![
                item(
                    "Meta releases new multimodal model weights",
                    "https://example.test/a",
                    &["ai"],
                ),
                item(
                    "Meta releases new multimodal model checkpoints",
                    "https://example.test/b",
                    &["ai"],
                ),
            ],
            &HashMap::new(),
        )
        .await;

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].item.url, "https://example.test/a");
}

#[tokio::test]
async fn equal_composites_preserve_input_order() {
    let curator = Curator::new(Arc::new(FlakyEstimator {
        fail_title: String::new(),
        overall: 7,
    }));

    let ranked = curator
        .rank(
            vec![
                item("Alpha story about compilers", "https://example.test/a", &[]),
                item("Beta story regarding databases", "https://example.test/b", &[]),
                item("Gamma story covering networks", "https://example.test/c", &[]),
            ],
            &HashMap::new(),
        )
        .await;

    let urls: Vec<&str> = ranked.iter().map(|r| r.item.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://example.test/a",
            "https://example.test/b",
            "https://example.test/c",
        ]
    );
}

#[tokio::test]
async fn sub_scores_are_attached_for_audit() {
    let curator = Curator::new(Arc::new(FlakyEstimator {
        fail_title: String::new(),
        overall: 10,
    }));
    let ranked = curator
        .rank(
            vec![item("Lone llm entry", "https://example.test/x", &["llm"])],
            &HashMap::new(),
        )
        .await;

    let r = &ranked[0];
    assert!((0.0..=1.0).contains(&r.relevance));
    assert!((0.0..=1.0).contains(&r.personalization));
    let expected =
        r.relevance * 0.3 + r.personalization * 0.3 + (f32::from(r.engagement.overall) / 10.0) * 0.4;
    assert!((r.composite - expected).abs() < 1e-6);
}
