// tests/personalization.rs
// Learning from approval history and its effect on ranking.

use std::collections::HashMap;
use std::sync::Arc;

use ai_news_curator::textgen::{EngagementEstimate, EngagementEstimator};
use ai_news_curator::{ApprovedRecord, CandidateItem, Curator, PreferenceProfile};
use anyhow::Result;

struct NeutralEstimator;

#[async_trait::async_trait]
impl EngagementEstimator for NeutralEstimator {
    async fn estimate(&self, _title: &str, _promo: &str) -> Result<EngagementEstimate> {
        Ok(EngagementEstimate::neutral())
    }
}

fn item(title: &str, url: &str, source: &str, keywords: &[&str]) -> CandidateItem {
    CandidateItem {
        title: title.to_string(),
        url: url.to_string(),
        content: String::new(),
        published_at: None,
        source: source.to_string(),
        matched_keywords: keywords.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn relearning_the_same_corpus_never_lowers_scores() {
    let profile = PreferenceProfile::new();
    let approved = vec![ApprovedRecord {
        title: "Approved llm deep dive".to_string(),
        source: "Hugging Face Blog".to_string(),
        matched_keywords: vec!["llm".to_string(), "transformer".to_string()],
    }];
    let probe = item(
        "Another llm writeup",
        "https://example.test/p",
        "Elsewhere",
        &["llm"],
    );

    profile.learn(&approved);
    let after_once = profile.personalized_score(&probe);
    profile.learn(&approved);
    let after_twice = profile.personalized_score(&probe);

    assert!(after_once > 0.0);
    assert!(after_twice >= after_once);
}

#[tokio::test]
async fn learned_preferences_shift_the_ranking() {
    let curator = Curator::new(Arc::new(NeutralEstimator));

    // Approvals concentrated on one source and one keyword.
    let approved: Vec<ApprovedRecord> = (0..3)
        .map(|i| ApprovedRecord {
            title: format!("approved {i}"),
            source: "DeepMind Blog".to_string(),
            matched_keywords: vec!["llm".to_string()],
        })
        .collect();
    curator.learn(&approved);

    let ranked = curator
        .rank(
            vec![
                item(
                    "Benchmark news from an unloved outlet",
                    "https://example.test/cold",
                    "Unknown Blog",
                    &["nlp"],
                ),
                item(
                    "A favored outlet ships an llm paper",
                    "https://example.test/hot",
                    "DeepMind Blog",
                    &["llm"],
                ),
            ],
            &HashMap::new(),
        )
        .await;

    assert_eq!(ranked[0].item.url, "https://example.test/hot");
    assert!(ranked[0].personalization > ranked[1].personalization);
}
