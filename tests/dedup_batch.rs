// tests/dedup_batch.rs
use ai_news_curator::similarity::{dedupe, jaccard, DEFAULT_SIMILARITY_THRESHOLD};
use ai_news_curator::CandidateItem;

fn item(title: &str, content: &str, url: &str) -> CandidateItem {
    CandidateItem {
        title: title.to_string(),
        url: url.to_string(),
        content: content.to_string(),
        published_at: None,
        source: "Test".to_string(),
        matched_keywords: Vec::new(),
    }
}

#[test]
fn four_items_with_one_near_duplicate_pair_yield_three() {
    // Items 2 and 3 share well over 70% of their title tokens.
    let batch = vec![
        item("Rust async runtimes compared", "", "https://example.test/1"),
        item(
            "OpenAI announces a new reasoning model today",
            "",
            "https://example.test/2",
        ),
        item(
            "OpenAI announces a new reasoning model tonight",
            "",
            "https://example.test/3",
        ),
        item("Vector databases in production", "", "https://example.test/4"),
    ];
    assert!(
        jaccard(
            "OpenAI announces a new reasoning model today",
            "OpenAI announces a new reasoning model tonight"
        ) > DEFAULT_SIMILARITY_THRESHOLD
    );

    let out = dedupe(batch, DEFAULT_SIMILARITY_THRESHOLD);
    assert_eq!(out.len(), 3);
    let urls: Vec<&str> = out.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://example.test/1",
            "https://example.test/2",
            "https://example.test/4",
        ]
    );
}

#[test]
fn dedupe_twice_equals_dedupe_once() {
    let batch = vec![
        item("GPT-5 rumors swirl ahead of launch", "speculation", "https://example.test/a"),
        item("GPT-5 rumors swirl before launch", "speculation", "https://example.test/b"),
        item("GPT-5 rumors swirl ahead of launch", "exact dup title", "https://example.test/c"),
        item("Unrelated kernel scheduler news", "linux", "https://example.test/d"),
    ];
    let once = dedupe(batch, DEFAULT_SIMILARITY_THRESHOLD);
    let twice = dedupe(once.clone(), DEFAULT_SIMILARITY_THRESHOLD);
    assert_eq!(once, twice);
}

#[test]
fn summary_tokens_participate_in_similarity() {
    // Titles differ, but title+content overlap pushes the pair over the
    // threshold; the first occurrence is the one retained.
    let batch = vec![
        item(
            "Morning roundup",
            "anthropic claude model update pricing context window details",
            "https://example.test/a",
        ),
        item(
            "Evening roundup",
            "anthropic claude model update pricing context window details",
            "https://example.test/b",
        ),
    ];
    let out = dedupe(batch, DEFAULT_SIMILARITY_THRESHOLD);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].url, "https://example.test/a");
}
