// tests/ingest_fixture.rs
// Feed-to-candidate conversion against a fixture feed: recency window,
// per-source cap, source labeling.

use ai_news_curator::config::CuratorConfig;
use ai_news_curator::ingest::feed_parse::parse_feed;
use ai_news_curator::ingest::Aggregator;
use chrono::{TimeZone, Utc};

const FIVE_ENTRY_FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <title>Hugging Face Blog</title>
  <item>
    <title>Fine-tuning an llm on a single GPU</title>
    <link>https://huggingface.co/blog/1</link>
    <pubDate>Tue, 05 Aug 2025 09:00:00 GMT</pubDate>
    <description>Practical machine learning notes</description>
  </item>
  <item>
    <title>Transformer inference tricks</title>
    <link>https://huggingface.co/blog/2</link>
    <pubDate>Fri, 01 Aug 2025 09:00:00 GMT</pubDate>
    <description>Serving transformer models faster</description>
  </item>
  <item>
    <title>Vision models quarterly roundup</title>
    <link>https://huggingface.co/blog/3</link>
    <pubDate>Mon, 28 Jul 2025 09:00:00 GMT</pubDate>
    <description>Computer vision highlights</description>
  </item>
  <item>
    <title>Stale post from spring</title>
    <link>https://huggingface.co/blog/4</link>
    <pubDate>Thu, 01 May 2025 09:00:00 GMT</pubDate>
    <description>Old news about data science</description>
  </item>
  <item>
    <title>Even older winter post</title>
    <link>https://huggingface.co/blog/5</link>
    <pubDate>Sat, 01 Feb 2025 09:00:00 GMT</pubDate>
    <description>Ancient nlp content</description>
  </item>
</channel></rss>"#;

#[test]
fn five_entries_two_stale_yield_three_candidates() {
    let agg = Aggregator::new(&CuratorConfig::default());
    let now = Utc.with_ymd_and_hms(2025, 8, 7, 12, 0, 0).unwrap();

    let entries = parse_feed(FIVE_ENTRY_FEED).unwrap();
    assert_eq!(entries.len(), 5);

    let items = agg.candidates_from_entries(entries, "https://huggingface.co/blog", now);
    assert_eq!(items.len(), 3);
    for item in &items {
        assert_eq!(item.source, "Hugging Face Blog");
    }
    assert_eq!(items[0].url, "https://huggingface.co/blog/1");
    assert_eq!(items[2].url, "https://huggingface.co/blog/3");
}

#[test]
fn dateless_entries_are_kept_optimistically() {
    let agg = Aggregator::new(&CuratorConfig::default());
    let now = Utc.with_ymd_and_hms(2025, 8, 7, 12, 0, 0).unwrap();

    let xml = r#"<rss version="2.0"><channel>
      <item><title>Undated generative ai announcement</title>
      <link>https://example.test/x</link>
      <description>No pubDate element at all</description></item>
    </channel></rss>"#;
    let items = agg.candidates_from_entries(parse_feed(xml).unwrap(), "https://example.test", now);
    assert_eq!(items.len(), 1);
    assert!(items[0].published_at.is_none());
    assert!(items[0]
        .matched_keywords
        .contains(&"generative ai".to_string()));
}

#[test]
fn keywords_are_tagged_during_conversion() {
    let agg = Aggregator::new(&CuratorConfig::default());
    let now = Utc.with_ymd_and_hms(2025, 8, 7, 12, 0, 0).unwrap();

    let entries = parse_feed(FIVE_ENTRY_FEED).unwrap();
    let items = agg.candidates_from_entries(entries, "https://huggingface.co/blog", now);
    assert!(items[0].matched_keywords.contains(&"llm".to_string()));
    assert!(items[0]
        .matched_keywords
        .contains(&"machine learning".to_string()));
}
