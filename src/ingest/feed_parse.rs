// src/ingest/feed_parse.rs
// Syndication feed parsing: RSS 2.0 and Atom via quick-xml.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

/// One normalized feed entry, before candidate conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    summary: Option<String>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

/// Parse a feed date. RSS uses RFC 2822; Atom and some RSS feeds use
/// RFC 3339. Unparseable input becomes `None`, never an error.
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc2822) {
        let secs = dt.to_offset(UtcOffset::UTC).unix_timestamp();
        return DateTime::from_timestamp(secs, 0);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse feed XML, trying RSS 2.0 first and Atom second.
/// A well-formed feed with zero entries is a valid empty result; callers
/// use that to trigger the scrape fallback.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>> {
    let xml = scrub_html_entities_for_xml(xml);

    if let Ok(rss) = from_str::<Rss>(&xml) {
        return Ok(rss.channel.item.into_iter().filter_map(rss_entry).collect());
    }

    let atom: AtomFeed = from_str(&xml).context("parsing feed xml")?;
    Ok(atom.entries.into_iter().filter_map(atom_entry).collect())
}

fn rss_entry(item: RssItem) -> Option<FeedEntry> {
    let title = item.title.unwrap_or_default().trim().to_string();
    let link = item.link.unwrap_or_default().trim().to_string();
    if title.is_empty() && link.is_empty() {
        return None;
    }
    Some(FeedEntry {
        title,
        link,
        summary: item.description.unwrap_or_default(),
        published_at: item.pub_date.as_deref().and_then(parse_feed_date),
    })
}

fn atom_entry(entry: AtomEntry) -> Option<FeedEntry> {
    let title = entry.title.unwrap_or_default().trim().to_string();
    // Prefer the alternate link; fall back to the first link with an href.
    let link = entry
        .links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| entry.links.first())
        .and_then(|l| l.href.clone())
        .unwrap_or_default();
    if title.is_empty() && link.is_empty() {
        return None;
    }
    let raw_date = entry.published.or(entry.updated);
    Some(FeedEntry {
        title,
        link,
        summary: entry.summary.unwrap_or_default(),
        published_at: raw_date.as_deref().and_then(parse_feed_date),
    })
}

/// Feeds in the wild carry HTML entities that are not valid XML; replace
/// the common ones before handing the document to the XML parser.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
