// src/ingest/scrape.rs
// HTML fallback extraction for sites whose feed yields nothing, plus full
// article text extraction for lazy content retrieval.

use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};

use crate::ingest::types::CandidateItem;

/// Per-domain extraction rule: an ordered selector list tried until one
/// yields a usable link+title pair. `url_base` absolutizes relative hrefs
/// for sites that emit them.
#[derive(Debug, Clone, Copy)]
pub struct DomainRule {
    pub domain: &'static str,
    pub selectors: &'static [&'static str],
    pub url_base: Option<&'static str>,
    pub min_title_len: usize,
}

pub const DOMAIN_RULES: &[DomainRule] = &[
    DomainRule {
        domain: "ai.googleblog.com",
        selectors: &[".post h3 a", ".post h2 a", "article h2 a", "h2 a", "h3 a"],
        url_base: None,
        min_title_len: 5,
    },
    DomainRule {
        domain: "deepmind.google",
        selectors: &[
            "article h2 a",
            "article h3 a",
            "h2 a",
            "h3 a",
            r#"a[href*="/discover/"]"#,
        ],
        url_base: Some("https://deepmind.google"),
        min_title_len: 5,
    },
    DomainRule {
        domain: "ai.meta.com",
        selectors: &[
            ".blog-post h2 a",
            ".blog-post h3 a",
            "article h2 a",
            "h2 a",
            "h3 a",
        ],
        url_base: None,
        min_title_len: 5,
    },
    DomainRule {
        domain: "anthropic.com",
        selectors: &[
            "article h2 a",
            "article h3 a",
            "h2 a",
            "h3 a",
            r#"a[href*="/news/"]"#,
        ],
        url_base: Some("https://www.anthropic.com"),
        min_title_len: 5,
    },
    DomainRule {
        domain: "amazon.science",
        selectors: &[
            ".blog-post h2 a",
            ".blog-post h3 a",
            "article h2 a",
            "h2 a",
            "h3 a",
        ],
        url_base: None,
        min_title_len: 5,
    },
];

/// Fallback rule applied when no domain-specific rule matches.
pub const GENERIC_SELECTORS: &[&str] =
    &["article h2 a", "article h3 a", ".post-title a", "h2 a", "h3 a"];
const GENERIC_MIN_TITLE_LEN: usize = 10;

/// Per-source cap on scraped items.
const MAX_SCRAPED_ITEMS: usize = 3;

/// Elements whose text never belongs to article content.
const SKIP_TAGS: &[&str] = &["script", "style", "nav", "footer", "header"];

/// Content containers tried in order for full-text extraction.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    ".content",
    ".post-content",
    ".entry-content",
    ".article-content",
    "main",
    ".main-content",
];

/// Extract up to three link+title candidates from a listing page.
/// The matching domain rule's selector groups are tried in order; the
/// first group producing at least one usable pair wins. Scraped items
/// carry empty content (fetched lazily elsewhere) and no date.
pub fn extract_links(html: &str, site_url: &str, source: &str) -> Vec<CandidateItem> {
    let doc = Html::parse_document(html);

    let rule = DOMAIN_RULES.iter().find(|r| site_url.contains(r.domain));
    let (selectors, min_title_len, url_base) = match rule {
        Some(r) => (r.selectors, r.min_title_len, r.url_base),
        None => (GENERIC_SELECTORS, GENERIC_MIN_TITLE_LEN, None),
    };

    for sel_str in selectors {
        let Ok(selector) = Selector::parse(sel_str) else {
            continue;
        };

        let mut items = Vec::new();
        for element in doc.select(&selector).take(MAX_SCRAPED_ITEMS) {
            let title = element.text().collect::<String>().trim().to_string();
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if href.is_empty() || title.chars().count() <= min_title_len {
                continue;
            }
            items.push(CandidateItem {
                title,
                url: absolutize(href, url_base, site_url),
                content: String::new(),
                published_at: None,
                source: source.to_string(),
                matched_keywords: Vec::new(),
            });
        }

        if !items.is_empty() {
            return items;
        }
    }

    Vec::new()
}

/// Extract the main article text from a full page: the first matching
/// content container, else the whole body, with script/style/chrome
/// subtrees skipped and whitespace collapsed.
pub fn extract_full_content(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut buf = String::new();

    for sel_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(sel_str) else {
            continue;
        };
        if let Some(element) = doc.select(&selector).next() {
            if let Some(node) = doc.tree.get(element.id()) {
                collect_text(node, &mut buf);
            }
            break;
        }
    }

    if buf.trim().is_empty() {
        if let Some(root) = doc.tree.get(doc.root_element().id()) {
            collect_text(root, &mut buf);
        }
    }

    collapse_whitespace(&buf)
}

fn absolutize(href: &str, url_base: Option<&str>, site_url: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    let base = url_base.unwrap_or(site_url).trim_end_matches('/');
    format!("{}/{}", base, href.trim_start_matches('/'))
}

fn collect_text(node: NodeRef<Node>, out: &mut String) {
    match node.value() {
        Node::Text(t) => {
            out.push_str(&t.text);
            out.push(' ');
        }
        Node::Element(el) => {
            if SKIP_TAGS.contains(&el.name()) {
                return;
            }
            for child in node.children() {
                collect_text(child, out);
            }
        }
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
