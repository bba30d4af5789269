//! # Similarity / Deduplication
//! Exact-duplicate detection via title fingerprints plus greedy
//! near-duplicate removal using bag-of-words Jaccard similarity.
//!
//! Greedy and order-dependent: within a near-duplicate cluster, the item
//! seen first in input order is the one retained.

use once_cell::sync::OnceCell;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::ingest::types::CandidateItem;

/// Jaccard similarity above this drops a candidate as a near-duplicate.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.7;

fn word_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?u)\w+").expect("word regex"))
}

/// Lowercase word-token set of `text`.
pub fn token_set(text: &str) -> HashSet<String> {
    let lower = text.to_lowercase();
    word_re()
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Bag-of-words Jaccard similarity in [0,1]. Defined as 0 when either
/// token set is empty.
pub fn jaccard(a: &str, b: &str) -> f32 {
    let ta = token_set(a);
    let tb = token_set(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

/// Hex digest of the title, used to catch exact duplicates cheaply.
pub fn title_fingerprint(title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

fn compare_text(item: &CandidateItem) -> String {
    format!("{} {}", item.title, item.content)
}

/// Remove exact and near-duplicate candidates, preserving input order.
///
/// Exact duplicates (same title fingerprint as an accepted item) are
/// dropped without a similarity pass. Survivors are compared against every
/// accepted item; similarity above `threshold` drops the candidate.
/// O(n²) comparisons, acceptable for the tens-of-items batches this
/// pipeline produces.
pub fn dedupe(items: Vec<CandidateItem>, threshold: f32) -> Vec<CandidateItem> {
    let mut seen_fingerprints: HashSet<String> = HashSet::new();
    let mut unique: Vec<CandidateItem> = Vec::with_capacity(items.len());

    for item in items {
        let fp = title_fingerprint(&item.title);
        if seen_fingerprints.contains(&fp) {
            continue;
        }

        let text = compare_text(&item);
        let is_duplicate = unique
            .iter()
            .any(|accepted| jaccard(&text, &compare_text(accepted)) > threshold);
        if is_duplicate {
            continue;
        }

        seen_fingerprints.insert(fp);
        unique.push(item);
    }

    unique
}
