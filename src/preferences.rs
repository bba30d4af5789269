//! # Preference Profile
//! Weight table learned from the user's approval history. Weights only
//! grow; there is no decay, so repeated learning passes over the same
//! corpus keep amplifying existing preferences.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::ingest::types::CandidateItem;

/// Minimal shape of a previously-approved record, as read back from the
/// external persistence store.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct ApprovedRecord {
    pub title: String,
    pub source: String,
    pub matched_keywords: Vec<String>,
}

impl ApprovedRecord {
    pub fn from_item(item: &CandidateItem) -> Self {
        Self {
            title: item.title.clone(),
            source: item.source.clone(),
            matched_keywords: item.matched_keywords.clone(),
        }
    }
}

/// Thread-safe learned weight table: normalized keyword -> weight, plus a
/// `source:<name>` sentinel per origin.
#[derive(Debug, Default)]
pub struct PreferenceProfile {
    weights: Mutex<HashMap<String, u64>>,
}

fn normalize_keyword(kw: &str) -> String {
    kw.trim().to_lowercase()
}

fn source_key(source: &str) -> String {
    format!("source:{source}")
}

impl PreferenceProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn from approved records: +1 per matched keyword, +1 for the
    /// record's source sentinel.
    pub fn learn(&self, approved: &[ApprovedRecord]) {
        let mut weights = self.weights.lock().expect("preference profile mutex poisoned");
        for record in approved {
            for kw in &record.matched_keywords {
                let kw = normalize_keyword(kw);
                if kw.is_empty() {
                    continue;
                }
                *weights.entry(kw).or_insert(0) += 1;
            }
            if !record.source.is_empty() {
                *weights.entry(source_key(&record.source)).or_insert(0) += 1;
            }
        }
    }

    /// Score an item against learned preferences, in [0,1].
    ///
    /// Keyword weights contribute `weight/10`; the source sentinel
    /// contributes `weight/5`, deliberately twice as strong per unit.
    pub fn personalized_score(&self, item: &CandidateItem) -> f32 {
        let weights = self.weights.lock().expect("preference profile mutex poisoned");
        let mut score = 0.0f32;

        for kw in &item.matched_keywords {
            if let Some(w) = weights.get(&normalize_keyword(kw)) {
                score += *w as f32 / 10.0;
            }
        }
        if let Some(w) = weights.get(&source_key(&item.source)) {
            score += *w as f32 / 5.0;
        }

        score.min(1.0)
    }

    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.weights
            .lock()
            .expect("preference profile mutex poisoned")
            .clone()
    }

    pub fn restore(&self, weights: HashMap<String, u64>) {
        *self.weights.lock().expect("preference profile mutex poisoned") = weights;
    }
}
