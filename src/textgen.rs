//! Text-generation collaborator: provider abstraction, deterministic
//! fallbacks, and engagement estimation.
//!
//! Every operation degrades to a deterministic, title-derived fallback
//! when the hosted model errors or returns implausible output; callers can
//! tell the two apart through [`Origin`] instead of sniffing strings.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ingest::types::CandidateItem;

/// Model output that starts with this is treated as a refusal.
const REFUSAL_PREFIX: &str = "I cannot";

/// Hosted chat-completions endpoint used by the default provider.
const CEREBRAS_URL: &str = "https://api.cerebras.ai/v1/chat/completions";
const CEREBRAS_MODEL: &str = "llama3.1-8b";

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Where a piece of generated text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Genuine model output that passed plausibility checks.
    Model,
    /// Deterministic fallback, with the reason it was used.
    Fallback(&'static str),
}

/// Generated text plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub text: String,
    pub origin: Origin,
}

impl Generated {
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, Origin::Fallback(_))
    }
}

/// Four engagement sub-scores plus an overall rating, each in [1,10].
/// Produced by the text-generation collaborator; opaque to ranking beyond
/// clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementEstimate {
    pub engagement: u8,
    pub shareability: u8,
    pub relevance: u8,
    pub trending: u8,
    pub overall: u8,
}

impl EngagementEstimate {
    /// Neutral default substituted when the estimate cannot be obtained.
    pub fn neutral() -> Self {
        Self {
            engagement: 5,
            shareability: 5,
            relevance: 5,
            trending: 5,
            overall: 5,
        }
    }
}

/// Estimation seam consumed by the ranking orchestrator. Implementations
/// propagate failure; the orchestrator substitutes a neutral estimate.
#[async_trait::async_trait]
pub trait EngagementEstimator: Send + Sync {
    async fn estimate(&self, title: &str, promo_text: &str) -> Result<EngagementEstimate>;
}

// ------------------------------------------------------------
// Provider abstraction + concrete providers
// ------------------------------------------------------------

/// Low-level provider: one remote chat completion. Separated from the
/// generator so tests can swap in deterministic providers.
pub trait Provider: Send + Sync + 'static {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        max_tokens: u32,
        temperature: f32,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

pub type DynProvider = Arc<dyn Provider>;

/// Chat-completions provider against the hosted Cerebras endpoint.
/// Requires `CEREBRAS_API_KEY`.
pub struct CerebrasProvider {
    http: reqwest::Client,
    api_key: String,
}

impl CerebrasProvider {
    pub fn new(api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("ai-news-curator/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        Self { http, api_key }
    }
}

impl Provider for CerebrasProvider {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        max_tokens: u32,
        temperature: f32,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Msg<'a> {
                role: &'a str,
                content: &'a str,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                model: &'a str,
                messages: Vec<Msg<'a>>,
                max_tokens: u32,
                temperature: f32,
            }
            #[derive(Deserialize)]
            struct Resp {
                choices: Vec<Choice>,
            }
            #[derive(Deserialize)]
            struct Choice {
                message: ChoiceMsg,
            }
            #[derive(Deserialize)]
            struct ChoiceMsg {
                content: String,
            }

            let req = Req {
                model: CEREBRAS_MODEL,
                messages: vec![Msg {
                    role: "user",
                    content: prompt,
                }],
                max_tokens,
                temperature,
            };

            let resp = self
                .http
                .post(CEREBRAS_URL)
                .bearer_auth(&self.api_key)
                .json(&req)
                .send()
                .await
                .ok()?;
            if !resp.status().is_success() {
                tracing::warn!(status = %resp.status(), "text generation request failed");
                return None;
            }
            let body: Resp = resp.json().await.ok()?;
            let content = body.choices.first().map(|c| c.message.content.trim().to_string())?;
            if content.is_empty() {
                None
            } else {
                Some(content)
            }
        })
    }

    fn name(&self) -> &'static str {
        "cerebras"
    }
}

/// Returns `None` always; used when no credential is configured.
pub struct DisabledProvider;

impl Provider for DisabledProvider {
    fn complete<'a>(
        &'a self,
        _prompt: &'a str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed-output provider for tests.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: String,
}

impl Provider for MockProvider {
    fn complete<'a>(
        &'a self,
        _prompt: &'a str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { Some(out) })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

// ------------------------------------------------------------
// Generator
// ------------------------------------------------------------

/// High-level client: prompts, plausibility checks, fallbacks.
pub struct TextGenerator {
    provider: DynProvider,
}

impl TextGenerator {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }

    /// Build from the environment: a Cerebras-backed generator when
    /// `CEREBRAS_API_KEY` is set, otherwise one that always falls back.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        match std::env::var("CEREBRAS_API_KEY") {
            Ok(key) if !key.is_empty() => Self::new(Arc::new(CerebrasProvider::new(key))),
            _ => Self::new(Arc::new(DisabledProvider)),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Summarize an article. Implausible or missing model output yields a
    /// deterministic, title-derived fallback.
    pub async fn summarize(&self, title: &str, content: &str) -> Generated {
        let excerpt: String = content.chars().take(3000).collect();
        let prompt = format!(
            "Create a precise, factual summary of this content in 2-3 sentences.\n\n\
             Title: {title}\n\
             Content: {excerpt}\n\n\
             Use ONLY information explicitly stated in the source content. \
             Maintain exact technical details, numbers, and terminology. \
             Focus on the author's main argument or key findings."
        );

        match self.provider.complete(&prompt, 150, 0.7).await {
            Some(text) if plausible_summary(&text) => Generated {
                text,
                origin: Origin::Model,
            },
            Some(_) => Generated {
                text: format!(
                    "Key insights from {title}. Read the full article for detailed information."
                ),
                origin: Origin::Fallback("implausible model output"),
            },
            None => Generated {
                text: format!(
                    "Interesting insights about {title}. Check out the full article for more details."
                ),
                origin: Origin::Fallback("provider unavailable"),
            },
        }
    }

    /// Generate a promotional post from a summary. The link and hashtag
    /// block is appended to model output and fallback alike.
    pub async fn promo_post(
        &self,
        title: &str,
        summary: &str,
        url: &str,
        keywords: &[String],
    ) -> Generated {
        let tags = hashtags(keywords);
        let prompt = format!(
            "Create a professional promotional post based on this summary.\n\n\
             Title: {title}\n\
             Summary: {summary}\n\n\
             Use ONLY facts from the provided summary. Start with an engaging \
             hook, include 2-3 key insights, end with a discussion question. \
             Stay under 1300 characters and do NOT include hashtags."
        );

        match self.provider.complete(&prompt, 200, 0.8).await {
            Some(text) if plausible_post(&text) => Generated {
                text: format!("{text}\n\nRead more: {url}\n\n{tags}"),
                origin: Origin::Model,
            },
            Some(_) => Generated {
                text: format!("{summary}\n\nRead more: {url}\n\n{tags}"),
                origin: Origin::Fallback("implausible model output"),
            },
            None => Generated {
                text: format!("{summary}\n\nRead more: {url}\n\n#AI #MachineLearning #Technology"),
                origin: Origin::Fallback("provider unavailable"),
            },
        }
    }

    /// Convenience wrapper used by callers holding a full candidate.
    pub async fn promo_for(&self, item: &CandidateItem, summary: &str) -> Generated {
        self.promo_post(&item.title, summary, &item.url, &item.matched_keywords)
            .await
    }
}

#[async_trait::async_trait]
impl EngagementEstimator for TextGenerator {
    async fn estimate(&self, title: &str, promo_text: &str) -> Result<EngagementEstimate> {
        let excerpt: String = promo_text.chars().take(500).collect();
        let prompt = format!(
            "Analyze this promotional post for engagement potential.\n\n\
             Title: {title}\n\
             Content: {excerpt}\n\n\
             Rate 1-10 for:\n\
             1. Engagement potential (likes/comments)\n\
             2. Shareability\n\
             3. Professional relevance\n\
             4. Trending topic alignment\n\n\
             Respond with: \"Engagement: X, Shareability: Y, Relevance: Z, Trending: W, Overall: A\""
        );

        let raw = self
            .provider
            .complete(&prompt, 100, 0.3)
            .await
            .ok_or_else(|| anyhow!("engagement provider unavailable"))?;
        Ok(parse_engagement_scores(&raw))
    }
}

// ------------------------------------------------------------
// Helpers
// ------------------------------------------------------------

fn plausible_summary(text: &str) -> bool {
    text.chars().count() > 20 && !text.starts_with(REFUSAL_PREFIX)
}

fn plausible_post(text: &str) -> bool {
    text.chars().count() > 50 && !text.starts_with(REFUSAL_PREFIX)
}

/// Parse the five 1-10 ratings out of a model response. Fewer than five
/// numbers yields the neutral estimate; each value is clamped to [1,10].
pub fn parse_engagement_scores(response: &str) -> EngagementEstimate {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| Regex::new(r"\d+").expect("digits regex"));

    let numbers: Vec<u8> = re
        .find_iter(response)
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .map(|n| n.clamp(1, 10) as u8)
        .collect();

    if numbers.len() < 5 {
        return EngagementEstimate::neutral();
    }
    EngagementEstimate {
        engagement: numbers[0],
        shareability: numbers[1],
        relevance: numbers[2],
        trending: numbers[3],
        overall: numbers[4],
    }
}

/// Hashtag block derived from matched keywords: known tags for up to the
/// first five keywords, sorted; a generic default when none match.
pub fn hashtags(keywords: &[String]) -> String {
    const TAG_MAP: &[(&str, &str)] = &[
        ("artificial intelligence", "#ArtificialIntelligence"),
        ("ai", "#AI"),
        ("machine learning", "#MachineLearning"),
        ("ml", "#ML"),
        ("deep learning", "#DeepLearning"),
        ("neural network", "#NeuralNetworks"),
        ("generative ai", "#GenerativeAI"),
        ("gen ai", "#GenAI"),
        ("autogen", "#AutoGen"),
        ("llm", "#LLM"),
        ("large language model", "#LargeLanguageModels"),
        ("chatgpt", "#ChatGPT"),
        ("gpt", "#GPT"),
        ("transformer", "#Transformers"),
        ("nlp", "#NLP"),
        ("computer vision", "#ComputerVision"),
        ("data science", "#DataScience"),
    ];

    let mut tags: Vec<&str> = Vec::new();
    for kw in keywords.iter().take(5) {
        let kw = kw.to_lowercase();
        if let Some((_, tag)) = TAG_MAP.iter().find(|(k, _)| *k == kw) {
            if !tags.contains(tag) {
                tags.push(tag);
            }
        }
    }
    if tags.is_empty() {
        tags = vec!["#AI", "#Technology", "#Innovation"];
    }
    tags.sort_unstable();
    tags.join(" ")
}
