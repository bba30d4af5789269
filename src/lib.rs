// src/lib.rs
// Public library surface for the embedding orchestration layer and tests.

pub mod config;
pub mod ingest;
pub mod keywords;
pub mod preferences;
pub mod rank;
pub mod similarity;
pub mod textgen;
pub mod trending;

// ---- Re-exports for stable public API ----
pub use crate::config::{load_config_default, CuratorConfig};
pub use crate::ingest::types::{CandidateItem, FetchReport, SourceProvider};
pub use crate::ingest::Aggregator;
pub use crate::preferences::{ApprovedRecord, PreferenceProfile};
pub use crate::rank::{Curator, RankedItem};
pub use crate::textgen::{EngagementEstimate, Generated, Origin, TextGenerator};
pub use crate::trending::TrendingTable;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a compact tracing subscriber for binaries and ad-hoc runs.
/// No-op when a subscriber is already set (e.g., in tests).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ai_news_curator=info,warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
