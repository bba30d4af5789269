// src/config.rs
// Curated source list and pipeline settings. Loaded from TOML with an
// env-var path override; every field has a built-in default so a missing
// file is not an error.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "CURATOR_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/curator.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CuratorConfig {
    /// Curated AI/ML site roots monitored each cycle.
    pub blog_urls: Vec<String>,
    /// Publisher slugs for the news-search source variant.
    pub news_sources: Vec<String>,
    pub news_api_enabled: bool,
    pub monitoring_interval_hours: u64,
    /// Recency window for feed entries, in days.
    pub max_search_days: u32,
    /// Default span for date-window searches, in days.
    pub date_range_days: u32,
    pub default_posts_limit: usize,
    /// Bound on concurrent per-source fetches.
    pub fetch_concurrency: usize,
    /// Keep items whose date is missing or unparseable. Deliberately
    /// permissive; flip off to trade completeness for precision.
    pub include_undated: bool,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            blog_urls: vec![
                // Big tech & research labs
                "https://deepmind.google/discover/blog".into(),
                "https://www.microsoft.com/en-us/research/blog/".into(),
                "https://www.anthropic.com/news".into(),
                "https://developer.nvidia.com/blog/".into(),
                // AI/ML news & research sites
                "https://venturebeat.com/ai/".into(),
                "https://www.technologyreview.com/topic/artificial-intelligence/".into(),
                "https://techcrunch.com/category/artificial-intelligence/".into(),
                "https://www.theverge.com/ai-artificial-intelligence".into(),
                "https://www.wired.com/tag/artificial-intelligence/".into(),
                // Academic & research
                "https://blog.research.google/".into(),
                "https://huggingface.co/blog".into(),
                "https://pytorch.org/blog/".into(),
            ],
            news_sources: vec![
                "techcrunch".into(),
                "the-verge".into(),
                "wired".into(),
                "ars-technica".into(),
                "engadget".into(),
                "venturebeat".into(),
                "mit-technology-review".into(),
            ],
            news_api_enabled: true,
            monitoring_interval_hours: 6,
            max_search_days: 30,
            date_range_days: 7,
            default_posts_limit: 20,
            fetch_concurrency: 4,
            include_undated: true,
        }
    }
}

/// Load config from an explicit path. Supports TOML or JSON formats,
/// chosen by file extension.
pub fn load_config_from(path: &Path) -> Result<CuratorConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading curator config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if ext == "json" {
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    } else {
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }
}

/// Load config using env var + fallbacks:
/// 1) $CURATOR_CONFIG_PATH
/// 2) config/curator.toml
/// 3) built-in defaults
pub fn load_config_default() -> Result<CuratorConfig> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        }
        return Err(anyhow!("CURATOR_CONFIG_PATH points to non-existent path"));
    }
    let default = PathBuf::from(DEFAULT_PATH);
    if default.exists() {
        return load_config_from(&default);
    }
    Ok(CuratorConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn partial_toml_overrides_keep_defaults() {
        let cfg: CuratorConfig = toml::from_str(
            r#"
            blog_urls = ["https://example.test/blog"]
            fetch_concurrency = 8
            "#,
        )
        .unwrap();
        assert_eq!(cfg.blog_urls, vec!["https://example.test/blog".to_string()]);
        assert_eq!(cfg.fetch_concurrency, 8);
        // Untouched fields fall back to defaults.
        assert_eq!(cfg.date_range_days, 7);
        assert!(cfg.include_undated);
    }

    #[test]
    fn json_config_loads_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curator.json");
        fs::write(&path, r#"{"date_range_days": 3}"#).unwrap();
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.date_range_days, 3);
    }

    #[serial_test::serial]
    #[test]
    fn env_path_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curator.toml");
        fs::write(&path, "max_search_days = 10\n").unwrap();

        env::set_var(ENV_PATH, path.display().to_string());
        let cfg = load_config_default().unwrap();
        assert_eq!(cfg.max_search_days, 10);
        env::remove_var(ENV_PATH);
    }

    #[serial_test::serial]
    #[test]
    fn missing_env_and_file_fall_back_to_defaults() {
        env::remove_var(ENV_PATH);
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        let cfg = load_config_default().unwrap();
        assert_eq!(cfg.monitoring_interval_hours, 6);
        assert_eq!(cfg.blog_urls.len(), 12);

        env::set_current_dir(&old).unwrap();
    }
}
