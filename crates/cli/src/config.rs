use anyhow::{anyhow, Context as AnyhowContext, Result};
use harvest_pipeline::{DEFAULT_DELAY, DEFAULT_OUT_DIR};
use harvest_sources::{
    ContentMode, DEFAULT_AUTHORITY, DEFAULT_GRAPHQL_URL, DEFAULT_LABELS_URL, DEFAULT_NLU_URL,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "harvest.toml";

/// Resolved settings: defaults, then the config file, then the environment. Command
/// line flags are applied on top by the individual commands.
#[derive(Clone, Debug, PartialEq)]
pub struct HarvestConfig {
    pub graphql_url: String,
    pub authority: String,
    pub nlu_url: String,
    pub nlu_api_key: Option<String>,
    pub nlu_language: Option<String>,
    pub content_mode: ContentMode,
    pub labels_url: String,
    pub language: String,
    pub fallback_language: String,
    pub delay: Duration,
    pub out_dir: PathBuf,
    pub timeout: Option<Duration>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            authority: DEFAULT_AUTHORITY.to_string(),
            nlu_url: DEFAULT_NLU_URL.to_string(),
            nlu_api_key: None,
            nlu_language: None,
            content_mode: ContentMode::PlainText,
            labels_url: DEFAULT_LABELS_URL.to_string(),
            language: "en".to_string(),
            fallback_language: "en".to_string(),
            delay: DEFAULT_DELAY,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            timeout: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    graphql_url: Option<String>,
    authority: Option<String>,
    nlu_url: Option<String>,
    nlu_api_key: Option<String>,
    nlu_language: Option<String>,
    strip_markup: Option<bool>,
    labels_url: Option<String>,
    language: Option<String>,
    fallback_language: Option<String>,
    delay_ms: Option<u64>,
    out_dir: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

impl HarvestConfig {
    /// Reads `explicit` (must exist) or `harvest.toml` in the working directory (if
    /// present), then applies `HARVEST_*` / `ROSETTE_API_KEY` environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut cfg = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.is_file() {
                    Self::from_file(implicit)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(text).map_err(|err| anyhow!("{err}"))?;
        Ok(merge(raw))
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = var("HARVEST_GRAPHQL_URL") {
            self.graphql_url = v;
        }
        if let Some(v) = var("HARVEST_AUTHORITY") {
            self.authority = v;
        }
        if let Some(v) = var("HARVEST_NLU_URL") {
            self.nlu_url = v;
        }
        if let Some(v) = var("ROSETTE_API_KEY") {
            self.nlu_api_key = Some(v);
        }
        if let Some(v) = var("HARVEST_LABELS_URL") {
            self.labels_url = v;
        }
        if let Some(v) = var("HARVEST_LANG") {
            self.language = v;
        }
        if let Some(v) = var("HARVEST_FALLBACK_LANG") {
            self.fallback_language = v;
        }
        if let Some(v) = var("HARVEST_DELAY_MS") {
            let ms: u64 = v
                .parse()
                .with_context(|| format!("HARVEST_DELAY_MS must be an integer, got '{v}'"))?;
            self.delay = Duration::from_millis(ms);
        }
        if let Some(v) = var("HARVEST_OUT_DIR") {
            self.out_dir = PathBuf::from(v);
        }
        Ok(())
    }
}

fn merge(raw: RawConfig) -> HarvestConfig {
    let defaults = HarvestConfig::default();
    HarvestConfig {
        graphql_url: raw.graphql_url.unwrap_or(defaults.graphql_url),
        authority: raw.authority.unwrap_or(defaults.authority),
        nlu_url: raw.nlu_url.unwrap_or(defaults.nlu_url),
        nlu_api_key: raw.nlu_api_key.or(defaults.nlu_api_key),
        nlu_language: raw.nlu_language.or(defaults.nlu_language),
        content_mode: match raw.strip_markup {
            Some(false) => ContentMode::Raw,
            _ => defaults.content_mode,
        },
        labels_url: raw.labels_url.unwrap_or(defaults.labels_url),
        language: raw.language.unwrap_or(defaults.language),
        fallback_language: raw.fallback_language.unwrap_or(defaults.fallback_language),
        delay: raw.delay_ms.map_or(defaults.delay, Duration::from_millis),
        out_dir: raw.out_dir.unwrap_or(defaults.out_dir),
        timeout: raw.timeout_secs.map(Duration::from_secs).or(defaults.timeout),
    }
}
