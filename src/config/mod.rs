//! Engine configuration: TOML file + env overrides.
//!
//! Resolution order: `ENGINE_CONFIG_PATH` (or `config/engine.toml`), then
//! `APPROVAL_THRESHOLD` may override the file's threshold. Missing file falls
//! back to documented defaults so local runs work out of the box; a present
//! but malformed file is an error.

pub mod ai;

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config/engine.toml";
pub const ENV_CONFIG_PATH: &str = "ENGINE_CONFIG_PATH";
pub const ENV_APPROVAL_THRESHOLD: &str = "APPROVAL_THRESHOLD";

/// Which approval formula gates a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalPolicy {
    /// Canonical: composite of relevance, diversity, and category bonus.
    Composite,
    /// Legacy: raw relevance percentage against the threshold.
    Relevance,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalConfig {
    #[serde(default = "default_policy")]
    pub policy: ApprovalPolicy,
    /// Default 50.0 — calibrated for the composite scale (see DESIGN.md);
    /// the legacy relevance policy historically ran at 25.
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    #[serde(default = "default_allow_list")]
    pub allow_list: BTreeSet<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LexiconPaths {
    #[serde(default = "default_emotions_path")]
    pub emotions: PathBuf,
    #[serde(default = "default_categories_path")]
    pub categories: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_excerpt_max_chars")]
    pub excerpt_max_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Payloads shorter than this are ignored/rejected before scoring.
    #[serde(default = "default_min_text_len")]
    pub min_text_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_lexicon_paths")]
    pub lexicons: LexiconPaths,
    #[serde(default = "default_approval")]
    pub approval: ApprovalConfig,
    #[serde(default = "default_report")]
    pub report: ReportConfig,
    #[serde(default = "default_summary")]
    pub summary: SummaryConfig,
    #[serde(default = "default_input")]
    pub input: InputConfig,
    /// Optional stopword list applied before scoring. Empty = disabled.
    #[serde(default)]
    pub stopwords: Vec<String>,
}

fn default_policy() -> ApprovalPolicy {
    ApprovalPolicy::Composite
}
fn default_threshold() -> f32 {
    50.0
}
fn default_allow_list() -> BTreeSet<String> {
    ["Dopamina", "Oxitocina", "Serotonina", "Asombro"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_emotions_path() -> PathBuf {
    PathBuf::from("lexicons/emotions")
}
fn default_categories_path() -> PathBuf {
    PathBuf::from("lexicons/categories")
}
fn default_excerpt_max_chars() -> usize {
    500
}
fn default_top_n() -> usize {
    3
}
fn default_min_text_len() -> usize {
    10
}
fn default_lexicon_paths() -> LexiconPaths {
    LexiconPaths {
        emotions: default_emotions_path(),
        categories: default_categories_path(),
    }
}
fn default_approval() -> ApprovalConfig {
    ApprovalConfig {
        policy: default_policy(),
        threshold: default_threshold(),
        allow_list: default_allow_list(),
    }
}
fn default_report() -> ReportConfig {
    ReportConfig {
        excerpt_max_chars: default_excerpt_max_chars(),
    }
}
fn default_summary() -> SummaryConfig {
    SummaryConfig {
        top_n: default_top_n(),
    }
}
fn default_input() -> InputConfig {
    InputConfig {
        min_text_len: default_min_text_len(),
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lexicons: default_lexicon_paths(),
            approval: default_approval(),
            report: default_report(),
            summary: default_summary(),
            input: default_input(),
            stopwords: Vec::new(),
        }
    }
}

// parse optional float env; negative values are ignored
fn parse_threshold_env(raw: Option<String>) -> Option<f32> {
    raw.and_then(|s| s.trim().parse::<f32>().ok())
        .filter(|v| *v >= 0.0 && v.is_finite())
}

impl EngineConfig {
    /// Load from `ENGINE_CONFIG_PATH` (default `config/engine.toml`), then
    /// apply env overrides. A missing file yields defaults; a malformed file
    /// is an error.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut cfg = match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "failed to read engine config at {}: {e}",
                    path.display()
                ))
            }
        };

        if let Some(t) = parse_threshold_env(std::env::var(ENV_APPROVAL_THRESHOLD).ok()) {
            cfg.approval.threshold = t;
        }
        if !cfg.approval.threshold.is_finite() {
            cfg.approval.threshold = default_threshold();
        }
        Ok(cfg)
    }

    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let cfg: EngineConfig = toml::from_str(toml_str)?;
        Ok(cfg)
    }

    pub fn stopword_set(&self) -> std::collections::HashSet<String> {
        self.stopwords.iter().map(|s| s.to_lowercase()).collect()
    }
}
