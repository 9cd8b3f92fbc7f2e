// src/analyze/mod.rs
//! Analysis pipeline entry: tokenize → score → categorize → decide.
//!
//! `EmotionEngine` owns the immutable lexicons plus configuration and exposes
//! the pure core operations. It is built once at startup (fail-fast on
//! lexicon problems) and shared by reference; classification mutates nothing.

pub mod ai_adapter;
pub mod scorer;

use std::collections::HashSet;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tracing::info;

use crate::category::{categorize, Categorization};
use crate::config::EngineConfig;
use crate::decision::Evaluation;
use crate::engine;
use crate::error::ClassifyError;
use crate::lexicon::Lexicon;
use crate::report::render_report;
use crate::tokenize::tokenize_filtered;

// Re-export convenient types.
pub use ai_adapter::{AiCategory, AiClient, DynAiClient};
pub use scorer::{score_tokens, ScoreMap};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("classify_total", "Texts classified.");
        describe_counter!("classify_approved_total", "Verdicts approved.");
        describe_counter!("classify_rejected_total", "Verdicts rejected.");
        describe_counter!(
            "classify_no_signal_total",
            "Classifications with no keyword match."
        );
        describe_counter!("journal_append_errors_total", "Journal write failures.");
        describe_counter!("notify_errors_total", "Notification delivery failures.");
        describe_counter!("fetch_errors_total", "Content fetch failures.");
    });
}

/// Dev logging gate: `EMOTION_DEV_LOG=1` AND a dev environment (debug build
/// or SHUTTLE_ENV in {local, development, dev}).
fn dev_logging_enabled() -> bool {
    let on = std::env::var("EMOTION_DEV_LOG").ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Short stable hash for log correlation. Raw text never reaches the logs.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn dev_log_classify(text: &str, evaluation: &Evaluation) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(text);
    match evaluation {
        Evaluation::Scored(v) => info!(
            target: "classify",
            %id,
            dominant = %v.dominant,
            relevance = v.relevance,
            composite = v.composite.score,
            approved = v.approved,
            "classified"
        ),
        Evaluation::NoSignal => info!(target: "classify", %id, "no signal"),
    }
}

/// Merge the optional AI opinion into the local categorization.
///
/// The local classifier always wins when it matched something; the AI answer
/// is accepted only when it names a category the lexicon declares
/// (case-insensitive), so the provider cannot widen the category space.
pub fn merge_category_opinion(
    local: Categorization,
    opinion: Option<&AiCategory>,
    lexicon: &Lexicon,
) -> Categorization {
    if local.is_categorized() {
        return local;
    }
    let Some(op) = opinion else {
        return local;
    };
    let canonical = lexicon
        .category_names()
        .find(|name| name.eq_ignore_ascii_case(&op.category));
    match canonical {
        Some(name) => Categorization::Matched {
            name: name.to_string(),
            // Assigned by the secondary opinion; no lexicon evidence.
            score: 0,
            matched_terms: Vec::new(),
        },
        None => local,
    }
}

/// The scoring core: immutable lexicons + configuration.
pub struct EmotionEngine {
    emotions: Lexicon,
    categories: Lexicon,
    config: EngineConfig,
    stopwords: HashSet<String>,
}

impl EmotionEngine {
    pub fn new(emotions: Lexicon, categories: Lexicon, config: EngineConfig) -> Self {
        ensure_metrics_described();
        let stopwords = config.stopword_set();
        Self {
            emotions,
            categories,
            config,
            stopwords,
        }
    }

    /// Load both lexicon families from the configured paths. Any failure is
    /// fatal: the process must not serve with a partial lexicon.
    pub fn from_config(config: EngineConfig) -> Result<Self, ClassifyError> {
        let emotions = Lexicon::load(&config.lexicons.emotions)?;
        let categories = Lexicon::load(&config.lexicons.categories)?;
        info!(
            emotions = emotions.len(),
            categories = categories.len(),
            "lexicons loaded"
        );
        Ok(Self::new(emotions, categories, config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn category_names(&self) -> Vec<String> {
        self.categories.category_names().map(String::from).collect()
    }

    fn validate_input<'a>(&self, text: &'a str) -> Result<&'a str, ClassifyError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ClassifyError::input("empty text"));
        }
        if trimmed.chars().count() < self.config.input.min_text_len {
            return Err(ClassifyError::input(format!(
                "text shorter than {} chars",
                self.config.input.min_text_len
            )));
        }
        Ok(trimmed)
    }

    /// Classify `text` without an AI opinion.
    pub fn classify(&self, text: &str) -> Result<Evaluation, ClassifyError> {
        self.classify_with_opinion(text, None)
    }

    /// Classify `text`, merging an optional AI category opinion.
    pub fn classify_with_opinion(
        &self,
        text: &str,
        opinion: Option<&AiCategory>,
    ) -> Result<Evaluation, ClassifyError> {
        let text = self.validate_input(text)?;
        let tokens = tokenize_filtered(text, &self.stopwords);

        let scores = scorer::score_tokens(&tokens, &self.emotions);
        let local = categorize(&tokens, &self.categories);
        let merged = merge_category_opinion(local, opinion, &self.categories);

        let evaluation = engine::evaluate(&scores, &merged, &self.config.approval);

        counter!("classify_total").increment(1);
        match &evaluation {
            Evaluation::Scored(v) if v.approved => {
                counter!("classify_approved_total").increment(1)
            }
            Evaluation::Scored(_) => counter!("classify_rejected_total").increment(1),
            Evaluation::NoSignal => counter!("classify_no_signal_total").increment(1),
        }
        dev_log_classify(text, &evaluation);

        Ok(evaluation)
    }

    /// Classify and render the outbound report in one step.
    pub fn classify_and_format(
        &self,
        text: &str,
        source_url: Option<&str>,
    ) -> Result<(Evaluation, String), ClassifyError> {
        let evaluation = self.classify(text)?;
        let report = render_report(
            &evaluation,
            text,
            source_url,
            self.config.report.excerpt_max_chars,
        );
        Ok((evaluation, report))
    }
}
