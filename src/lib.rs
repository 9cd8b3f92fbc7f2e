// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod category;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod journal;
pub mod lexicon;
pub mod report;
pub mod summary;
pub mod tokenize;

// Analysis pipeline (scorer, AI adapter, EmotionEngine)
pub mod analyze;

// Notifications
pub mod notify;

pub mod ai_bootstrap;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{ai_adapter, EmotionEngine};
pub use crate::api::{app, create_router, AppState};
pub use crate::decision::{Evaluation, Verdict};
pub use crate::error::ClassifyError;
pub use crate::lexicon::Lexicon;
pub use crate::notify::{NotificationEvent, Notifier, NotifierMux};

use tracing::info;

/// Call this from your Shuttle entrypoint (after tracing init) to perform a
/// one-off smoke test of the AI provider. It won't panic on failure; it just
/// logs the result.
pub async fn run_ai_quick_probe(candidates: Vec<String>) -> anyhow::Result<()> {
    // Path is relative to the runtime working dir (repo root in `cargo shuttle run`)
    let ai = ai_bootstrap::AiRuntime::from_path("config/ai.json", candidates)?;
    ai.quick_probe().await;
    info!("AI quick probe finished");
    Ok(())
}
