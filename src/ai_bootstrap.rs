// src/ai_bootstrap.rs
use crate::analyze::ai_adapter::{build_client_from_config, DynAiClient};
use crate::config::ai::AiConfig;
use std::sync::Arc;
use tracing::{info, warn};

/// Build an AI client from `config/ai.json`, falling back to a disabled
/// client when the file is missing or unreadable. `candidates` are the
/// declared category names the provider may answer with.
pub fn build_ai_client(path: &str, candidates: Vec<String>) -> DynAiClient {
    match AiConfig::load_from_file(path) {
        Ok(cfg) => {
            // Safe diagnostics: only provider + enabled + key length
            info!(
                "AI cfg loaded: provider={}, enabled={}, key_len={}",
                cfg.provider,
                cfg.enabled,
                cfg.api_key.len()
            );
            build_client_from_config(&cfg, candidates)
        }
        Err(e) => {
            warn!(error = %e, path, "AI config unavailable; categorization runs lexicon-only");
            Arc::new(crate::analyze::ai_adapter::DisabledClient)
        }
    }
}

pub struct AiRuntime {
    pub cfg: AiConfig,
    pub client: DynAiClient,
}

impl AiRuntime {
    pub fn from_path(path: &str, candidates: Vec<String>) -> anyhow::Result<Self> {
        let cfg = AiConfig::load_from_file(path)?;
        let client = build_client_from_config(&cfg, candidates);
        Ok(Self { cfg, client })
    }

    /// One-off smoke test of the provider. Logs the result; never panics.
    pub async fn quick_probe(&self) {
        if !self.cfg.enabled {
            warn!("AI quick_probe skipped: AI is disabled in config");
            return;
        }
        let sample = "Vecinos del barrio organizan una red de ayuda y donaciones para las familias afectadas.";
        let out = self.client.suggest(sample).await;
        info!("AI quick_probe => {:?}", out);
    }
}
