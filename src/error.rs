//! Error taxonomy for the classification pipeline.
//!
//! The split matters operationally: `Input` is the caller's fault and is
//! reported back without side effects (no journal row, no notification),
//! `LexiconLoad` is fatal at startup, and `Collaborator` failures are logged
//! at the boundary without failing the classification itself.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// Empty or too-short text, malformed payload.
    #[error("invalid input: {0}")]
    Input(String),

    /// Missing or malformed lexicon file. The process must not serve
    /// requests with a partially loaded lexicon.
    #[error("lexicon load failed for {}: {reason}", path.display())]
    LexiconLoad { path: PathBuf, reason: String },

    /// Fetch / notify / journal failure. Distinct from a classification
    /// failure: the verdict may already exist when this occurs.
    #[error("collaborator `{who}` failed: {reason}")]
    Collaborator { who: &'static str, reason: String },
}

impl ClassifyError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn collaborator(who: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Collaborator {
            who,
            reason: err.to_string(),
        }
    }
}
