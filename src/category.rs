//! Topic-category classifier over the second lexicon family.
//!
//! Same scoring rules as the emotion scorer, different bookkeeping: every
//! keyword that matched is recorded per category, and that matched-terms set
//! breaks ties between categories with the same maximum score (more distinct
//! matched terms wins, then alphabetical). Categories with zero score are
//! omitted rather than zero-padded, and a text matching nothing is
//! `Uncategorized` — a variant, not a magic string.

use serde::{Deserialize, Serialize};

use crate::analyze::scorer::score_tokens_with_matches;
use crate::lexicon::Lexicon;

/// Result of topic categorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Categorization {
    Matched {
        name: String,
        score: i64,
        /// Distinct lexicon keywords that matched, sorted.
        matched_terms: Vec<String>,
    },
    Uncategorized,
}

impl Categorization {
    pub fn name(&self) -> Option<&str> {
        match self {
            Categorization::Matched { name, .. } => Some(name),
            Categorization::Uncategorized => None,
        }
    }

    pub fn is_categorized(&self) -> bool {
        matches!(self, Categorization::Matched { .. })
    }
}

/// Classify `tokens` against the category lexicon.
pub fn categorize(tokens: &[String], lexicon: &Lexicon) -> Categorization {
    let scored = score_tokens_with_matches(tokens, lexicon);

    // Drop zero-score categories entirely.
    let mut candidates: Vec<(String, i64, Vec<String>)> = scored
        .into_iter()
        .filter(|(_, (score, _))| *score > 0)
        .map(|(name, (score, matched))| (name, score, matched))
        .collect();

    if candidates.is_empty() {
        return Categorization::Uncategorized;
    }

    // Highest score first; equal scores fall back to the larger matched-terms
    // set, then to the alphabetically first name.
    candidates.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| b.2.len().cmp(&a.2.len()))
            .then_with(|| a.0.cmp(&b.0))
    });

    let (name, score, matched_terms) = candidates.swap_remove(0);
    Categorization::Matched {
        name,
        score,
        matched_terms,
    }
}
