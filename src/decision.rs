//! decision.rs — verdict types and the serialized shape the API returns.
//!
//! The "no keyword matched anywhere" case is its own `Evaluation` variant
//! instead of a sentinel category name threaded through string comparisons;
//! callers must handle both arms explicitly.

use serde::{Deserialize, Serialize};

/// One emotion with its share of the total score mass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEmotion {
    pub emotion: String,
    /// Rounded integer percentage of total score mass.
    pub percentage: u32,
}

/// Component breakdown of the composite approval score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeBreakdown {
    /// Dominant emotion's percentage share, weighted 0.5.
    pub relevance: u32,
    /// `min(categories with percentage > 5, 5) / 5`, weighted 20.
    pub diversity_factor: f32,
    /// 1.0 when the topic classifier produced a non-default category.
    pub category_bonus: f32,
    /// `0.5·relevance + 20·diversity_factor + 30·category_bonus`.
    pub score: f32,
}

/// Complete decision for one scored submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub dominant: String,
    /// Relevance: the dominant emotion's percentage of total score mass.
    pub relevance: u32,
    pub approved: bool,
    /// All emotions by percentage descending, alphabetical on ties.
    pub ranked: Vec<RankedEmotion>,
    pub composite: CompositeBreakdown,
    /// Topic category assigned by the secondary classifier, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Outcome of classifying one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum Evaluation {
    /// At least one keyword matched; a dominant emotion exists.
    Scored(Verdict),
    /// No keyword matched at all. Never approved, never journaled.
    NoSignal,
}

impl Evaluation {
    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            Evaluation::Scored(v) => Some(v),
            Evaluation::NoSignal => None,
        }
    }

    pub fn approved(&self) -> bool {
        self.verdict().map(|v| v.approved).unwrap_or(false)
    }
}

pub(crate) fn clamp01(x: f32) -> f32 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}
