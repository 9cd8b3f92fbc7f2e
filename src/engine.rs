//! # Decision Engine
//! Pure, testable logic that maps `(score map, categorization)` → `Evaluation`.
//! No I/O, suitable for unit tests and offline evaluation.
//!
//! Policy: percentages over total score mass, dominant emotion by explicit
//! `(−score, name)` ordering (alphabetical on ties, never map iteration
//! order), then approval against the configured threshold. The canonical
//! approval policy blends relevance, category diversity, and a
//! categorization bonus into one composite score; the original
//! relevance-only rule survives as a selectable legacy policy.

use crate::analyze::scorer::ScoreMap;
use crate::category::Categorization;
use crate::config::{ApprovalConfig, ApprovalPolicy};
use crate::decision::{clamp01, CompositeBreakdown, Evaluation, RankedEmotion, Verdict};

/// Integer percentage of total score mass per emotion.
///
/// A zero total is replaced by 1 as divisor, so all-zero score maps yield
/// all-zero percentages instead of a division error.
pub fn percentages(scores: &ScoreMap) -> Vec<(String, u32)> {
    let total: i64 = scores.values().sum();
    let divisor = if total == 0 { 1 } else { total };
    scores
        .iter()
        .map(|(name, &score)| {
            let pct = (score as f64 / divisor as f64 * 100.0).round() as u32;
            (name.clone(), pct)
        })
        .collect()
}

/// Rank emotions by percentage descending; alphabetical on equal percentage.
fn rank(mut percentages: Vec<(String, u32)>) -> Vec<RankedEmotion> {
    percentages.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    percentages
        .into_iter()
        .map(|(emotion, percentage)| RankedEmotion {
            emotion,
            percentage,
        })
        .collect()
}

/// Dominant emotion: highest raw score, alphabetical on ties.
fn dominant(scores: &ScoreMap) -> Option<(&str, i64)> {
    scores
        .iter()
        .map(|(name, &score)| (name.as_str(), score))
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
}

/// `min(count of emotions above 5 %, 5) / 5`, in [0, 1].
fn diversity_factor(percentages: &[(String, u32)]) -> f32 {
    let above = percentages.iter().filter(|(_, pct)| *pct > 5).count();
    clamp01(above.min(5) as f32 / 5.0)
}

/// Evaluate one score map into a verdict, or `NoSignal` when nothing matched.
pub fn evaluate(
    scores: &ScoreMap,
    categorization: &Categorization,
    approval: &ApprovalConfig,
) -> Evaluation {
    let total: i64 = scores.values().sum();
    if total == 0 {
        return Evaluation::NoSignal;
    }

    let pcts = percentages(scores);
    // total > 0 implies at least one entry exists
    let (dominant_name, _) = dominant(scores).expect("non-empty score map");
    let relevance = pcts
        .iter()
        .find(|(name, _)| name == dominant_name)
        .map(|(_, pct)| *pct)
        .unwrap_or(0);

    let diversity = diversity_factor(&pcts);
    let category_bonus = if categorization.is_categorized() {
        1.0
    } else {
        0.0
    };
    let composite_score = 0.5 * relevance as f32 + 20.0 * diversity + 30.0 * category_bonus;

    let allowed = approval.allow_list.contains(dominant_name);
    let metric = match approval.policy {
        ApprovalPolicy::Composite => composite_score,
        // Legacy rule: compare raw relevance percentage.
        ApprovalPolicy::Relevance => relevance as f32,
    };
    let approved = allowed && metric >= approval.threshold;

    Evaluation::Scored(Verdict {
        dominant: dominant_name.to_string(),
        relevance,
        approved,
        ranked: rank(pcts),
        composite: CompositeBreakdown {
            relevance,
            diversity_factor: diversity,
            category_bonus,
            score: composite_score,
        },
        category: categorization.name().map(str::to_string),
    })
}
