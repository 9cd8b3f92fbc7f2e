//! Lexicon-weighted scoring over a token sequence.
//!
//! Single-word keywords contribute `occurrences × weight`; multi-word
//! keywords contribute `weight` once if the phrase is present at all —
//! counting phrase occurrences over the joined token stream would
//! double-count overlapping windows. Both rules feed the same per-category
//! sum.

use std::collections::{BTreeMap, HashMap};

use crate::lexicon::Lexicon;
use crate::tokenize::padded_stream;

/// Per-category accumulated score. Every category declared in the lexicon is
/// present, 0 when nothing matched.
pub type ScoreMap = BTreeMap<String, i64>;

/// Score `tokens` against every category of `lexicon`.
///
/// Pure: same tokens + same lexicon → same map, in category-name order.
pub fn score_tokens(tokens: &[String], lexicon: &Lexicon) -> ScoreMap {
    let mut counts: HashMap<&str, i64> = HashMap::with_capacity(tokens.len());
    for t in tokens {
        *counts.entry(t.as_str()).or_insert(0) += 1;
    }
    let stream = padded_stream(tokens);

    let mut scores = ScoreMap::new();
    for (category, keywords) in lexicon.iter() {
        let mut total: i64 = 0;
        for (keyword, &weight) in keywords {
            total += keyword_contribution(keyword, weight, &counts, &stream);
        }
        scores.insert(category.to_string(), total);
    }
    scores
}

/// Like `score_tokens`, but also reports which keywords matched per category.
/// The matched-terms set only matters for tie-breaking in the category
/// classifier, so the plain scorer skips the bookkeeping.
pub fn score_tokens_with_matches(
    tokens: &[String],
    lexicon: &Lexicon,
) -> BTreeMap<String, (i64, Vec<String>)> {
    let mut counts: HashMap<&str, i64> = HashMap::with_capacity(tokens.len());
    for t in tokens {
        *counts.entry(t.as_str()).or_insert(0) += 1;
    }
    let stream = padded_stream(tokens);

    let mut out = BTreeMap::new();
    for (category, keywords) in lexicon.iter() {
        let mut total: i64 = 0;
        let mut matched = Vec::new();
        for (keyword, &weight) in keywords {
            let c = keyword_contribution(keyword, weight, &counts, &stream);
            if c > 0 {
                total += c;
                matched.push(keyword.clone());
            }
        }
        out.insert(category.to_string(), (total, matched));
    }
    out
}

fn keyword_contribution(
    keyword: &str,
    weight: u32,
    counts: &HashMap<&str, i64>,
    stream: &str,
) -> i64 {
    if keyword.contains(' ') {
        // Phrase: presence-based, not frequency-based.
        let needle = format!(" {keyword} ");
        if stream.contains(&needle) {
            weight as i64
        } else {
            0
        }
    } else {
        counts.get(keyword).copied().unwrap_or(0) * weight as i64
    }
}
