//! Deterministic text normalization shared by the scorer and the classifier.
//!
//! Every character that is neither alphanumeric nor whitespace becomes a
//! single space, the whole string is lowercased, and the result is split on
//! whitespace runs. Unicode letters (accented characters) count as
//! alphanumeric, so "canción" survives intact. No stemming.

use std::collections::HashSet;

/// Normalize `text` into lowercase tokens.
///
/// Empty and punctuation-only inputs yield an empty vector.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Tokenize and drop stopwords. With an empty stopword set this is exactly
/// `tokenize`.
pub fn tokenize_filtered(text: &str, stopwords: &HashSet<String>) -> Vec<String> {
    let tokens = tokenize(text);
    if stopwords.is_empty() {
        return tokens;
    }
    tokens
        .into_iter()
        .filter(|t| !stopwords.contains(t))
        .collect()
}

/// Space-padded, space-joined token stream used for phrase matching:
/// `" tok1 tok2 ... tokN "`. A phrase `p` occurs iff the stream contains
/// `" p "`, which makes the check insensitive to the punctuation the
/// tokenizer already removed.
pub fn padded_stream(tokens: &[String]) -> String {
    let mut out = String::with_capacity(tokens.iter().map(|t| t.len() + 1).sum::<usize>() + 2);
    out.push(' ');
    for t in tokens {
        out.push_str(t);
        out.push(' ');
    }
    out
}
