// tests/engine_policy.rs
//
// Approval policy behavior end-to-end through EmotionEngine: composite vs
// legacy relevance, allow-list gating, threshold boundaries, NoSignal.

use news_emotion_analyzer::analyze::EmotionEngine;
use news_emotion_analyzer::config::{ApprovalPolicy, EngineConfig};
use news_emotion_analyzer::decision::Evaluation;
use news_emotion_analyzer::lexicon::Lexicon;

fn emotions() -> Lexicon {
    Lexicon::from_entries([
        ("Oxitocina", vec![("ayuda", 1), ("amor", 1)]),
        ("Dopamina", vec![("logro", 1)]),
        ("Adrenalina", vec![("peligro", 1)]),
    ])
}

fn categories() -> Lexicon {
    Lexicon::from_entries([("Solidaridad", vec![("voluntarios", 1)])])
}

fn engine_with(policy: ApprovalPolicy, threshold: f32) -> EmotionEngine {
    let mut config = EngineConfig::default();
    config.approval.policy = policy;
    config.approval.threshold = threshold;
    EmotionEngine::new(emotions(), categories(), config)
}

#[test]
fn composite_approves_categorized_dominant_in_allow_list() {
    // ayuda ×6, logro ×1 → Oxitocina 86 %, Dopamina 14 %; two emotions > 5 %;
    // voluntarios categorizes. Composite = 0.5·86 + 20·0.4 + 30 = 81.
    let engine = engine_with(ApprovalPolicy::Composite, 50.0);
    let text = "ayuda ayuda ayuda ayuda ayuda ayuda logro voluntarios";
    let e = engine.classify(text).unwrap();
    let v = e.verdict().unwrap();
    assert_eq!(v.dominant, "Oxitocina");
    assert!((v.composite.score - 81.0).abs() < 0.5);
    assert!(v.approved);
}

#[test]
fn composite_rejects_uncategorized_low_diversity_text() {
    // Only Adrenalina matches: relevance 100 but not allow-listed.
    let engine = engine_with(ApprovalPolicy::Composite, 50.0);
    let e = engine.classify("mucho peligro en la carretera").unwrap();
    let v = e.verdict().unwrap();
    assert_eq!(v.dominant, "Adrenalina");
    assert!(!v.approved, "allow-list gates approval");
}

#[test]
fn composite_threshold_boundary_is_inclusive() {
    // Single allow-listed emotion, categorized: relevance 100, diversity 0.2.
    // Composite = 50 + 4 + 30 = 84 → approve at 84.0, reject at 84.1.
    let text = "ayuda de los voluntarios";
    let engine = engine_with(ApprovalPolicy::Composite, 84.0);
    assert!(engine.classify(text).unwrap().approved());

    let engine = engine_with(ApprovalPolicy::Composite, 84.1);
    assert!(!engine.classify(text).unwrap().approved());
}

#[test]
fn legacy_relevance_policy_reproduces_original_rule() {
    // Original rule: relevance ≥ 25 and dominant in the allow-list.
    let engine = engine_with(ApprovalPolicy::Relevance, 25.0);

    // Oxitocina 50 % (ayuda, amor vs logro, peligro → 2 vs 1 vs 1).
    let e = engine.classify("ayuda y amor, un logro, algo de peligro").unwrap();
    let v = e.verdict().unwrap();
    assert_eq!(v.dominant, "Oxitocina");
    assert_eq!(v.relevance, 50);
    assert!(v.approved);

    // Below 25 % relevance: never approved under the legacy rule.
    let engine = engine_with(ApprovalPolicy::Relevance, 80.0);
    let e = engine.classify("ayuda y amor, un logro, algo de peligro").unwrap();
    assert!(!e.approved());
}

#[test]
fn no_signal_for_unmatched_text_regardless_of_policy() {
    for policy in [ApprovalPolicy::Composite, ApprovalPolicy::Relevance] {
        let engine = engine_with(policy, 0.0);
        let e = engine.classify("completely unrelated english text").unwrap();
        assert_eq!(e, Evaluation::NoSignal);
        assert!(!e.approved(), "approved=false even with threshold 0");
    }
}

#[test]
fn ranked_list_is_percentage_descending_with_alphabetical_ties() {
    let engine = engine_with(ApprovalPolicy::Composite, 50.0);
    // Oxitocina 2, Dopamina 1, Adrenalina 1 → 50/25/25.
    let e = engine.classify("ayuda y amor, un logro, algo de peligro").unwrap();
    let v = e.verdict().unwrap();
    let order: Vec<&str> = v.ranked.iter().map(|r| r.emotion.as_str()).collect();
    assert_eq!(order, vec!["Oxitocina", "Adrenalina", "Dopamina"]);
}

#[test]
fn verdicts_are_identical_across_repeated_calls() {
    let engine = engine_with(ApprovalPolicy::Composite, 50.0);
    let text = "ayuda de voluntarios tras el logro";
    let first = engine.classify(text).unwrap();
    for _ in 0..3 {
        assert_eq!(engine.classify(text).unwrap(), first);
    }
}
