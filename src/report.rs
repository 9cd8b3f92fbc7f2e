//! Outbound report formatting: the HTML message posted to the channel.
//!
//! Fixed template: verdict banner, dominant emotion with its emoji,
//! relevance and composite lines, detected category, ranked remainder,
//! bounded excerpt, optional source URL. Channel-agnostic — the notifier
//! decides where it goes.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::decision::{Evaluation, Verdict};
use crate::summary::Summary;

/// Emotion → decorative emoji. Unknown emotions render without one.
static EMOJI: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Dopamina", "✨"),
        ("Oxitocina", "❤️"),
        ("Serotonina", "☀️"),
        ("Asombro", "🌟"),
        ("Adrenalina", "⚡"),
        ("Feniletilamina", "💘"),
        ("Norepinefrina", "🔥"),
        ("Anandamida", "🌈"),
        ("Acetilcolina", "📘"),
    ])
});

/// Render the full classification report.
pub fn render_report(
    evaluation: &Evaluation,
    text: &str,
    source_url: Option<&str>,
    excerpt_max_chars: usize,
) -> String {
    match evaluation {
        Evaluation::Scored(v) => render_verdict(v, text, source_url, excerpt_max_chars),
        Evaluation::NoSignal => render_no_signal(text, source_url, excerpt_max_chars),
    }
}

fn render_verdict(
    v: &Verdict,
    text: &str,
    source_url: Option<&str>,
    excerpt_max_chars: usize,
) -> String {
    let banner = if v.approved {
        "✅ Noticia Aprobada"
    } else {
        "❌ Noticia Rechazada"
    };
    let emoji = EMOJI.get(v.dominant.as_str()).copied().unwrap_or("");

    let others = v
        .ranked
        .iter()
        .filter(|r| r.emotion != v.dominant)
        .map(|r| format!("- {}: {}%", r.emotion, r.percentage))
        .collect::<Vec<_>>()
        .join("\n");

    let mut msg = format!(
        "{banner} (Relevancia: {rel}%)\n\
         <b>Emoción dominante:</b> {emoji} {dom}\n\
         <b>Relevancia emocional:</b> {rel}%\n\
         <b>Puntuación compuesta:</b> {comp:.1}\n",
        rel = v.relevance,
        dom = v.dominant,
        comp = v.composite.score,
    );
    if let Some(cat) = &v.category {
        msg.push_str(&format!("<b>Categoría:</b> {cat}\n"));
    }
    msg.push_str(&format!(
        "<b>Otras emociones detectadas:</b>\n{others}\n<b>Fragmento:</b>\n{}",
        excerpt(text, excerpt_max_chars)
    ));
    if let Some(url) = source_url {
        msg.push_str("\n\n");
        msg.push_str(url);
    }
    msg
}

fn render_no_signal(text: &str, source_url: Option<&str>, excerpt_max_chars: usize) -> String {
    let mut msg = format!(
        "❌ Noticia Rechazada (Relevancia: 0%)\n\
         <b>Emoción dominante:</b> ninguna detectada\n\
         <b>Fragmento:</b>\n{}",
        excerpt(text, excerpt_max_chars)
    );
    if let Some(url) = source_url {
        msg.push_str("\n\n");
        msg.push_str(url);
    }
    msg
}

/// Render the daily/all-time summary message.
pub fn render_summary(summary: &Summary) -> String {
    match summary {
        Summary::Empty => "⚠️ Aún no hay datos para mostrar un resumen.".to_string(),
        Summary::Top { total, entries } => {
            let mut msg = format!("<b>#Resumen Diario</b>\nTotal noticias: {total}\n");
            for e in entries {
                msg.push_str(&format!("- {}: {} ({}%)\n", e.category, e.count, e.percentage));
            }
            msg
        }
    }
}

/// Single-line excerpt, truncated to `max_chars` characters with an ellipsis
/// suffix. Truncation counts chars, not bytes, so multi-byte text never
/// splits a character.
fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.trim().replace('\n', " ");
    let count = flat.chars().count();
    if count <= max_chars {
        return flat;
    }
    let mut out: String = flat.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
