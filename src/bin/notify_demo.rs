//! Demo that pushes a few classified texts through the notifier multiplexer
//! (stdout/log only when no channel is configured).

use news_emotion_analyzer::analyze::EmotionEngine;
use news_emotion_analyzer::config::EngineConfig;
use news_emotion_analyzer::{NotificationEvent, NotifierMux};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();
    let mux = NotifierMux::from_env();

    let engine = EmotionEngine::from_config(EngineConfig::default())
        .expect("lexicons under lexicons/ required for the demo");

    let samples = [
        "Los voluntarios del barrio organizaron una donación y mucha ayuda para las familias.",
        "Un descubrimiento científico sorprendente: la investigación logra un avance inédito.",
        "Alerta por la crisis: tensión y enfrentamiento en el centro de la ciudad.",
    ];

    for text in samples {
        match engine.classify_and_format(text, None) {
            Ok((_, report)) => {
                println!("{report}\n---");
                mux.dispatch(&NotificationEvent::now(report)).await;
            }
            Err(e) => eprintln!("classification failed: {e}"),
        }
        tokio::time::sleep(std::time::Duration::from_millis(400)).await;
    }

    println!("notify-demo done");
}
