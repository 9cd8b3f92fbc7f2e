// tests/e2e_smoke.rs
//
// Boots the full application router from the shipped configuration and
// lexicons (no mocks) and smoke-tests the read-only surface. Env-dependent,
// so serialized.

use axum::{
    body::{to_bytes, Body},
    http::Request,
};
use http::StatusCode;
use serial_test::serial;
use tokio::sync::OnceCell;
use tower::ServiceExt;

use news_emotion_analyzer::app;

// --- Router cache (build once per test binary) ---
static ROUTER: OnceCell<axum::Router> = OnceCell::const_new();

async fn test_app() -> axum::Router {
    ROUTER
        .get_or_init(|| async {
            let mut path = std::env::temp_dir();
            let nanos = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos();
            path.push(format!("e2e_journal_{nanos}.csv"));
            std::env::set_var("JOURNAL_PATH", &path);

            app().await.expect("app() should build a Router")
        })
        .await
        .clone()
}

#[tokio::test]
#[serial]
async fn health_and_metrics_respond() {
    let router = test_app().await;

    let resp = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = router
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("approval_threshold"));
}

#[tokio::test]
#[serial]
async fn classify_against_the_shipped_lexicons() {
    let router = test_app().await;

    let req = Request::builder()
        .method("POST")
        .uri("/classify")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({
                "text": "Los voluntarios del barrio organizaron una donación y mucha ayuda; \
                         la solidaridad fue protagonista."
            })
            .to_string(),
        ))
        .unwrap();

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 256 * 1024).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(v["signal"], serde_json::json!("scored"));
    assert_eq!(v["dominant"], serde_json::json!("Oxitocina"));
    assert_eq!(v["category"], serde_json::json!("Solidaridad"));
    assert!(v["report"]
        .as_str()
        .unwrap()
        .contains("Emoción dominante"));
}
