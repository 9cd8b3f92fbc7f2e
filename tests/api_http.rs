// tests/api_http.rs
//
// HTTP surface tests driving the router with `tower::ServiceExt::oneshot`.
// Collaborators are mocked: no network, temp-file journal, no sinks.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::Request,
};
use http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use news_emotion_analyzer::analyze::ai_adapter::DisabledClient;
use news_emotion_analyzer::analyze::EmotionEngine;
use news_emotion_analyzer::api::{create_router, AppState};
use news_emotion_analyzer::config::EngineConfig;
use news_emotion_analyzer::fetch::MockFetcher;
use news_emotion_analyzer::journal::Journal;
use news_emotion_analyzer::lexicon::Lexicon;
use news_emotion_analyzer::notify::NotifierMux;

fn unique_tmp_path(tag: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    dir.push(format!("api_http_{tag}_{nanos}.csv"));
    dir
}

fn test_engine() -> EmotionEngine {
    let emotions = Lexicon::from_entries([
        ("Oxitocina", vec![("ayuda", 2), ("amor", 1)]),
        ("Dopamina", vec![("logro", 1)]),
    ]);
    let categories = Lexicon::from_entries([("Solidaridad", vec![("voluntarios", 1)])]);
    EmotionEngine::new(emotions, categories, EngineConfig::default())
}

fn router_with(fetcher: MockFetcher, journal_path: &PathBuf) -> axum::Router {
    let state = AppState::new(
        Arc::new(test_engine()),
        Arc::new(Journal::new(journal_path)),
        Arc::new(fetcher),
        Arc::new(NotifierMux::new()),
        Arc::new(DisabledClient),
    );
    create_router(state)
}

async fn send_json(router: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 256 * 1024).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn send_get(router: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 256 * 1024).await.unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn health_is_ok() {
    let path = unique_tmp_path("health");
    let router = router_with(MockFetcher::returning("x"), &path);
    let (status, body) = send_get(router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let path = unique_tmp_path("404");
    let router = router_with(MockFetcher::returning("x"), &path);
    let (status, body) = send_get(router, "/no/such/route").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["status"], json!("error"));
}

#[tokio::test]
async fn classify_returns_verdict_and_report() {
    let path = unique_tmp_path("classify");
    let router = router_with(MockFetcher::returning("x"), &path);
    let (status, v) = send_json(
        router,
        "/classify",
        json!({"text": "ayuda ayuda amor entre voluntarios"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["signal"], json!("scored"));
    assert_eq!(v["dominant"], json!("Oxitocina"));
    assert_eq!(v["relevance"], json!(100));
    assert_eq!(v["category"], json!("Solidaridad"));
    assert!(v["report"].as_str().unwrap().contains("Oxitocina"));
}

#[tokio::test]
async fn classify_rejects_short_text_as_bad_request() {
    let path = unique_tmp_path("short");
    let router = router_with(MockFetcher::returning("x"), &path);
    let (status, v) = send_json(router, "/classify", json!({"text": "corto"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["status"], json!("error"));
    // No journal row for rejected input.
    assert!(!path.exists());
}

#[tokio::test]
async fn classify_no_signal_text() {
    let path = unique_tmp_path("nosignal");
    let router = router_with(MockFetcher::returning("x"), &path);
    let (status, v) = send_json(
        router,
        "/classify",
        json!({"text": "plain english text without any keyword"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["signal"], json!("no_signal"));
}

#[tokio::test]
async fn webhook_ignores_non_url_chatter() {
    let path = unique_tmp_path("ignore");
    let router = router_with(MockFetcher::returning("x"), &path);
    let (status, v) = send_json(
        router,
        "/",
        json!({"message": {"text": "hola, ¿qué tal el día?"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], json!("ignored"));
    assert!(!path.exists(), "ignored updates never touch the journal");
}

#[tokio::test]
async fn webhook_url_flow_classifies_and_journals() {
    let path = unique_tmp_path("urlflow");
    let router = router_with(
        MockFetcher::returning("ayuda ayuda amor entre los voluntarios del barrio"),
        &path,
    );
    let (status, v) = send_json(
        router,
        "/",
        json!({"channel_post": {"text": "https://example.com/noticia-solidaria"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], json!("ok"));
    assert_eq!(v["signal"], json!("scored"));
    assert_eq!(v["emotion"], json!("Oxitocina"));

    let rows = Journal::new(&path).read_rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].emotion, "Oxitocina");
    assert_eq!(rows[0].category.as_deref(), Some("Solidaridad"));

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn webhook_no_signal_content_is_not_journaled() {
    let path = unique_tmp_path("urlnosignal");
    let router = router_with(
        MockFetcher::returning("long unrelated english content here"),
        &path,
    );
    let (status, v) = send_json(
        router,
        "/",
        json!({"message": {"text": "https://example.com/unrelated"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["signal"], json!("none"));
    assert!(!path.exists());
}

#[tokio::test]
async fn webhook_fetch_failure_is_reported_not_fatal() {
    let path = unique_tmp_path("fetchfail");
    let router = router_with(MockFetcher::failing("offline"), &path);
    let (status, v) = send_json(
        router,
        "/",
        json!({"message": {"text": "https://example.com/down"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], json!("error"));
    assert!(!path.exists());
}

#[tokio::test]
async fn resumen_command_with_empty_journal() {
    let path = unique_tmp_path("resumen_empty");
    let router = router_with(MockFetcher::returning("x"), &path);
    let (status, v) = send_json(router, "/", json!({"message": {"text": "/resumen"}})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], json!("ok"));
    assert!(v["resumen"]
        .as_str()
        .unwrap()
        .contains("Aún no hay datos"));
}

#[tokio::test]
async fn resumen_command_counts_todays_rows() {
    let path = unique_tmp_path("resumen_rows");
    let journal = Journal::new(&path);
    journal.append_today("Dopamina", None).unwrap();
    journal.append_today("Dopamina", None).unwrap();
    journal.append_today("Oxitocina", None).unwrap();

    let router = router_with(MockFetcher::returning("x"), &path);
    let (status, v) = send_json(router, "/", json!({"message": {"text": "/resumen"}})).await;
    assert_eq!(status, StatusCode::OK);
    let resumen = v["resumen"].as_str().unwrap();
    assert!(resumen.contains("Total noticias: 3"));
    assert!(resumen.contains("- Dopamina: 2 (67%)"));

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn summary_endpoint_filters_by_date() {
    let path = unique_tmp_path("summary");
    let journal = Journal::new(&path);
    journal
        .append(
            chrono::NaiveDate::parse_from_str("2026-08-01", "%Y-%m-%d").unwrap(),
            "Dopamina",
            None,
        )
        .unwrap();
    journal
        .append(
            chrono::NaiveDate::parse_from_str("2026-08-02", "%Y-%m-%d").unwrap(),
            "Asombro",
            None,
        )
        .unwrap();

    let router = router_with(MockFetcher::returning("x"), &path);
    let (status, body) = send_get(router.clone(), "/summary?date=2026-08-02").await;
    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["status"], json!("top"));
    assert_eq!(v["total"], json!(1));
    assert_eq!(v["entries"][0]["category"], json!("Asombro"));

    // All-time without a date.
    let (status, body) = send_get(router.clone(), "/summary").await;
    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["total"], json!(2));

    // Invalid date is a 400.
    let (status, _) = send_get(router, "/summary?date=not-a-date").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let _ = std::fs::remove_file(&path);
}
