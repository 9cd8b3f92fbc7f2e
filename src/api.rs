//! HTTP surface: the inbound webhook plus direct core endpoints.
//!
//! `POST /` speaks the messaging-platform webhook shape (`message` /
//! `channel_post` with a `text` field): the `/resumen` command answers with
//! the daily summary, a URL goes through fetch → classify → journal →
//! notify, anything else is ignored. `POST /classify` exposes the core
//! directly for tooling and tests.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use once_cell::sync::OnceCell;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::analyze::{DynAiClient, EmotionEngine};
use crate::config::EngineConfig;
use crate::decision::Evaluation;
use crate::error::ClassifyError;
use crate::fetch::{ContentFetcher, HttpFetcher};
use crate::journal::Journal;
use crate::metrics::Metrics;
use crate::notify::{NotificationEvent, NotifierMux};
use crate::report::{render_report, render_summary};
use crate::summary::{summarize, Summary, SummaryFilter};

#[derive(Clone)]
pub struct AppState {
    engine: Arc<EmotionEngine>,
    journal: Arc<Journal>,
    fetcher: Arc<dyn ContentFetcher>,
    notifier: Arc<NotifierMux>,
    ai: DynAiClient,
}

impl AppState {
    pub fn new(
        engine: Arc<EmotionEngine>,
        journal: Arc<Journal>,
        fetcher: Arc<dyn ContentFetcher>,
        notifier: Arc<NotifierMux>,
        ai: DynAiClient,
    ) -> Self {
        Self {
            engine,
            journal,
            fetcher,
            notifier,
            ai,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/", post(webhook))
        .route("/classify", post(classify))
        .route("/summary", get(summary))
        .fallback(not_found)
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Build the full application router from configuration and environment.
/// Reused by the binary and by integration tests.
pub async fn app() -> anyhow::Result<Router> {
    let config = EngineConfig::load()?;
    let engine = Arc::new(EmotionEngine::from_config(config)?);

    let ai = crate::ai_bootstrap::build_ai_client("config/ai.json", engine.category_names());

    let state = AppState::new(
        engine.clone(),
        Arc::new(Journal::from_env()),
        Arc::new(HttpFetcher::new()),
        Arc::new(NotifierMux::from_env()),
        ai,
    );

    // The Prometheus recorder can only be installed once per process, so the
    // handle is cached across repeated `app()` calls (tests build several).
    static METRICS: OnceCell<Metrics> = OnceCell::new();
    let metrics = METRICS
        .get_or_init(|| Metrics::init(engine.config().approval.threshold));

    Ok(create_router(state).merge(metrics.router()))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"status": "error", "message": "Ruta no encontrada"})),
    )
}

/// Pull the text out of a webhook update: `message` or `channel_post`, either
/// a bare string or an object with a `text` field.
fn extract_webhook_text(payload: &Value) -> Option<String> {
    let node = payload.get("message").or_else(|| payload.get("channel_post"))?;
    let text = match node {
        Value::String(s) => s.as_str(),
        Value::Object(o) => o.get("text")?.as_str()?,
        _ => return None,
    };
    Some(text.trim().to_string())
}

fn looks_like_url(text: &str) -> bool {
    text.len() >= 10 && (text.starts_with("http://") || text.starts_with("https://"))
}

async fn webhook(State(state): State<AppState>, Json(payload): Json<Value>) -> Json<Value> {
    tracing::debug!(payload = %payload, "webhook update received");

    let Some(text) = extract_webhook_text(&payload) else {
        return Json(json!({"status": "ignored", "message": "Sin texto en el mensaje"}));
    };

    if text.eq_ignore_ascii_case("/resumen") {
        return summary_command(&state).await;
    }

    if !looks_like_url(&text) {
        return Json(json!({"status": "ignored", "message": "No hay URL válida"}));
    }

    let content = match state.fetcher.fetch_text(&text).await {
        Ok(content) => content,
        Err(e) => {
            metrics::counter!("fetch_errors_total").increment(1);
            tracing::error!(error = %e, url = %text, "content fetch failed");
            return Json(json!({"status": "error", "message": "No se pudo extraer texto"}));
        }
    };

    let opinion = state.ai.suggest(&content).await;
    let evaluation = match state.engine.classify_with_opinion(&content, opinion.as_ref()) {
        Ok(evaluation) => evaluation,
        Err(e) => {
            tracing::warn!(error = %e, "fetched content rejected");
            return Json(json!({"status": "error", "message": e.to_string()}));
        }
    };

    match &evaluation {
        Evaluation::Scored(v) => {
            // Journal failures are collaborator failures: logged, and the
            // classification result still stands.
            if let Err(e) = state
                .journal
                .append_today(&v.dominant, v.category.as_deref())
            {
                tracing::error!(error = %e, "journal append failed");
            }

            let report = render_report(
                &evaluation,
                &content,
                Some(text.as_str()),
                state.engine.config().report.excerpt_max_chars,
            );
            state.notifier.dispatch(&NotificationEvent::now(report)).await;

            Json(json!({
                "status": "ok",
                "signal": "scored",
                "emotion": v.dominant,
                "approved": v.approved,
            }))
        }
        Evaluation::NoSignal => Json(json!({"status": "ok", "signal": "none"})),
    }
}

async fn summary_command(state: &AppState) -> Json<Value> {
    let rows = match state.journal.read_rows() {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "journal read failed");
            return Json(json!({"status": "error", "message": "Registro no disponible"}));
        }
    };

    let today = Utc::now().date_naive();
    let summary = summarize(
        &rows,
        SummaryFilter::OnDate(today),
        state.engine.config().summary.top_n,
    );
    let message = render_summary(&summary);
    state
        .notifier
        .dispatch(&NotificationEvent::now(message.clone()))
        .await;

    Json(json!({"status": "ok", "resumen": message}))
}

#[derive(serde::Deserialize)]
struct ClassifyReq {
    text: String,
    #[serde(default)]
    source_url: Option<String>,
}

#[derive(serde::Serialize)]
struct ClassifyResp {
    #[serde(flatten)]
    evaluation: Evaluation,
    report: String,
}

async fn classify(
    State(state): State<AppState>,
    Json(body): Json<ClassifyReq>,
) -> Result<Json<ClassifyResp>, (StatusCode, Json<Value>)> {
    let opinion = state.ai.suggest(&body.text).await;
    let evaluation = state
        .engine
        .classify_with_opinion(&body.text, opinion.as_ref())
        .map_err(|e| match e {
            ClassifyError::Input(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({"status": "error", "message": msg})),
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": other.to_string()})),
            ),
        })?;

    let report = render_report(
        &evaluation,
        &body.text,
        body.source_url.as_deref(),
        state.engine.config().report.excerpt_max_chars,
    );
    Ok(Json(ClassifyResp { evaluation, report }))
}

async fn summary(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Summary>, (StatusCode, Json<Value>)> {
    let filter = match params.get("date") {
        None => SummaryFilter::AllTime,
        Some(raw) => {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"status": "error", "message": "Fecha inválida, use YYYY-MM-DD"})),
                )
            })?;
            SummaryFilter::OnDate(date)
        }
    };

    let rows = state.journal.read_rows().map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"status": "error", "message": e.to_string()})),
        )
    })?;

    Ok(Json(summarize(
        &rows,
        filter,
        state.engine.config().summary.top_n,
    )))
}
