//! HTTP routes and handlers

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use guardian_core::{Aggregate, Error, LabelScores, Result};
use guardian_youtube::{extract_video_id, fetch_comments, CommentOrder};
use serde::Serialize;
use serde_json::{json, Value};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

const TEXTS_ERROR: &str = "texts must be a list of strings";
const URL_ERROR: &str = "url is required";
const MAX_COMMENTS_ERROR: &str = "max_comments must be a non-negative integer";
const MISSING_KEY_ERROR: &str = "Missing YOUTUBE_API_KEY";

/// Scores for a batch plus their aggregate
#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub scores: Vec<LabelScores>,
    pub aggregate: Aggregate,
}

impl ScoreResponse {
    fn empty() -> Self {
        Self {
            scores: Vec::new(),
            aggregate: Aggregate::empty(),
        }
    }
}

/// Build the router with CORS restricted to the configured frontend origin
pub fn create_router(state: AppState) -> Result<Router> {
    let origin = HeaderValue::from_str(&state.settings.frontend_origin).map_err(|_| {
        Error::config(format!(
            "Invalid FRONTEND_ORIGIN: {}",
            state.settings.frontend_origin
        ))
    })?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        .route("/score", post(score_texts))
        .route("/youtube/score", post(score_youtube))
        .layer(cors);

    Ok(Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Bind and serve until `shutdown` resolves
pub async fn serve<F>(state: AppState, addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Guardian API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model_loaded": true,
        "max_sequence_length": state.settings.max_sequence_length,
    }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("not found".to_string())
}

/// `POST /api/score {"texts": [...]}`
async fn score_texts(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<ScoreResponse>, ApiError> {
    let texts = parse_texts(&body).ok_or_else(|| ApiError::bad_request(TEXTS_ERROR))?;
    info!(batch = texts.len(), "Scoring texts");

    Ok(Json(run_scoring(&state, texts).await?))
}

/// `POST /api/youtube/score {"url": ..., "max_comments"?: n}`
async fn score_youtube(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<ScoreResponse>, ApiError> {
    let Some(source) = state.comments.clone() else {
        return Err(ApiError::Internal(MISSING_KEY_ERROR.to_string()));
    };

    let payload = parse_object(&body);

    let url = payload
        .get("url")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::bad_request(URL_ERROR))?;

    let max_comments = parse_max_comments(payload.get("max_comments"))
        .ok_or_else(|| ApiError::bad_request(MAX_COMMENTS_ERROR))?
        .unwrap_or(state.settings.max_comments);

    let video_id = extract_video_id(url)?;
    info!(%video_id, max_comments, "Fetching YouTube comments");

    let comments = fetch_comments(
        source.as_ref(),
        &video_id,
        max_comments,
        CommentOrder::Relevance,
    )
    .await
    .map_err(|e| {
        warn!(%video_id, "Comment fetch failed: {}", e);
        e
    })?;

    if comments.is_empty() {
        info!(%video_id, "No comments to score");
        return Ok(Json(ScoreResponse::empty()));
    }

    let texts = comments.into_iter().map(|c| c.text).collect();
    Ok(Json(run_scoring(&state, texts).await?))
}

/// Run inference on the blocking pool
async fn run_scoring(
    state: &AppState,
    texts: Vec<String>,
) -> std::result::Result<ScoreResponse, ApiError> {
    let scorer = state.scorer.clone();
    let scores = tokio::task::spawn_blocking(move || scorer.score(&texts)).await??;

    Ok(ScoreResponse {
        aggregate: Aggregate::from_scores(&scores),
        scores,
    })
}

/// `texts` as a list of strings; `None` for anything else
fn parse_texts(body: &[u8]) -> Option<Vec<String>> {
    let payload: Value = serde_json::from_slice(body).ok()?;
    payload
        .get("texts")?
        .as_array()?
        .iter()
        .map(|text| text.as_str().map(str::to_string))
        .collect()
}

/// Request body as a JSON object; missing or malformed bodies read as empty
fn parse_object(body: &[u8]) -> serde_json::Map<String, Value> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    }
}

/// `Some(None)` when absent, `Some(Some(n))` for a non-negative integer given
/// as a number or numeric string, `None` when invalid
fn parse_max_comments(value: Option<&Value>) -> Option<Option<usize>> {
    match value {
        None | Some(Value::Null) => Some(None),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(n) => usize::try_from(n).ok().map(Some),
            // Whole floats such as 2.0 count as integers
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| Some(f as usize)),
        },
        Some(Value::String(s)) => s.trim().parse::<usize>().ok().map(Some),
        Some(_) => None,
    }
}
