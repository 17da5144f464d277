//! Route tests against an in-process router

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use candle_core::Device;
use guardian_classifiers::{ModelInput, ToxicityModel, ToxicityScorer, Vectorizer, WordIndexVectorizer};
use guardian_core::{Comment, Error, Result, VideoInfo};
use guardian_server::{create_router, AppState, Settings};
use guardian_youtube::{CommentPage, CommentSource, PageRequest};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Scores each row as its largest token id / 10 on every label
struct KeywordModel {
    call_count: Arc<AtomicU32>,
    device: Device,
}

impl ToxicityModel for KeywordModel {
    fn predict(&self, input: &ModelInput) -> Result<Vec<Vec<f32>>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let rows = input
            .input_ids
            .to_vec2::<u32>()
            .map_err(|e| Error::classifier(e.to_string()))?;
        Ok(rows
            .iter()
            .map(|row| {
                let max = row.iter().copied().max().unwrap_or(0);
                vec![max as f32 / 10.0; 6]
            })
            .collect())
    }

    fn num_outputs(&self) -> usize {
        6
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

struct MockCommentSource {
    comments: Vec<Comment>,
    error: Option<String>,
    requests: Mutex<Vec<PageRequest>>,
}

impl MockCommentSource {
    fn with_comments(texts: &[&str]) -> Self {
        Self {
            comments: texts.iter().map(|t| Comment::new(*t)).collect(),
            error: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            comments: Vec::new(),
            error: Some(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CommentSource for MockCommentSource {
    async fn list_comment_page(&self, request: PageRequest) -> Result<CommentPage> {
        let max_results = request.max_results;
        self.requests.lock().unwrap().push(request);
        if let Some(message) = &self.error {
            return Err(Error::upstream(message.clone()));
        }
        Ok(CommentPage {
            comments: self.comments.iter().take(max_results).cloned().collect(),
            next_page_token: None,
        })
    }

    async fn video_info(&self, video_id: &str) -> Result<VideoInfo> {
        Ok(VideoInfo {
            video_id: video_id.to_string(),
            ..Default::default()
        })
    }
}

struct TestApp {
    router: Router,
    model_calls: Arc<AtomicU32>,
}

fn test_app(source: Option<Arc<MockCommentSource>>) -> TestApp {
    let vocab: HashMap<String, u32> = [("hello", 1), ("friend", 2), ("idiot", 9)]
        .into_iter()
        .map(|(w, i)| (w.to_string(), i))
        .collect();
    let vectorizer = Vectorizer::WordIndex(WordIndexVectorizer::new(vocab, 8).unwrap());

    let model_calls = Arc::new(AtomicU32::new(0));
    let model = KeywordModel {
        call_count: Arc::clone(&model_calls),
        device: Device::Cpu,
    };
    let scorer = ToxicityScorer::new(vectorizer, Arc::new(model));

    let settings = Settings {
        max_comments: 20,
        ..Settings::default()
    };
    let comments = source.map(|s| s as Arc<dyn CommentSource>);
    let state = AppState::from_parts(scorer, comments, settings);

    TestApp {
        router: create_router(state).unwrap(),
        model_calls,
    }
}

async fn post_json(router: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let app = test_app(None);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "ok", "model_loaded": true, "max_sequence_length": 200 })
    );
}

#[tokio::test]
async fn test_score_single_text() {
    let app = test_app(None);
    let (status, body) = post_json(app.router, "/api/score", r#"{"texts": ["hello"]}"#).await;

    assert_eq!(status, StatusCode::OK);
    let scores = body["scores"].as_array().unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].as_object().unwrap().len(), 6);

    let toxic = scores[0]["toxic"].as_f64().unwrap();
    let mean = body["aggregate"]["mean_toxicity"].as_f64().unwrap();
    assert!((mean - toxic).abs() < 1e-6);
}

#[tokio::test]
async fn test_score_preserves_order() {
    let app = test_app(None);
    let (status, body) = post_json(
        app.router,
        "/api/score",
        r#"{"texts": ["you idiot", "hello friend", ""]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let scores = body["scores"].as_array().unwrap();
    assert_eq!(scores.len(), 3);
    assert!((scores[0]["toxic"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    assert!((scores[1]["toxic"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    assert_eq!(scores[2]["toxic"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn test_score_rejects_bad_texts() {
    for body in [
        r#"{"texts": "hello"}"#,
        r#"{"texts": ["ok", 3]}"#,
        r#"{"other": []}"#,
        "not json",
    ] {
        let app = test_app(None);
        let (status, response) = post_json(app.router, "/api/score", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(response, json!({ "error": "texts must be a list of strings" }));
        assert_eq!(app.model_calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_score_empty_list() {
    let app = test_app(None);
    let (status, body) = post_json(app.router, "/api/score", r#"{"texts": []}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "scores": [], "aggregate": { "mean_toxicity": 0.0 } }));
}

#[tokio::test]
async fn test_youtube_without_key() {
    let app = test_app(None);
    let (status, body) = post_json(
        app.router,
        "/api/youtube/score",
        r#"{"url": "https://youtu.be/dQw4w9WgXcQ"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Missing YOUTUBE_API_KEY" }));
}

#[tokio::test]
async fn test_youtube_requires_url() {
    for body in [r#"{}"#, r#"{"url": ""}"#, r#"{"url": 5}"#, ""] {
        let source = Arc::new(MockCommentSource::with_comments(&["hello"]));
        let app = test_app(Some(source));
        let (status, response) = post_json(app.router, "/api/youtube/score", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(response, json!({ "error": "url is required" }));
    }
}

#[tokio::test]
async fn test_youtube_invalid_url() {
    let source = Arc::new(MockCommentSource::with_comments(&["hello"]));
    let app = test_app(Some(source.clone()));
    let (status, body) = post_json(
        app.router,
        "/api/youtube/score",
        r#"{"url": "https://example.com/"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid YouTube URL" }));
    assert!(source.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_youtube_scores_comments() {
    let source = Arc::new(MockCommentSource::with_comments(&["idiot", "hello", "friend"]));
    let app = test_app(Some(source.clone()));
    let (status, body) = post_json(
        app.router,
        "/api/youtube/score",
        r#"{"url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ", "max_comments": "2"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let scores = body["scores"].as_array().unwrap();
    assert_eq!(scores.len(), 2);
    assert!((body["aggregate"]["mean_toxicity"].as_f64().unwrap() - 0.5).abs() < 1e-6);

    let requests = source.requests.lock().unwrap();
    assert_eq!(requests[0].video_id, "dQw4w9WgXcQ");
    assert_eq!(requests[0].max_results, 2);
}

#[tokio::test]
async fn test_youtube_accepts_whole_float_limit() {
    let source = Arc::new(MockCommentSource::with_comments(&["idiot", "hello", "friend"]));
    let app = test_app(Some(source.clone()));
    let (status, body) = post_json(
        app.router,
        "/api/youtube/score",
        r#"{"url": "https://youtu.be/dQw4w9WgXcQ", "max_comments": 2.0}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scores"].as_array().unwrap().len(), 2);
    assert_eq!(source.requests.lock().unwrap()[0].max_results, 2);
}

#[tokio::test]
async fn test_youtube_uses_configured_limit() {
    let source = Arc::new(MockCommentSource::with_comments(&["hello"]));
    let app = test_app(Some(source.clone()));
    let (status, _) = post_json(
        app.router,
        "/api/youtube/score",
        r#"{"url": "https://youtu.be/dQw4w9WgXcQ"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(source.requests.lock().unwrap()[0].max_results, 20);
}

#[tokio::test]
async fn test_youtube_no_comments() {
    let source = Arc::new(MockCommentSource::with_comments(&[]));
    let app = test_app(Some(source));
    let (status, body) = post_json(
        app.router,
        "/api/youtube/score",
        r#"{"url": "https://youtu.be/dQw4w9WgXcQ"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "scores": [], "aggregate": { "mean_toxicity": 0.0 } }));
    assert_eq!(app.model_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_youtube_invalid_max_comments() {
    let source = Arc::new(MockCommentSource::with_comments(&["hello"]));
    let app = test_app(Some(source));
    let (status, body) = post_json(
        app.router,
        "/api/youtube/score",
        r#"{"url": "https://youtu.be/dQw4w9WgXcQ", "max_comments": "lots"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "max_comments must be a non-negative integer" })
    );
}

#[tokio::test]
async fn test_youtube_fetch_failure_is_bad_request() {
    let source = Arc::new(MockCommentSource::failing(
        "YouTube API error 403: The video has disabled comments.",
    ));
    let app = test_app(Some(source));
    let (status, body) = post_json(
        app.router,
        "/api/youtube/score",
        r#"{"url": "https://youtu.be/dQw4w9WgXcQ"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("disabled comments"));
}

#[tokio::test]
async fn test_unknown_route() {
    let app = test_app(None);
    let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
    let (status, body) = send(app.router, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "not found" }));
}

#[tokio::test]
async fn test_cors_allows_frontend_origin() {
    let app = test_app(None);
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/score")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
}
