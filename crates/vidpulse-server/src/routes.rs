//! HTTP routes and handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use crate::sentiment::SentimentBackend;
use crate::state::AppState;
use vidpulse_classifiers::{quality_score, CommitClassifier, CommitTypeResult};
use vidpulse_core::{BatchSummary, Error, SentimentScore};
use vidpulse_youtube::extract_video_id;

pub fn create_router(state: AppState) -> Router {
    // Allow-all CORS, matching the mixed-origin deployments this backend serves
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/metrics", get(metrics))
        .route("/api/health", get(health))
        .route("/api/youtube", get(youtube_video))
        .route("/api/youtube/channel", post(youtube_channel))
        .route("/api/analyze/comments/batch", post(analyze_comments_batch))
        .route("/api/analyze/sentiment", post(analyze_sentiment))
        .route("/api/analyze/commit", post(analyze_commit))
        .route("/api/analyze/commits/batch", post(analyze_commits_batch))
        .route("/api/analyze/video", post(analyze_video))
        .fallback(fallback)
        .layer(cors)
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    Json(json!({ "message": "VidPulse backend is running" }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "artifacts": state.bundle.status(),
    }))
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

async fn fallback() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "not found" })))
}

// ============================================================================
// Video metadata endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
struct VideoQuery {
    /// YouTube video URL
    url: String,
}

async fn youtube_video(
    State(state): State<AppState>,
    Query(query): Query<VideoQuery>,
) -> Result<Response, AppError> {
    metrics::counter!("vidpulse_requests_total", "route" => "youtube_video").increment(1);

    let client = state.youtube.as_ref().ok_or_else(youtube_unconfigured)?;
    let metadata = client
        .video_metadata(&query.url)
        .await
        .map_err(AppError::video)?;

    debug!(url = %query.url, "fetched video metadata");
    Ok(Json(metadata).into_response())
}

#[derive(Debug, Deserialize)]
struct ChannelRequest {
    channel_url: String,
    max_videos: Option<usize>,
}

async fn youtube_channel(
    State(state): State<AppState>,
    Json(req): Json<ChannelRequest>,
) -> Result<Response, AppError> {
    metrics::counter!("vidpulse_requests_total", "route" => "youtube_channel").increment(1);

    let client = state.youtube.as_ref().ok_or_else(youtube_unconfigured)?;
    let max_videos = req.max_videos.unwrap_or(50);

    let videos = client
        .channel_videos(&req.channel_url, max_videos)
        .await
        .map_err(AppError::video)?;

    let count = videos.len();
    info!(channel = %req.channel_url, count, "fetched channel videos");
    Ok(Json(json!({
        "success": true,
        "videos": videos,
        "count": count,
    }))
    .into_response())
}

fn youtube_unconfigured() -> AppError {
    AppError::BadRequest(
        "YouTube API key not configured. Get one from https://console.cloud.google.com/ \
         and enable YouTube Data API v3"
            .to_string(),
    )
}

// ============================================================================
// Comment analysis endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
struct BatchCommentsRequest {
    comments: Vec<String>,
}

async fn analyze_comments_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchCommentsRequest>,
) -> Result<Json<BatchSummary>, AppError> {
    metrics::counter!("vidpulse_requests_total", "route" => "comments_batch").increment(1);

    // Caller-side guard: an empty batch never reaches the pipeline
    if req.comments.is_empty() {
        return Ok(Json(BatchSummary::empty()));
    }

    let start = Instant::now();
    let summary = state.bundle.predict(&req.comments).map_err(AppError::pipeline)?;

    metrics::histogram!("vidpulse_pipeline_latency_us")
        .record(start.elapsed().as_micros() as f64);
    metrics::counter!("vidpulse_predictions_total").increment(summary.count as u64);

    Ok(Json(summary))
}

// ============================================================================
// Sentiment and commit analysis endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
struct TextRequest {
    text: String,
}

async fn analyze_sentiment(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<SentimentScore>, AppError> {
    metrics::counter!("vidpulse_requests_total", "route" => "sentiment").increment(1);

    let backend = state.sentiment.as_ref().ok_or_else(inference_unconfigured)?;
    let score = backend.analyze(&req.text).await.map_err(|e| {
        metrics::counter!("vidpulse_upstream_errors_total", "upstream" => "inference").increment(1);
        AppError::Internal(format!("sentiment analysis failed: {e}"))
    })?;

    Ok(Json(score))
}

#[derive(Debug, Deserialize)]
struct CommitAnalysisRequest {
    message: String,
}

/// Combined verdict for one commit message
#[derive(Debug, Serialize)]
struct CommitAnalysis {
    message: String,
    sentiment: SentimentScore,
    #[serde(rename = "type")]
    commit_type: CommitTypeResult,
    quality_score: f64,
}

async fn analyze_commit(
    State(state): State<AppState>,
    Json(req): Json<CommitAnalysisRequest>,
) -> Result<Json<CommitAnalysis>, AppError> {
    metrics::counter!("vidpulse_requests_total", "route" => "commit").increment(1);

    let backend = state.sentiment.as_ref().ok_or_else(inference_unconfigured)?;
    let analysis = analyze_commit_message(backend.as_ref(), &state.commit_classifier, &req.message)
        .await
        .map_err(|e| AppError::Internal(format!("commit analysis failed: {e}")))?;

    Ok(Json(analysis))
}

#[derive(Debug, Deserialize)]
struct BatchCommitsRequest {
    commits: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CommitStatistics {
    sentiment_distribution: BTreeMap<String, usize>,
    type_distribution: BTreeMap<String, usize>,
    average_quality_score: f64,
    total_commits: usize,
}

async fn analyze_commits_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchCommitsRequest>,
) -> Result<Response, AppError> {
    metrics::counter!("vidpulse_requests_total", "route" => "commits_batch").increment(1);

    if req.commits.is_empty() {
        return Ok(Json(json!({ "count": 0, "results": [] })).into_response());
    }

    let backend = state.sentiment.as_ref().ok_or_else(inference_unconfigured)?;

    let analyses = join_all(req.commits.iter().map(|message| {
        analyze_commit_message(backend.as_ref(), &state.commit_classifier, message)
    }))
    .await;

    let results: Vec<CommitAnalysis> = analyses
        .into_iter()
        .collect::<vidpulse_core::Result<_>>()
        .map_err(|e| AppError::Internal(format!("batch analysis failed: {e}")))?;

    let mut sentiment_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut type_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut quality_sum = 0.0;
    for analysis in &results {
        *sentiment_distribution
            .entry(analysis.sentiment.label.clone())
            .or_insert(0) += 1;
        *type_distribution
            .entry(analysis.commit_type.commit_type.clone())
            .or_insert(0) += 1;
        quality_sum += analysis.quality_score;
    }

    let statistics = CommitStatistics {
        sentiment_distribution,
        type_distribution,
        average_quality_score: quality_sum / results.len() as f64,
        total_commits: results.len(),
    };

    Ok(Json(json!({
        "count": results.len(),
        "results": results,
        "statistics": statistics,
    }))
    .into_response())
}

async fn analyze_commit_message(
    backend: &dyn SentimentBackend,
    classifier: &CommitClassifier,
    message: &str,
) -> vidpulse_core::Result<CommitAnalysis> {
    let sentiment = backend.analyze(message).await?;
    let commit_type = classifier.classify(message);
    let quality = quality_score(message, &sentiment.label, commit_type.confidence);

    Ok(CommitAnalysis {
        message: message.to_string(),
        sentiment,
        commit_type,
        quality_score: quality,
    })
}

fn inference_unconfigured() -> AppError {
    AppError::Internal("sentiment inference is not configured on this server".to_string())
}

// ============================================================================
// Combined video analysis endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
struct AnalyzeVideoRequest {
    video_url: String,
    #[serde(default)]
    analyze_comments: bool,
    max_comments: Option<usize>,
}

async fn analyze_video(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeVideoRequest>,
) -> Result<Response, AppError> {
    metrics::counter!("vidpulse_requests_total", "route" => "analyze_video").increment(1);

    let client = state.youtube.as_ref().ok_or_else(youtube_unconfigured)?;
    let metadata = client
        .video_metadata(&req.video_url)
        .await
        .map_err(AppError::video)?;

    let mut result = serde_json::to_value(&metadata)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    result["analysis"] = json!({ "sentiment": "neutral", "keywords": [] });

    if req.analyze_comments {
        let max_comments = req.max_comments.unwrap_or(100);
        let video_id = extract_video_id(&req.video_url)
            .ok_or_else(|| AppError::BadRequest("could not extract a video id".to_string()))?;

        let comments = match client.video_comments(&video_id, max_comments).await {
            Ok(comments) => comments,
            Err(e) => {
                warn!(video = %video_id, "comment fetch failed: {e}");
                Vec::new()
            }
        };

        if comments.is_empty() {
            result["comments_analysis"] = json!({
                "analyzed": 0,
                "summary": "Could not fetch comments for this video. You can POST comments \
                            to /api/analyze/comments/batch for model analysis.",
            });
            return Ok(Json(result).into_response());
        }

        match state.bundle.predict(&comments) {
            Ok(summary) => {
                let sample: Vec<_> = summary.results.iter().take(20).cloned().collect();
                result["comments_analysis"] = json!({
                    "analyzed": summary.count,
                    "summary": "Comments analyzed using server ML model",
                    "distribution": summary.distribution,
                    "average_confidence": summary.average_confidence,
                    "sample_results": sample,
                    "model_used": summary.model,
                });
            }
            Err(Error::Unavailable(reason)) => {
                result["comments_analysis"] = json!({
                    "analyzed": 0,
                    "summary": format!(
                        "Model not available on server: {reason}. You can POST comments to \
                         /api/analyze/comments/batch to analyze them once models are loaded."
                    ),
                });
            }
            Err(e) => return Err(AppError::pipeline(e)),
        }
    }

    Ok(Json(result).into_response())
}

// ============================================================================
// Error handling
// ============================================================================

/// Error handling
#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Unavailable(String),
    Internal(String),
}

impl AppError {
    /// Mapping for the video routes: upstream and URL-shape failures are the
    /// caller's 400, anything else is ours
    fn video(err: Error) -> Self {
        match err {
            Error::Upstream(msg) | Error::Config(msg) => Self::BadRequest(msg),
            other => Self::Internal(other.to_string()),
        }
    }

    /// Mapping for the prediction pipeline: missing artifacts are
    /// distinguishable from generic prediction failures
    fn pipeline(err: Error) -> Self {
        match err {
            Error::Unavailable(_) => Self::Unavailable(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::Arc;
    use tower::ServiceExt;
    use vidpulse_classifiers::{
        LabelDecoder, ModelArtifact, ModelBundle, MultinomialNb, TfidfVectorizer,
    };
    use vidpulse_core::Result;

    struct StubSentiment;

    #[async_trait::async_trait]
    impl SentimentBackend for StubSentiment {
        async fn analyze(&self, text: &str) -> Result<SentimentScore> {
            let label = if text.contains("broke") {
                "NEGATIVE"
            } else {
                "POSITIVE"
            };
            Ok(SentimentScore {
                label: label.to_string(),
                score: 0.9,
                all_scores: None,
            })
        }
    }

    fn fitted_bundle() -> ModelBundle {
        let corpus = vec![
            "this broke everything, terrible update",
            "awful release, everything broke again",
            "meh, nothing interesting here",
            "meh, nothing changed really",
            "great work, love this feature",
            "great release, love the new player",
        ];
        let labels = vec![0usize, 0, 1, 1, 2, 2];

        let vectorizer = TfidfVectorizer::fit(&corpus);
        let features = vectorizer.transform_batch(&corpus);
        let model = MultinomialNb::fit(&features, &labels, 3, 1.0).unwrap();
        let decoder = LabelDecoder::new(vec![
            "negative".to_string(),
            "neutral".to_string(),
            "positive".to_string(),
        ]);

        ModelBundle::new(
            Some(vectorizer),
            Some(ModelArtifact::MultinomialNb(model).into_model()),
            Some(decoder),
        )
    }

    fn test_state(bundle: ModelBundle) -> AppState {
        AppState {
            config: Arc::new(ServerConfig::default()),
            bundle: Arc::new(bundle),
            commit_classifier: Arc::new(CommitClassifier::new().unwrap()),
            sentiment: Some(Arc::new(StubSentiment)),
            youtube: None,
            metrics_handle: PrometheusBuilder::new().build_recorder().handle(),
        }
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_artifact_status() {
        let router = create_router(test_state(fitted_bundle()));

        let response = router
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["artifacts"]["vectorizer"], true);
        assert_eq!(body["artifacts"]["classifier"], true);
        assert_eq!(body["artifacts"]["label_decoder"], true);
    }

    #[tokio::test]
    async fn empty_comment_batch_short_circuits() {
        // Even with nothing loaded, an empty batch succeeds without touching
        // the pipeline
        let router = create_router(test_state(ModelBundle::unloaded()));

        let response = router
            .oneshot(post_json(
                "/api/analyze/comments/batch",
                json!({ "comments": [] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["count"], 0);
        assert_eq!(body["results"], json!([]));
    }

    #[tokio::test]
    async fn comment_batch_returns_summary_in_order() {
        let router = create_router(test_state(fitted_bundle()));

        let response = router
            .oneshot(post_json(
                "/api/analyze/comments/batch",
                json!({ "comments": ["great work!", "this broke everything", "meh"] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["count"], 3);
        assert_eq!(body["results"][0]["comment"], "great work!");
        assert_eq!(body["results"][0]["sentiment"], "positive");
        assert_eq!(body["results"][1]["sentiment"], "negative");
        assert_eq!(body["results"][2]["sentiment"], "neutral");
        assert_eq!(body["model"], "MultinomialNb");

        let counts = body["distribution"]["counts"].as_object().unwrap();
        let total: u64 = counts.values().map(|v| v.as_u64().unwrap()).sum();
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn unloaded_models_yield_service_unavailable() {
        let router = create_router(test_state(ModelBundle::unloaded()));

        let response = router
            .oneshot(post_json(
                "/api/analyze/comments/batch",
                json!({ "comments": ["anything"] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert!(body["detail"].as_str().unwrap().contains("models not loaded"));
    }

    #[tokio::test]
    async fn sentiment_endpoint_uses_backend() {
        let router = create_router(test_state(fitted_bundle()));

        let response = router
            .oneshot(post_json(
                "/api/analyze/sentiment",
                json!({ "text": "ship it" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["label"], "POSITIVE");
    }

    #[tokio::test]
    async fn commit_endpoint_combines_sentiment_type_and_quality() {
        let router = create_router(test_state(fitted_bundle()));

        let response = router
            .oneshot(post_json(
                "/api/analyze/commit",
                json!({ "message": "fix the login bug and add a regression test" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["sentiment"]["label"], "POSITIVE");
        assert_eq!(body["type"]["type"], "bugfix");
        let quality = body["quality_score"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&quality));
    }

    #[tokio::test]
    async fn commit_batch_reports_statistics() {
        let router = create_router(test_state(fitted_bundle()));

        let response = router
            .oneshot(post_json(
                "/api/analyze/commits/batch",
                json!({ "commits": [
                    "fix the login bug",
                    "add new export feature",
                    "everything broke, fix the build",
                ] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["count"], 3);
        assert_eq!(body["statistics"]["total_commits"], 3);
        assert_eq!(body["statistics"]["type_distribution"]["bugfix"], 2);
        assert_eq!(body["statistics"]["type_distribution"]["feature"], 1);
        assert_eq!(body["statistics"]["sentiment_distribution"]["NEGATIVE"], 1);

        let average = body["statistics"]["average_quality_score"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&average));
    }

    #[tokio::test]
    async fn empty_commit_batch_short_circuits() {
        let router = create_router(test_state(fitted_bundle()));

        let response = router
            .oneshot(post_json("/api/analyze/commits/batch", json!({ "commits": [] })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn video_routes_require_api_key() {
        let router = create_router(test_state(fitted_bundle()));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/youtube?url=https://youtu.be/abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["detail"].as_str().unwrap().contains("API key"));
    }

    #[tokio::test]
    async fn unknown_routes_return_not_found() {
        let router = create_router(test_state(fitted_bundle()));

        let response = router
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
