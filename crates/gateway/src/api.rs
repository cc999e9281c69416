//! HTTP/JSON surface using Axum.

use crate::batch::BatchRunner;
use crate::error::{GatewayError, Result};
use crate::protocol::{
    BatchRequest, BatchResponse, HealthResponse, HistoryQuery, HistoryResponse, LanguagesResponse,
    MetricsResponse, SendAudioRequest, SendAudioResponse, SendTextRequest, SendTextResponse,
    SetLanguageRequest, SetLanguageResponse,
};
use crate::service::GatewayService;
use crate::sizing;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Room for the JSON fields around a maximum-size base64 audio blob.
const BODY_LIMIT_SLACK_BYTES: usize = 64 * 1024;

/// Shared application state.
pub struct AppState {
    pub service: Arc<GatewayService>,
    pub batch: BatchRunner,
}

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit =
        sizing::base64_len(state.service.limits().max_audio_bytes) + BODY_LIMIT_SLACK_BYTES;

    Router::new()
        .route("/api/preferences/language", post(set_language))
        .route("/api/messages/text", post(send_text))
        .route("/api/messages/audio", post(send_audio))
        .route("/api/history", get(history))
        .route("/api/metrics", get(metrics))
        .route("/api/languages", get(languages))
        .route("/api/test/concurrent", post(run_batch))
        .route("/health", get(health))
        .fallback(no_route)
        .method_not_allowed_fallback(wrong_method)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Answer a panicking handler with a regular error body.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Request handler panicked: {}", detail);
    GatewayError::WorkerUnavailable(format!("request handler panicked: {}", detail))
        .into_response()
}

async fn no_route(method: Method, uri: Uri) -> Response {
    let err = GatewayError::Validation(format!("no route for {} {}", method, uri.path()));
    (StatusCode::NOT_FOUND, err).into_response()
}

async fn wrong_method(method: Method, uri: Uri) -> Response {
    let err = GatewayError::Validation(format!("{} is not allowed on {}", method, uri.path()));
    (StatusCode::METHOD_NOT_ALLOWED, err).into_response()
}

async fn set_language(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SetLanguageRequest>, JsonRejection>,
) -> Result<Json<SetLanguageResponse>> {
    let Json(req) = payload?;
    Ok(Json(state.service.set_language(req)?))
}

async fn send_text(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SendTextRequest>, JsonRejection>,
) -> Result<Json<SendTextResponse>> {
    let Json(req) = payload?;
    Ok(Json(state.service.send_text(req).await?))
}

async fn send_audio(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SendAudioRequest>, JsonRejection>,
) -> Result<Json<SendAudioResponse>> {
    let Json(req) = payload?;
    Ok(Json(state.service.send_audio(req).await?))
}

async fn history(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponse>> {
    let Query(query) = query?;
    Ok(Json(
        state
            .service
            .history(query.user_id.as_deref(), query.limit)?,
    ))
}

async fn metrics(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    Json(state.service.metrics())
}

async fn languages(State(state): State<Arc<AppState>>) -> Result<Json<LanguagesResponse>> {
    Ok(Json(state.service.languages().await?))
}

async fn run_batch(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>> {
    let Json(req) = payload?;
    Ok(Json(state.batch.run(req.count).await?))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(state.service.health().await)
}
