//! Browser chat surface.
//!
//! Serves a single-page chat UI and a small JSON API over the same
//! [`ChatSession`] the terminal uses: chat, history, clear, report
//! analysis, and the packaging sustainability score. One session is shared
//! behind a mutex, so requests serialize and the history buffer stays
//! consistent.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::backend::CompletionBackend;
use crate::chat::{ChatSession, PackagingSpec};
use crate::types::ChatMessage;

/// The chat session shared across request handlers.
pub type SharedSession<B> = Arc<Mutex<ChatSession<B>>>;

/// Body of a `POST /api/chat` request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
}

/// Body of a successful `POST /api/chat` response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The assistant's reply.
    pub reply: String,
}

/// Body of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Body of a `GET /api/history` response.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// The conversation so far, oldest first.
    pub messages: Vec<ChatMessage>,
}

/// Body of a `POST /api/report` request.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    /// The extracted report text to summarize and benchmark.
    pub text: String,
}

/// Body of a `POST /api/score` request.
#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    /// Material name.
    pub material: String,
    /// Weight in grams.
    pub weight_grams: f64,
    /// Whether the packaging is recyclable.
    pub recyclable: bool,
    /// Whether it is made from renewable resources.
    pub renewable: bool,
}

/// Body of a successful report or score response.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    /// The model's analysis text.
    pub analysis: String,
}

/// Builds the router for the web chat surface.
pub fn router<B: CompletionBackend + 'static>(session: SharedSession<B>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/chat", post(chat::<B>))
        .route("/api/history", get(history::<B>))
        .route("/api/clear", post(clear::<B>))
        .route("/api/report", post(report::<B>))
        .route("/api/score", post(score::<B>))
        .with_state(session)
}

async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

/// Forwards one user message through the shared session.
///
/// A failed request leaves the history untouched; the session already rolls
/// back the user turn, so the error body is all the client sees.
async fn chat<B: CompletionBackend>(
    State(session): State<SharedSession<B>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "message must not be empty",
        ));
    }

    let mut session = session.lock().await;
    match session.send(message).await {
        Ok(reply) => Ok(Json(ChatResponse { reply })),
        Err(err) => Err(error_response(StatusCode::BAD_GATEWAY, &err.to_string())),
    }
}

async fn history<B: CompletionBackend>(
    State(session): State<SharedSession<B>>,
) -> Json<HistoryResponse> {
    let session = session.lock().await;
    Json(HistoryResponse {
        messages: session.messages().to_vec(),
    })
}

/// Summarizes and benchmarks report text as a one-off exchange.
async fn report<B: CompletionBackend>(
    State(session): State<SharedSession<B>>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<AnalysisResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut session = session.lock().await;
    match session.analyze_report_text(&request.text).await {
        Ok(analysis) => Ok(Json(AnalysisResponse { analysis })),
        Err(err) if err.is_bad_request() => {
            Err(error_response(StatusCode::BAD_REQUEST, &err.to_string()))
        }
        Err(err) => Err(error_response(StatusCode::BAD_GATEWAY, &err.to_string())),
    }
}

/// Scores packaging parameters as a one-off exchange.
async fn score<B: CompletionBackend>(
    State(session): State<SharedSession<B>>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<AnalysisResponse>, (StatusCode, Json<ErrorResponse>)> {
    let spec = PackagingSpec {
        material: request.material,
        weight_grams: request.weight_grams,
        recyclable: request.recyclable,
        renewable: request.renewable,
    };
    let mut session = session.lock().await;
    match session.assess_packaging(&spec).await {
        Ok(analysis) => Ok(Json(AnalysisResponse { analysis })),
        Err(err) => Err(error_response(StatusCode::BAD_GATEWAY, &err.to_string())),
    }
}

async fn clear<B: CompletionBackend>(State(session): State<SharedSession<B>>) -> StatusCode {
    let mut session = session.lock().await;
    session.clear();
    StatusCode::NO_CONTENT
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}
