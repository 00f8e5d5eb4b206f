//! HTTP service exposing the pipeline.
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `GET` | `/` | `200 {"message": …}` liveness probe |
//! | `POST` | `/summarize` | `200 {"summary", "tags"}` (fallback results included) or `500 {"detail"}` |
//!
//! When the summarizer runs in markdown mode, a successful `POST /summarize`
//! answers `200 {"markdown": …}` instead.

use crate::error::SummarizeError;
use crate::config::OutputMode;
use crate::models::{ErrorBody, FreeformBody, StatusBody, SummarizeRequest};
use crate::pipeline::Summarizer;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, instrument};

/// Build the router around a shared [`Summarizer`].
pub fn create_app(summarizer: Arc<Summarizer>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/summarize", post(summarize))
        .layer(CorsLayer::permissive())
        .with_state(summarizer)
}

/// Bind `host:port` and serve until the process is stopped.
pub async fn serve(summarizer: Arc<Summarizer>, host: &str, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!(addr = %listener.local_addr()?, "Web Summarizer API listening");
    axum::serve(listener, create_app(summarizer)).await
}

async fn root() -> Json<StatusBody> {
    Json(StatusBody {
        message: "Web Summarizer API is running".to_string(),
    })
}

#[instrument(level = "info", skip_all, fields(url = %request.url))]
async fn summarize(
    State(summarizer): State<Arc<Summarizer>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Response, ApiError> {
    let response = match summarizer.mode() {
        OutputMode::Json => {
            let result = summarizer.summarize(&request.url).await?;
            info!(fallback = result.is_fallback(), "Summary served");
            Json(result).into_response()
        }
        OutputMode::Markdown => {
            let markdown = summarizer.summarize_freeform(&request.url).await?;
            Json(FreeformBody { markdown }).into_response()
        }
    };
    Ok(response)
}

/// A fatal pipeline error rendered as `500 {"detail": …}`.
struct ApiError(SummarizeError);

impl From<SummarizeError> for ApiError {
    fn from(e: SummarizeError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "summarize request failed");
        let body = ErrorBody {
            detail: self.0.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
