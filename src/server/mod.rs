//! HTTP surface over the content store and insight generator.
//!
//! Unknown content ids are answered with HTTP 200 and an `{"error": ...}`
//! body, which is what the dashboard frontend expects. Only model failures
//! become error statuses.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::consts::LINK_NOT_FOUND;
use crate::insight::InsightGenerator;
use crate::model::ModelError;
use crate::store::{ContentStore, EngineOutput};

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct AppState {
    store: Arc<ContentStore>,
    insights: Arc<InsightGenerator>,
}

impl AppState {
    pub fn new(store: Arc<ContentStore>, insights: Arc<InsightGenerator>) -> Self {
        Self { store, insights }
    }
}

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub link: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LinksResponse {
    pub links: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn not_found() -> Response {
    Json(ErrorBody {
        error: LINK_NOT_FOUND,
    })
    .into_response()
}

/// A model failure surfaced to the HTTP caller.
struct AppError(ModelError);

impl From<ModelError> for AppError {
    fn from(e: ModelError) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "insight generation failed");
        let message = self.0.to_string();
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody { error: &message }),
        )
            .into_response()
    }
}

async fn list_links(State(state): State<AppState>) -> Json<LinksResponse> {
    Json(LinksResponse {
        links: state.store.list_ids().into_iter().map(String::from).collect(),
    })
}

async fn analyze_link(
    State(state): State<AppState>,
    Json(req): Json<LinkRequest>,
) -> Result<Response, AppError> {
    let Some(output) = state.store.get(&req.link) else {
        tracing::info!(link = %req.link, "analyze: link not found");
        return Ok(not_found());
    };
    let insight = state.insights.generate(output).await?;
    Ok(Json(insight).into_response())
}

async fn content_by_link(
    State(state): State<AppState>,
    Json(req): Json<LinkRequest>,
) -> Response {
    match state.store.get(&req.link) {
        Some(output) => Json(output).into_response(),
        None => not_found(),
    }
}

async fn analyze_raw(
    State(state): State<AppState>,
    Json(output): Json<EngineOutput>,
) -> Result<Response, AppError> {
    let insight = state.insights.generate(&output).await?;
    Ok(Json(insight).into_response())
}

/// Build the router with permissive CORS (origin mirrored, credentials on).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/links", get(list_links))
        .route("/analyze/link", post(analyze_link))
        .route("/analyze/raw", post(analyze_raw))
        .route("/content/link", post(content_by_link))
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already-bound listener until Ctrl+C.
pub async fn serve_on(listener: TcpListener, state: AppState) -> Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("http server failed")
}

/// Bind the configured address and serve.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(addr = %config.bind, "listening");
    serve_on(listener, state).await
}
