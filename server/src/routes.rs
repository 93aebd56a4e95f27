use std::{net::SocketAddr, path::Path, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use shared::{
    leaderboard::LEADERBOARD_CAPACITY,
    protocol::{ErrorResponse, ResultRecord, SaveResponse, StatsSummary, REQUIRED_FIELDS},
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::db::Store;

pub struct AppState {
    pub store: Store,
}

#[cfg(test)]
impl AppState {
    pub fn in_memory() -> Self {
        Self {
            store: Store::memory(),
        }
    }
}

/// Results API plus the built front end, with an SPA fallback.
pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    let site = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));
    api_router(state)
        .fallback_service(site)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/save-result", post(save_result))
        .route("/api/leaderboard", get(leaderboard))
        .route("/api/stats", get(stats))
        .with_state(state)
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!("request failed: {:?}", err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

/// Body of a save request. The client's timestamp is replaced by the server's.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Submission {
    wpm: u32,
    accuracy: u32,
    cpm: u32,
    total_chars: usize,
    duration: u32,
}

async fn save_result(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    if !REQUIRED_FIELDS.iter().all(|field| body.get(*field).is_some()) {
        return Err(ApiError::bad_request("Missing required fields"));
    }
    let submission: Submission = serde_json::from_value(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid result: {e}")))?;

    let record = ResultRecord {
        wpm: submission.wpm,
        accuracy: submission.accuracy,
        cpm: submission.cpm,
        total_chars: submission.total_chars,
        duration: submission.duration,
        timestamp: Utc::now().to_rfc3339(),
    };
    let ip_address = peer.map(|ConnectInfo(addr)| addr.ip().to_string());

    state.store.insert(&record, ip_address).await?;
    info!("Saved result: {} WPM, {}% accuracy", record.wpm, record.accuracy);

    Ok(Json(SaveResponse {
        message: "Result saved successfully".to_string(),
    }))
}

async fn leaderboard(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ResultRecord>>, ApiError> {
    Ok(Json(state.store.leaderboard(LEADERBOARD_CAPACITY).await?))
}

async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsSummary>, ApiError> {
    Ok(Json(state.store.stats().await?))
}
