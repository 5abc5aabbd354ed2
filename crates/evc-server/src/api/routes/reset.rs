//! Explicit session teardown.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: String,
    pub reset: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/reset", post(reset))
}

pub async fn reset(
    State(state): State<AppState>,
    Json(payload): Json<ResetRequest>,
) -> ApiResult<Json<ResetResponse>> {
    let reset = state.sessions.reset(&payload.session_id).await;
    Ok(Json(ResetResponse {
        status: "ok".to_string(),
        reset,
    }))
}
