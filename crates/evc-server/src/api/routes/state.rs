//! Session state inspection.

use axum::{extract::State, routing::get, Json, Router};
use evc_core::SessionSummary;
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct StateQuery {
    pub session_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/state", get(get_state))
}

pub async fn get_state(
    State(state): State<AppState>,
    axum::extract::Query(query): axum::extract::Query<StateQuery>,
) -> ApiResult<Json<SessionSummary>> {
    state
        .sessions
        .serialize(&query.session_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("unknown session".into()))
}
