//! Turn-log export as JSON, CSV, or labeled plain text.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    export,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/export/history", get(export_history))
        .route("/api/export/csv", get(export_csv))
        .route("/api/export/txt", get(export_txt))
}

async fn turns_for(
    state: &AppState,
    session_id: &str,
) -> ApiResult<Vec<evc_core::TurnResult>> {
    if !state.sessions.exists(session_id).await {
        return Err(ApiError::NotFound("unknown session".into()));
    }
    let handle = state.sessions.get_or_create(session_id).await;
    let session = handle.lock().await;
    Ok(session.engine.turn_log().to_vec())
}

pub async fn export_history(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<Json<Vec<evc_core::TurnResult>>> {
    Ok(Json(turns_for(&state, &query.session_id).await?))
}

pub async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<impl IntoResponse> {
    let turns = turns_for(&state, &query.session_id).await?;
    let csv = export::render_csv(&turns);
    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        csv,
    ))
}

pub async fn export_txt(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<impl IntoResponse> {
    let turns = turns_for(&state, &query.session_id).await?;
    let txt = export::render_txt(&query.session_id, &turns);
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        txt,
    ))
}
