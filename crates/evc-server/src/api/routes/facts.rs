//! CRUD surface over a user's remembered facts.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use evc_db::UserFactDto;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::Claims,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertFactRequest {
    pub key: String,
    pub value: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "general".to_string()
}

#[derive(Debug, Serialize)]
pub struct DeleteFactResponse {
    pub deleted: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/user/facts", get(list_facts).post(create_fact))
        .route("/api/user/facts/:id", axum::routing::delete(delete_fact))
}

pub async fn list_facts(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<Json<Vec<UserFactDto>>> {
    let facts = state
        .persistence
        .get_facts(&claims.sub, query.category.as_deref())
        .await?;
    Ok(Json(facts))
}

pub async fn create_fact(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<UpsertFactRequest>,
) -> ApiResult<Json<UserFactDto>> {
    if payload.key.trim().is_empty() || payload.value.trim().is_empty() {
        return Err(ApiError::BadRequest("key and value are required".into()));
    }
    let fact = state
        .persistence
        .upsert_fact(UserFactDto {
            id: Uuid::new_v4().to_string(),
            user_id: claims.sub,
            category: payload.category,
            key: payload.key,
            value: payload.value,
            confidence: 1.0,
            source: "manual".to_string(),
            first_mentioned: None,
            last_confirmed: None,
            mention_count: 1,
            is_active: true,
        })
        .await?;
    Ok(Json(fact))
}

pub async fn delete_fact(
    State(state): State<AppState>,
    claims: Claims,
    Path(fact_id): Path<String>,
) -> ApiResult<Json<DeleteFactResponse>> {
    let deleted = state.persistence.delete_fact(&claims.sub, &fact_id).await?;
    Ok(Json(DeleteFactResponse { deleted }))
}
