//! Listing a user's conversations and replaying one's message history.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::Claims,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub platform: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<evc_db::MessageDto>,
}

const DEFAULT_LIMIT: i64 = 50;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/user/conversations", get(list_conversations))
        .route("/api/conversations/:id/messages", get(conversation_messages))
}

pub async fn list_conversations(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<ConversationSummary>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 200);
    let conversations = state
        .persistence
        .list_conversations(&claims.sub, limit)
        .await?;
    Ok(Json(
        conversations
            .into_iter()
            .map(|c| ConversationSummary {
                id: c.id,
                title: c.title,
                platform: c.platform,
                created_at: c.created_at,
                updated_at: c.updated_at,
            })
            .collect(),
    ))
}

pub async fn conversation_messages(
    State(state): State<AppState>,
    claims: Claims,
    Path(conversation_id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<MessagesResponse>> {
    let conversation = state
        .persistence
        .get_conversation(&conversation_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("unknown conversation".into()))?;
    if conversation.user_id != claims.sub {
        return Err(ApiError::NotFound("unknown conversation".into()));
    }

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 200);
    let messages = state.persistence.get_messages(&conversation_id, limit).await?;
    Ok(Json(MessagesResponse { messages }))
}
