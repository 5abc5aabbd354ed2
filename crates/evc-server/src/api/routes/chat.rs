//! The conversational turn endpoint. Thin HTTP wrapper around
//! [`orchestrator::run_turn`]; all the state machinery lives there.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{
    auth::OptionalClaims,
    error::{ApiError, ApiResult},
    orchestrator::{self, AuthedUser},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct Signals {
    #[serde(rename = "S")]
    pub s: f64,
    #[serde(rename = "D")]
    pub d: f64,
    #[serde(rename = "C")]
    pub c: f64,
}

#[derive(Debug, Serialize)]
pub struct LearnedFact {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct MoodStats {
    pub avg_s: f64,
    pub avg_d: f64,
    pub avg_c: f64,
    pub turns: usize,
}

#[derive(Debug, Serialize)]
pub struct UserMood {
    pub current: String,
    pub trend: String,
    pub stats: MoodStats,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub user_emotion: String,
    pub signals: Signals,
    pub delta_t: f64,
    pub bot_state: evc_core::TurnResult,
    pub matched_skill: Option<String>,
    pub memory_used: bool,
    pub learned_facts: Vec<LearnedFact>,
    pub user_mood: UserMood,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/chat", post(chat))
}

pub async fn chat(
    State(state): State<AppState>,
    OptionalClaims(claims): OptionalClaims,
    Json(payload): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    if payload.session_id.trim().is_empty() {
        return Err(ApiError::BadRequest("session_id is required".into()));
    }
    if payload.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".into()));
    }

    let authed = claims.map(|c| AuthedUser {
        user_id: c.sub,
        is_guest: c.guest,
    });

    let outcome = orchestrator::run_turn(&state, &payload.session_id, &payload.message, authed.as_ref()).await;

    Ok(Json(ChatResponse {
        response: outcome.reply,
        user_emotion: outcome.user_emotion,
        signals: Signals {
            s: outcome.s,
            d: outcome.d,
            c: outcome.c,
        },
        delta_t: outcome.delta_t,
        bot_state: outcome.bot_state,
        matched_skill: outcome.matched_skill,
        memory_used: outcome.memory_used,
        learned_facts: outcome
            .learned_facts
            .into_iter()
            .map(|(key, value)| LearnedFact { key, value })
            .collect(),
        user_mood: UserMood {
            current: outcome.mood_current,
            trend: outcome.mood_trend,
            stats: MoodStats {
                avg_s: outcome.stats_avg_s,
                avg_d: outcome.stats_avg_d,
                avg_c: outcome.stats_avg_c,
                turns: outcome.stats_turns,
            },
        },
    }))
}
