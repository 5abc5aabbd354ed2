//! A self-driving conversation that replays a fixed script of messages
//! against `/api/chat`'s own turn pipeline, one server-sent event per turn,
//! sleeping between turns. Useful for demoing the EVC trajectory without a
//! live user.

use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::stream::{self, Stream};
use serde::Deserialize;

use crate::{orchestrator, state::AppState};

const POSITIVE_SCRIPT: &[&str] = &[
    "hey, good to talk to you again",
    "things have been going really well lately",
    "I got some great news today, feeling excited",
    "thanks for listening, it means a lot",
    "I think I'm in a much better place now",
];

const NEGATIVE_SCRIPT: &[&str] = &[
    "I've had a really rough week",
    "nothing seems to be going right",
    "I'm worried this is only going to get worse",
    "I feel like I can't catch a break",
    "honestly I'm exhausted and a bit angry about it",
];

#[derive(Debug, Deserialize)]
pub struct AutotestQuery {
    pub session_id: String,
    #[serde(default)]
    pub use_expected_signals: bool,
    #[serde(default = "default_delay")]
    pub delay_seconds: f64,
}

fn default_delay() -> f64 {
    1.0
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/autotest/start", get(start))
}

pub async fn start(
    State(state): State<AppState>,
    Query(query): Query<AutotestQuery>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let script: Vec<String> = if query.use_expected_signals {
        POSITIVE_SCRIPT.iter().map(|s| s.to_string()).collect()
    } else {
        NEGATIVE_SCRIPT.iter().map(|s| s.to_string()).collect()
    };
    let delay = Duration::from_secs_f64(query.delay_seconds.max(0.0));

    let stream = stream::unfold(
        (0usize, state, query.session_id, script, delay),
        |(index, state, session_id, script, delay)| async move {
            let message = script.get(index)?;
            let outcome = orchestrator::run_turn(&state, &session_id, message, None).await;

            let payload = serde_json::json!({
                "turn": outcome.bot_state.turn,
                "message": message,
                "dominant_emotion": outcome.bot_state.dominant_emotion,
                "dominant_score": outcome.bot_state.dominant_score,
                "trust": outcome.bot_state.trust,
                "reply": outcome.reply,
            });
            let event = Event::default().json_data(payload).unwrap_or_else(|_| Event::default());

            if index + 1 < script.len() {
                tokio::time::sleep(delay).await;
            }
            Some((Ok(event), (index + 1, state, session_id, script, delay)))
        },
    );

    Sse::new(stream).keep_alive(KeepAlive::default())
}
