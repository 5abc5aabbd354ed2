//! Session Manager (C5): maps a session id to live state (engine + tracker +
//! per-turn scratch), lazily created, resettable, and serializable.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use evc_dynamics::PersonalityPreset;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::engine::{EVCEngine, TurnResult};
use crate::tracker::UserEmotionTracker;

/// A chat message as retained in per-session scratch (role + content pairs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScratchMessage {
    pub role: String,
    pub content: String,
}

/// Everything owned by one live session besides the engine/tracker pair.
#[derive(Debug, Clone, Default)]
pub struct Scratch {
    pub conversation_id: Option<String>,
    pub chat_history: Vec<ScratchMessage>,
    pub last_reply: Option<String>,
    pub last_turn_ts: Option<DateTime<Utc>>,
    pub restored: bool,
}

/// Live per-session state: one bot-side engine, one user-side tracker, and
/// scratch bookkeeping the orchestrator needs across turns.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub engine: EVCEngine,
    pub tracker: UserEmotionTracker,
    pub scratch: Scratch,
}

impl SessionState {
    fn new(session_id: String, preset: PersonalityPreset) -> Self {
        let now = Utc::now();
        SessionState {
            session_id,
            created_at: now,
            updated_at: now,
            engine: EVCEngine::with_preset("Bot", preset),
            tracker: UserEmotionTracker::new(),
            scratch: Scratch::default(),
        }
    }
}

/// Serialized view returned by [`SessionManager::serialize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub turn: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub evc_state: crate::engine::EngineState,
    pub latest_turn: Option<TurnResult>,
}

/// C5: the process-wide map from session id to live [`SessionState`], each
/// guarded individually so turns on different sessions can proceed in
/// parallel while turns on the same session serialize.
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionState>>>>,
    default_preset: PersonalityPreset,
}

impl SessionManager {
    pub fn new(default_preset: PersonalityPreset) -> Self {
        SessionManager {
            sessions: RwLock::new(HashMap::new()),
            default_preset,
        }
    }

    /// Fetches the session's lock, creating it with a fresh engine/tracker if
    /// absent. Mutual exclusion is only taken on the map itself for the
    /// insert path; concurrent reads of an already-present entry do not
    /// contend on the map lock.
    pub async fn get_or_create(&self, session_id: &str) -> Arc<Mutex<SessionState>> {
        if let Some(existing) = self.sessions.read().await.get(session_id) {
            return existing.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(SessionState::new(
                    session_id.to_string(),
                    self.default_preset,
                )))
            })
            .clone()
    }

    pub async fn exists(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    /// Removes the session entirely, returning whether it previously existed.
    pub async fn reset(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    pub async fn serialize(&self, session_id: &str) -> Option<SessionSummary> {
        let handle = self.sessions.read().await.get(session_id)?.clone();
        let state = handle.lock().await;
        Some(SessionSummary {
            session_id: state.session_id.clone(),
            turn: state.engine.turn(),
            created_at: state.created_at,
            updated_at: state.updated_at,
            evc_state: state.engine.get_full_state(),
            latest_turn: state.engine.last_turn().cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let manager = SessionManager::new(PersonalityPreset::Default);
        let a = manager.get_or_create("s1").await;
        let b = manager.get_or_create("s1").await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn reset_removes_session_and_reports_prior_existence() {
        let manager = SessionManager::new(PersonalityPreset::Default);
        manager.get_or_create("s1").await;
        assert!(manager.reset("s1").await);
        assert!(!manager.reset("s1").await);
    }

    #[tokio::test]
    async fn serialize_reflects_turns_processed() {
        let manager = SessionManager::new(PersonalityPreset::Default);
        let handle = manager.get_or_create("s1").await;
        {
            let mut state = handle.lock().await;
            state.engine.process_turn(0.8, 0.0, 1.0, 1.0, "hi");
        }
        let summary = manager.serialize("s1").await.unwrap();
        assert_eq!(summary.turn, 1);
    }
}
