//! Shared state for the Axum application.

use std::sync::Arc;

use anyhow::Context;
use evc_core::SessionManager;
use evc_db::{PersistenceAdapter, SqliteRepository};
use evc_dynamics::PersonalityPreset;
use evc_llm::{ChatBridge, GroqChatBridge};
use evc_memory::{InMemoryNoteStore, NoteStore, RuleBasedSkillMatcher, SkillMatcher, UserMemoryAdapter};
use tracing::{info, warn};

use crate::config::Config;

/// Immutable state shared across every handler.
#[derive(Clone)]
pub struct AppState {
    pub persistence: Arc<dyn PersistenceAdapter>,
    pub chat_bridge: Arc<dyn ChatBridge>,
    pub note_store: Arc<dyn NoteStore>,
    pub skill_matcher: Arc<dyn SkillMatcher>,
    pub memory_adapter: Arc<UserMemoryAdapter>,
    pub sessions: Arc<SessionManager>,
    jwt_secret: Arc<String>,
    turn_seconds: f64,
    google_client_id: Option<Arc<String>>,
    frontend_origin: Option<Arc<String>>,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        if config.db_backend() != "sqlite" {
            warn!(
                backend = config.db_backend(),
                "unsupported DB_BACKEND requested; falling back to sqlite"
            );
        }
        if config.firebase_credentials().is_some() {
            warn!("FIREBASE_CREDENTIALS set but no Firebase backend is wired in; ignoring");
        }

        let url = format!("sqlite://{}", config.db_path());
        let repository = SqliteRepository::connect(&url)
            .await
            .with_context(|| format!("failed to open sqlite database at {url}"))?;
        let persistence: Arc<dyn PersistenceAdapter> = Arc::new(repository);

        let chat_bridge: Arc<dyn ChatBridge> = Arc::new(GroqChatBridge::new(
            config.groq_api_key().to_string(),
            config.groq_analyzer_model().to_string(),
            config.groq_chat_model().to_string(),
        ));
        if config.groq_api_key().is_empty() {
            info!("GROQ_API_KEY not set; chat bridge runs in heuristic fallback mode");
        }

        let note_store: Arc<dyn NoteStore> = Arc::new(InMemoryNoteStore::new());
        let skill_matcher: Arc<dyn SkillMatcher> = Arc::new(RuleBasedSkillMatcher::new());
        let memory_adapter = Arc::new(UserMemoryAdapter::new(persistence.clone()));
        let sessions = Arc::new(SessionManager::new(PersonalityPreset::Default));

        Ok(Self {
            persistence,
            chat_bridge,
            note_store,
            skill_matcher,
            memory_adapter,
            sessions,
            jwt_secret: Arc::new(config.jwt_secret().to_string()),
            turn_seconds: config.turn_seconds(),
            google_client_id: config.google_client_id().map(|s| Arc::new(s.to_string())),
            frontend_origin: config.frontend_origin().map(|s| Arc::new(s.to_string())),
        })
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn turn_seconds(&self) -> f64 {
        self.turn_seconds
    }

    pub fn google_client_id(&self) -> Option<&str> {
        self.google_client_id.as_deref().map(|s| s.as_str())
    }

    pub fn frontend_origin(&self) -> Option<&str> {
        self.frontend_origin.as_deref().map(|s| s.as_str())
    }
}
