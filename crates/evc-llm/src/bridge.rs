//! Chat bridge contract (out of scope for the core; only the interface and a
//! fallback implementation live here). An orchestrator asks it to classify
//! the user's message into raw signals, to draft a reply given the bot's
//! state and gathered context, and to pull structured facts out of a
//! message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Raw stimulus signals plus a free-text label for the user's apparent
/// emotion, as read off the incoming message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalyzerResult {
    pub s: f64,
    pub d: f64,
    pub c: f64,
}

/// Emotion label accompanying an [`AnalyzerResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedMessage {
    pub signals: AnalyzerResult,
    pub user_emotion: String,
}

/// A single extracted personal fact, with the model's own confidence and its
/// best guess at a category; the orchestrator decides what confidence bar to
/// apply before persisting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedFact {
    pub key: String,
    pub value: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_category() -> String {
    "general".to_string()
}

fn default_confidence() -> f64 {
    0.7
}

#[async_trait]
pub trait ChatBridge: Send + Sync {
    async fn analyze_message(&self, message: &str) -> AnalyzedMessage;

    /// Asks for a reply given a fully-assembled system prompt (built by the
    /// prompt assembler, not by this bridge) and the raw user message.
    async fn generate_reply(&self, system_prompt: &str, user_message: &str) -> String;

    async fn extract_facts(&self, user_message: &str) -> Vec<ExtractedFact>;
}
