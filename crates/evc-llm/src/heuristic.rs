//! Keyword-heuristic chat bridge: the fallback used whenever no LLM
//! credentials are configured. Mirrors the thresholds the bot used before a
//! real model was wired in.

use async_trait::async_trait;

use crate::bridge::{AnalyzedMessage, AnalyzerResult, ChatBridge, ExtractedFact};

const NEGATIVE_MARKERS: &[&str] = &["bad", "sad", "angry", "tired", "awful", "upset"];

#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicChatBridge;

impl HeuristicChatBridge {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatBridge for HeuristicChatBridge {
    async fn analyze_message(&self, message: &str) -> AnalyzedMessage {
        let lower = message.to_lowercase();
        let negative = NEGATIVE_MARKERS.iter().any(|marker| lower.contains(marker));

        let (s, d, c, user_emotion) = if negative {
            (0.2, 0.6, 1.1, "negative")
        } else {
            (0.6, 0.1, 0.9, "neutral-positive")
        };

        AnalyzedMessage {
            signals: AnalyzerResult { s, d, c },
            user_emotion: user_emotion.to_string(),
        }
    }

    async fn generate_reply(&self, _system_prompt: &str, _user_message: &str) -> String {
        "I hear you. Let's keep going from where we left off.".to_string()
    }

    async fn extract_facts(&self, _user_message: &str) -> Vec<ExtractedFact> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn negative_marker_flips_signals() {
        let bridge = HeuristicChatBridge::new();
        let analyzed = bridge.analyze_message("I'm so tired and sad today").await;
        assert_eq!(analyzed.user_emotion, "negative");
        assert!(analyzed.signals.d > analyzed.signals.s);
    }

    #[tokio::test]
    async fn neutral_message_defaults_to_positive_lean() {
        let bridge = HeuristicChatBridge::new();
        let analyzed = bridge.analyze_message("just checking in, how are you?").await;
        assert_eq!(analyzed.user_emotion, "neutral-positive");
    }

    #[tokio::test]
    async fn extract_facts_is_empty_without_a_model() {
        let bridge = HeuristicChatBridge::new();
        assert!(bridge.extract_facts("I live in Lisbon").await.is_empty());
    }
}
