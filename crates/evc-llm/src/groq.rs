//! Groq-backed chat bridge. Falls back to [`HeuristicChatBridge`] behavior
//! whenever no API key is configured, so callers can construct this
//! unconditionally and get a working (if unintelligent) bridge in dev.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::bridge::{AnalyzedMessage, AnalyzerResult, ChatBridge, ExtractedFact};
use crate::heuristic::HeuristicChatBridge;

const ANALYZER_SYSTEM_PROMPT: &str = "You are an emotion signal analyzer for a chatbot. \
Return ONLY valid JSON with keys: S (float in [0,1], positive signal), D (float in [0,1], \
negative signal), C (float in [0.5,1.5], context intensity), user_emotion (short string label). \
No markdown, no extra text.";

const FACT_EXTRACTOR_PROMPT: &str = "You are a fact extraction engine. Analyze the user message \
and extract personal facts about the user. Return ONLY valid JSON with key \"facts\" containing \
an array of objects, each with \"key\" (short identifier), \"value\", \"category\" (one of \
personal, preference, work, relationship, general), and \"confidence\" (float 0-1). Only extract \
facts the user explicitly states about themselves; do not extract facts about other people unless \
it is a relationship, and do not extract opinions or emotions as facts. If no facts are found, \
return {\"facts\": []}. No markdown.";

const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct AnalyzerJson {
    #[serde(default)]
    s: Option<f64>,
    #[serde(default)]
    d: Option<f64>,
    #[serde(default)]
    c: Option<f64>,
    #[serde(default)]
    user_emotion: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FactsJson {
    #[serde(default)]
    facts: Vec<ExtractedFact>,
}

pub struct GroqChatBridge {
    client: Client,
    api_key: String,
    analyzer_model: String,
    chat_model: String,
    fallback: HeuristicChatBridge,
}

impl GroqChatBridge {
    /// Builds a bridge from environment-sourced configuration. An empty
    /// `api_key` makes every method degrade to the heuristic fallback,
    /// matching the mock-mode behavior the bot used before credentials
    /// were issued.
    pub fn new(api_key: String, analyzer_model: String, chat_model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            analyzer_model,
            chat_model,
            fallback: HeuristicChatBridge::new(),
        }
    }

    fn configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn chat_completion(
        &self,
        model: &str,
        system_prompt: &str,
        user_message: &str,
        temperature: f64,
        json_mode: bool,
    ) -> anyhow::Result<String> {
        let mut body = json!({
            "model": model,
            "temperature": temperature,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_message},
            ],
        });
        if json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }

        let response = self
            .client
            .post(GROQ_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("groq API error {status}: {text}");
        }

        let parsed: ChatCompletion = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        Ok(content)
    }
}

#[async_trait]
impl ChatBridge for GroqChatBridge {
    async fn analyze_message(&self, message: &str) -> AnalyzedMessage {
        if !self.configured() {
            return self.fallback.analyze_message(message).await;
        }

        let result = self
            .chat_completion(&self.analyzer_model, ANALYZER_SYSTEM_PROMPT, message, 0.0, true)
            .await
            .and_then(|content| Ok(serde_json::from_str::<AnalyzerJson>(&content)?));

        match result {
            Ok(parsed) => AnalyzedMessage {
                signals: AnalyzerResult {
                    s: parsed.s.unwrap_or(0.5),
                    d: parsed.d.unwrap_or(0.2),
                    c: parsed.c.unwrap_or(1.0),
                },
                user_emotion: parsed.user_emotion.unwrap_or_else(|| "neutral".to_string()),
            },
            Err(err) => {
                warn!(error = %err, "groq analyzer call failed, using heuristic fallback");
                self.fallback.analyze_message(message).await
            }
        }
    }

    async fn generate_reply(&self, system_prompt: &str, user_message: &str) -> String {
        if !self.configured() {
            return self.fallback.generate_reply(system_prompt, user_message).await;
        }

        match self
            .chat_completion(&self.chat_model, system_prompt, user_message, 0.6, false)
            .await
        {
            Ok(content) if !content.is_empty() => content,
            Ok(_) => self.fallback.generate_reply(system_prompt, user_message).await,
            Err(err) => {
                warn!(error = %err, "groq chat call failed, using heuristic fallback");
                self.fallback.generate_reply(system_prompt, user_message).await
            }
        }
    }

    async fn extract_facts(&self, user_message: &str) -> Vec<ExtractedFact> {
        if !self.configured() {
            return Vec::new();
        }

        let result = self
            .chat_completion(
                &self.analyzer_model,
                FACT_EXTRACTOR_PROMPT,
                user_message,
                0.0,
                true,
            )
            .await
            .and_then(|content| Ok(serde_json::from_str::<FactsJson>(&content)?));

        match result {
            Ok(parsed) => parsed.facts,
            Err(err) => {
                warn!(error = %err, "groq fact extraction failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_bridge_uses_heuristic_analyzer() {
        let bridge = GroqChatBridge::new(String::new(), "model-a".into(), "model-b".into());
        let analyzed = bridge.analyze_message("this is bad and I am sad").await;
        assert_eq!(analyzed.user_emotion, "negative");
    }

    #[tokio::test]
    async fn unconfigured_bridge_extracts_no_facts() {
        let bridge = GroqChatBridge::new(String::new(), "model-a".into(), "model-b".into());
        assert!(bridge.extract_facts("I live in Lisbon").await.is_empty());
    }
}
