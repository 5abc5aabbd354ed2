//! Analyzer and chat generation bridge (out of core scope per the
//! specification, which only fixes this crate's interface): a heuristic
//! fallback plus a Groq-backed implementation that degrades to the
//! heuristic whenever no API key is configured.

pub mod bridge;
pub mod groq;
pub mod heuristic;

pub use bridge::{AnalyzedMessage, AnalyzerResult, ChatBridge, ExtractedFact};
pub use groq::GroqChatBridge;
pub use heuristic::HeuristicChatBridge;
