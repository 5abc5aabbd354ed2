//! The EVC engine (C3), user-emotion tracker (C4), and session manager (C5).
//!
//! Built on top of the hormone/emotion dynamics in `evc-dynamics`, this crate
//! is where trust, the exponential memory trace, turn logging, and session
//! lifecycle live. It has no knowledge of HTTP, persistence, or the LLM —
//! those are wired together one layer up in the server crate.

pub mod engine;
pub mod session;
pub mod tracker;

pub use engine::{EVCEngine, EngineState, TurnResult};
pub use session::{Scratch, ScratchMessage, SessionManager, SessionState, SessionSummary};
pub use tracker::{EmotionRecord, Trend, TrackerState, TrackerStats, UserEmotionTracker};
