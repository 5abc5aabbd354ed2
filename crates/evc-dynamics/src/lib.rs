//! Hormone and emotion dynamics for the Emotional Value Core.
//!
//! This crate owns the fixed-cardinality vectors (8 hormones, 8 emotions), the
//! configuration constants that parameterize their dynamics, the hormone
//! system's stimulus/decay/interaction/clamp pipeline, and the linear
//! hormone-to-emotion projection. Trust, memory trace, and session lifecycle
//! live one layer up in `evc-core`.

pub mod constants;
pub mod emotions;
pub mod hormones;
pub mod names;

pub use constants::{PersonalityPreset, E, H};
pub use emotions::{EmotionMapper, EmotionVector};
pub use hormones::{HormoneSystem, HormoneVector, Personality};
pub use names::{Emotion, Hormone};
