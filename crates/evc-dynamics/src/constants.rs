//! Immutable configuration constants for the hormone/emotion dynamical system.
//!
//! Every array here is indexed by [`Hormone::index`] or [`Emotion::index`]; the
//! fixed order is a correctness contract shared across the whole workspace.

use crate::{Emotion, Hormone};

pub const H: usize = 8;
pub const E: usize = 8;

pub const H_BASELINE: [f64; H] = [0.50, 0.60, 0.40, 0.30, 0.30, 0.20, 0.50, 0.30];
pub const HALF_LIFE_TURNS: [f64; H] = [0.4, 6.0, 0.8, 4.0, 15.0, 0.5, 6.0, 0.5];
pub const P_POS: [f64; H] = [0.80, 0.50, 0.60, 0.40, -0.30, 0.10, 0.30, 0.10];
pub const P_NEG: [f64; H] = [0.60, 0.50, 0.40, 0.20, -0.80, -0.60, 0.40, -0.50];

pub const INTERACTION_STRENGTH: f64 = 0.15;
pub const RECOVERY_RATE: f64 = 0.10;
pub const NEGATIVITY_BIAS: f64 = 1.5;
pub const STIMULUS_GAIN: f64 = 0.60;
pub const SOFT_CLAMP_SHARPNESS: f64 = 2.8;

pub const HALF_LIFE_MIN_FACTOR: f64 = 0.65;
pub const HALF_LIFE_MAX_FACTOR: f64 = 2.00;

pub const HALF_LIFE_STRESS_SENS: [f64; H] = [-0.15, -0.10, -0.20, 0.05, 0.65, 0.45, -0.05, 0.35];
pub const HALF_LIFE_ACTIVATION_SENS: [f64; H] = [0.25, 0.20, 0.20, 0.20, 0.70, 0.40, 0.20, 0.35];

pub const MEMORY_BETA: f64 = 0.90;

pub const TRUST_INITIAL: f64 = 0.5;
pub const TRUST_GAMMA: f64 = 0.06;
pub const TRUST_LAMBDA: f64 = 0.05;
pub const TRUST_MIN: f64 = 0.05;
pub const TRUST_MAX: f64 = 0.95;
pub const TRUST_UP_EXP: f64 = 1.2;
pub const TRUST_DOWN_EXP: f64 = 0.8;

/// Personality sensitivity preset (K in the spec notation), one per hormone.
pub type Personality = [f64; H];

pub const PERSONALITY_DEFAULT: Personality = [1.0; H];
pub const PERSONALITY_SENSITIVE: Personality = [1.5, 0.8, 1.3, 1.0, 1.5, 1.3, 0.7, 1.2];
pub const PERSONALITY_CALM: Personality = [0.8, 1.3, 1.0, 1.2, 0.6, 0.5, 1.5, 0.6];
pub const PERSONALITY_CHEERFUL: Personality = [1.5, 1.2, 1.3, 1.2, 0.5, 0.5, 1.2, 0.6];

/// Named personality preset, selectable at session creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum PersonalityPreset {
    #[default]
    Default,
    Sensitive,
    Calm,
    Cheerful,
}

impl PersonalityPreset {
    pub fn vector(self) -> Personality {
        match self {
            PersonalityPreset::Default => PERSONALITY_DEFAULT,
            PersonalityPreset::Sensitive => PERSONALITY_SENSITIVE,
            PersonalityPreset::Calm => PERSONALITY_CALM,
            PersonalityPreset::Cheerful => PERSONALITY_CHEERFUL,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PersonalityPreset::Default => "default",
            PersonalityPreset::Sensitive => "sensitive",
            PersonalityPreset::Calm => "calm",
            PersonalityPreset::Cheerful => "cheerful",
        }
    }
}

/// Cross-hormone interaction matrix (row i = influence of every hormone on hormone i).
///
/// No numeric value for this matrix is recoverable from the source material; the
/// rows below encode the qualitative relationships described by the hormone names
/// themselves (e.g. Cortisol suppresses Dopamine and Serotonin, Oxytocin dampens
/// Cortisol and Adrenaline, GABA dampens the stress axis). Diagonal is zero because
/// self-interaction is already captured by the linear step.
#[rustfmt::skip]
pub const H_INTERACT: [[f64; H]; H] = [
    // Dopamine    Serotonin    Oxytocin    Endorphin    Cortisol    Adrenaline    GABA      Norepi
    [  0.00,        0.10,        0.05,        0.15,      -0.35,       0.20,       -0.05,      0.10 ], // Dopamine
    [  0.05,        0.00,        0.15,        0.10,      -0.30,      -0.15,        0.20,     -0.10 ], // Serotonin
    [  0.05,        0.15,        0.00,        0.10,      -0.40,      -0.25,        0.15,     -0.15 ], // Oxytocin
    [  0.10,        0.10,        0.10,        0.00,      -0.20,      -0.10,        0.10,     -0.05 ], // Endorphin
    [ -0.20,       -0.25,       -0.20,       -0.10,        0.00,       0.30,       -0.15,      0.25 ], // Cortisol
    [  0.10,       -0.10,       -0.15,       -0.05,        0.35,       0.00,       -0.25,      0.40 ], // Adrenaline
    [ -0.05,        0.20,        0.15,        0.10,       -0.30,      -0.30,        0.00,     -0.20 ], // GABA
    [  0.05,       -0.10,       -0.15,       -0.05,        0.30,       0.35,       -0.20,      0.00 ], // Norepinephrine
];

/// Linear hormone-to-emotion projection matrix (row i = emotion i, columns hormones).
#[rustfmt::skip]
pub const W_MATRIX: [[f64; H]; E] = [
    // Dopamine  Serotonin  Oxytocin  Endorphin  Cortisol  Adrenaline  GABA    Norepi
    [   0.45,      0.30,     0.10,      0.25,     -0.20,      0.05,     0.05,   0.05  ], // Joy
    [   0.05,      0.45,     0.25,      0.10,     -0.35,     -0.25,     0.35,  -0.10  ], // Serenity
    [   0.10,      0.30,     0.55,      0.15,     -0.15,     -0.05,     0.10,  -0.05  ], // Love
    [   0.40,      0.05,     0.05,      0.20,      0.05,      0.40,    -0.10,   0.30  ], // Excitement
    [  -0.25,     -0.40,    -0.15,     -0.10,      0.35,      0.05,    -0.05,   0.05  ], // Sadness
    [  -0.10,     -0.15,    -0.10,     -0.05,      0.40,      0.30,    -0.25,   0.25  ], // Fear
    [  -0.15,     -0.20,    -0.15,     -0.05,      0.30,      0.35,    -0.20,   0.20  ], // Anger
    [   0.15,     -0.05,     0.00,      0.05,      0.10,      0.45,    -0.05,   0.35  ], // Surprise
];

pub fn hormone_baseline(h: Hormone) -> f64 {
    H_BASELINE[h.index()]
}

pub fn emotion_row(e: Emotion) -> [f64; H] {
    W_MATRIX[e.index()]
}
