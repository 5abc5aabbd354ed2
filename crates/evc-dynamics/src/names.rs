//! Fixed index order for hormones and emotions.
//!
//! The order here is a correctness contract: every configuration matrix in
//! [`crate::constants`] is addressed by these indices. Reordering either enum
//! changes the meaning of every matrix row/column.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hormone {
    Dopamine,
    Serotonin,
    Oxytocin,
    Endorphin,
    Cortisol,
    Adrenaline,
    Gaba,
    Norepinephrine,
}

impl Hormone {
    pub const ALL: [Hormone; 8] = [
        Hormone::Dopamine,
        Hormone::Serotonin,
        Hormone::Oxytocin,
        Hormone::Endorphin,
        Hormone::Cortisol,
        Hormone::Adrenaline,
        Hormone::Gaba,
        Hormone::Norepinephrine,
    ];

    pub const fn index(self) -> usize {
        match self {
            Hormone::Dopamine => 0,
            Hormone::Serotonin => 1,
            Hormone::Oxytocin => 2,
            Hormone::Endorphin => 3,
            Hormone::Cortisol => 4,
            Hormone::Adrenaline => 5,
            Hormone::Gaba => 6,
            Hormone::Norepinephrine => 7,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Hormone::Dopamine => "Dopamine",
            Hormone::Serotonin => "Serotonin",
            Hormone::Oxytocin => "Oxytocin",
            Hormone::Endorphin => "Endorphin",
            Hormone::Cortisol => "Cortisol",
            Hormone::Adrenaline => "Adrenaline",
            Hormone::Gaba => "GABA",
            Hormone::Norepinephrine => "Norepinephrine",
        }
    }

    pub fn lower(self) -> String {
        self.name().to_lowercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Joy,
    Serenity,
    Love,
    Excitement,
    Sadness,
    Fear,
    Anger,
    Surprise,
}

impl Emotion {
    pub const ALL: [Emotion; 8] = [
        Emotion::Joy,
        Emotion::Serenity,
        Emotion::Love,
        Emotion::Excitement,
        Emotion::Sadness,
        Emotion::Fear,
        Emotion::Anger,
        Emotion::Surprise,
    ];

    pub const fn index(self) -> usize {
        match self {
            Emotion::Joy => 0,
            Emotion::Serenity => 1,
            Emotion::Love => 2,
            Emotion::Excitement => 3,
            Emotion::Sadness => 4,
            Emotion::Fear => 5,
            Emotion::Anger => 6,
            Emotion::Surprise => 7,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Emotion::Joy => "Joy",
            Emotion::Serenity => "Serenity",
            Emotion::Love => "Love",
            Emotion::Excitement => "Excitement",
            Emotion::Sadness => "Sadness",
            Emotion::Fear => "Fear",
            Emotion::Anger => "Anger",
            Emotion::Surprise => "Surprise",
        }
    }

    pub fn lower(self) -> String {
        self.name().to_lowercase()
    }

    pub fn from_index(i: usize) -> Emotion {
        Emotion::ALL[i]
    }
}
