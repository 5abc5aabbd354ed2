//! Hormone System (C1): stimulus, dynamic half-life decay, cross-interaction,
//! homeostatic recovery, and soft clamping.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    self, H, H_BASELINE, H_INTERACT, HALF_LIFE_ACTIVATION_SENS, HALF_LIFE_MAX_FACTOR,
    HALF_LIFE_MIN_FACTOR, HALF_LIFE_STRESS_SENS, HALF_LIFE_TURNS, INTERACTION_STRENGTH,
    NEGATIVITY_BIAS, P_NEG, P_POS, RECOVERY_RATE, SOFT_CLAMP_SHARPNESS, STIMULUS_GAIN,
};
use crate::names::Hormone;

/// Dense length-8 hormone vector, indexed through [`Hormone::index`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HormoneVector(pub [f64; H]);

impl HormoneVector {
    pub fn baseline() -> Self {
        HormoneVector(H_BASELINE)
    }

    pub fn get(&self, h: Hormone) -> f64 {
        self.0[h.index()]
    }

    pub fn to_list(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    pub fn to_map(&self) -> HashMap<String, f64> {
        Hormone::ALL
            .iter()
            .map(|h| (h.lower(), self.get(*h)))
            .collect()
    }

    fn delta(&self, other: &HormoneVector) -> HormoneVector {
        let mut out = [0.0; H];
        for i in 0..H {
            out[i] = self.0[i] - other.0[i];
        }
        HormoneVector(out)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Per-hormone sensitivity to the incoming stimulus (K in the spec notation).
pub type Personality = constants::Personality;

/// C1: maintains `H`, `H_prev`, and a history of snapshots since construction or reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HormoneSystem {
    h: HormoneVector,
    h_prev: HormoneVector,
    k: Personality,
    history: Vec<HormoneVector>,
}

impl HormoneSystem {
    pub fn new(personality: Personality) -> Self {
        let baseline = HormoneVector::baseline();
        HormoneSystem {
            h: baseline,
            h_prev: baseline,
            k: personality,
            history: vec![baseline],
        }
    }

    pub fn current(&self) -> HormoneVector {
        self.h
    }

    pub fn previous(&self) -> HormoneVector {
        self.h_prev
    }

    pub fn history(&self) -> &[HormoneVector] {
        &self.history
    }

    pub fn delta(&self) -> HormoneVector {
        self.h.delta(&self.h_prev)
    }

    /// Executes one turn of stimulus -> dynamic decay -> interaction -> soft clamp.
    ///
    /// `s` in [0,1], `d` in [0,1], `c` in [0.5,1.5]; callers are responsible for
    /// clamping inputs to nominal ranges before calling (see the orchestrator).
    pub fn update(&mut self, s: f64, d: f64, c: f64, delta_t: f64) -> HormoneVector {
        self.h_prev = self.h;

        let d_eff = d * NEGATIVITY_BIAS;
        let mut stimulus = [0.0; H];
        let mut decay = [0.0; H];

        for i in 0..H {
            stimulus[i] = P_POS[i] * s * c - P_NEG[i] * d_eff * c;

            let stress = (d * c).clamp(0.0, 1.5);
            let activation = (self.h.0[i] - H_BASELINE[i]).abs();
            let factor = (1.0 + HALF_LIFE_STRESS_SENS[i] * stress
                + HALF_LIFE_ACTIVATION_SENS[i] * activation)
                .clamp(HALF_LIFE_MIN_FACTOR, HALF_LIFE_MAX_FACTOR);
            let lambda = std::f64::consts::LN_2 / (HALF_LIFE_TURNS[i] * factor);
            decay[i] = (-lambda * delta_t).exp();
        }

        let mut next = [0.0; H];
        for i in 0..H {
            next[i] = self.h.0[i] * decay[i]
                + STIMULUS_GAIN * (self.k[i] * stimulus[i])
                + RECOVERY_RATE * (H_BASELINE[i] - self.h.0[i]);
        }

        let mut interacted = next;
        for i in 0..H {
            let mut acc = 0.0;
            for j in 0..H {
                acc += H_INTERACT[i][j] * next[j];
            }
            interacted[i] = next[i] + INTERACTION_STRENGTH * acc;
        }

        let mut clamped = [0.0; H];
        for i in 0..H {
            clamped[i] = sigmoid((interacted[i] - 0.5) * SOFT_CLAMP_SHARPNESS);
        }

        self.h = HormoneVector(clamped);
        self.history.push(self.h);
        self.h
    }

    pub fn reset(&mut self) {
        let baseline = HormoneVector::baseline();
        self.h = baseline;
        self.h_prev = baseline;
        self.history = vec![baseline];
    }

    pub fn personality(&self) -> Personality {
        self.k
    }

    pub fn load(&mut self, h: HormoneVector) {
        self.h_prev = h;
        self.h = h;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PERSONALITY_DEFAULT;

    #[test]
    fn update_keeps_hormones_in_open_unit_interval() {
        let mut sys = HormoneSystem::new(PERSONALITY_DEFAULT);
        for _ in 0..50 {
            let h = sys.update(0.9, 0.1, 1.2, 1.0);
            for v in h.0 {
                assert!(v > 0.0 && v < 1.0, "hormone escaped (0,1): {v}");
            }
        }
    }

    #[test]
    fn history_length_tracks_turn_count() {
        let mut sys = HormoneSystem::new(PERSONALITY_DEFAULT);
        assert_eq!(sys.history().len(), 1);
        for turn in 1..=5 {
            sys.update(0.5, 0.5, 1.0, 1.0);
            assert_eq!(sys.history().len(), turn + 1);
        }
    }

    #[test]
    fn zero_delta_t_skips_decay_but_keeps_stimulus() {
        let mut sys = HormoneSystem::new(PERSONALITY_DEFAULT);
        let h = sys.update(1.0, 0.0, 1.0, 0.0);
        assert!(h.get(Hormone::Dopamine) > 0.0);
    }

    #[test]
    fn fast_half_life_hormone_recovers_faster_than_slow_one() {
        let mut sys = HormoneSystem::new(PERSONALITY_DEFAULT);
        sys.update(1.0, 0.0, 1.5, 1.0);
        let h = sys.update(0.0, 0.0, 1.0, 12.0);
        let dopamine_dist = (h.get(Hormone::Dopamine) - H_BASELINE[Hormone::Dopamine.index()]).abs();
        let cortisol_dist = (h.get(Hormone::Cortisol) - H_BASELINE[Hormone::Cortisol.index()]).abs();
        assert!(dopamine_dist < cortisol_dist);
    }

    #[test]
    fn reset_restores_baseline_and_truncates_history() {
        let mut sys = HormoneSystem::new(PERSONALITY_DEFAULT);
        sys.update(0.8, 0.0, 1.0, 1.0);
        sys.reset();
        assert_eq!(sys.history().len(), 1);
        assert_eq!(sys.current(), HormoneVector::baseline());
    }
}
