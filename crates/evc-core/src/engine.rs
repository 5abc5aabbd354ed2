//! EVC Engine (C3): per-turn pipeline over the hormone system and emotion
//! mapper, plus trust update, exponential memory trace, and the turn log.

use std::collections::HashMap;

use evc_dynamics::{
    constants::{
        MEMORY_BETA, TRUST_DOWN_EXP, TRUST_GAMMA, TRUST_INITIAL, TRUST_LAMBDA, TRUST_MAX,
        TRUST_MIN, TRUST_UP_EXP,
    },
    EmotionMapper, Hormone, HormoneSystem, HormoneVector, Personality, PersonalityPreset,
};
use serde::{Deserialize, Serialize};

/// One immutable row recorded per processed turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResult {
    pub turn: u64,
    pub message: String,
    pub delta_t: f64,
    pub s: f64,
    pub d: f64,
    pub c: f64,
    pub hormones: HashMap<String, f64>,
    pub hormone_delta: HashMap<String, f64>,
    pub emotions: HashMap<String, f64>,
    pub dominant_emotion: String,
    pub dominant_score: f64,
    pub top_emotions: Vec<(String, f64)>,
    pub blend_label: String,
    pub memory: HashMap<String, f64>,
    pub trust: f64,
    pub output_intensity: f64,
}

/// Persistable snapshot of an engine's internal state, as produced by
/// [`EVCEngine::get_full_state`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineState {
    pub turn: u64,
    pub hormones: Vec<f64>,
    pub memory: Vec<f64>,
    pub trust: f64,
    pub name: String,
}

/// C3: one EVC instance. Either the bot's own state or, nested inside a
/// [`crate::tracker::UserEmotionTracker`], a model of the user's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EVCEngine {
    name: String,
    hormones: HormoneSystem,
    emotions: EmotionMapper,
    memory: HormoneVector,
    trust: f64,
    turn: u64,
    turn_log: Vec<TurnResult>,
}

impl EVCEngine {
    pub fn new(name: impl Into<String>, personality: Personality) -> Self {
        EVCEngine {
            name: name.into(),
            hormones: HormoneSystem::new(personality),
            emotions: EmotionMapper::new(),
            memory: HormoneVector::baseline(),
            trust: TRUST_INITIAL,
            turn: 0,
            turn_log: Vec::new(),
        }
    }

    pub fn with_preset(name: impl Into<String>, preset: PersonalityPreset) -> Self {
        Self::new(name, preset.vector())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn trust(&self) -> f64 {
        self.trust
    }

    pub fn hormone_history_len(&self) -> usize {
        self.hormones.history().len()
    }

    pub fn turn_log(&self) -> &[TurnResult] {
        &self.turn_log
    }

    pub fn last_turn(&self) -> Option<&TurnResult> {
        self.turn_log.last()
    }

    pub fn current_hormones(&self) -> HormoneVector {
        self.hormones.current()
    }

    /// Runs one full turn: stimulus -> decay -> interaction -> clamp (C1),
    /// projection (C2), memory trace, trust update, and result assembly.
    pub fn process_turn(&mut self, s: f64, d: f64, c: f64, delta_t: f64, message: &str) -> TurnResult {
        self.turn += 1;

        let h = self.hormones.update(s, d, c, delta_t);
        let delta = self.hormones.delta();
        let e = self.emotions.compute(h);

        self.memory = blend_memory(self.memory, h);

        let room_up = (TRUST_MAX - self.trust).max(0.0);
        let room_down = (self.trust - TRUST_MIN).max(0.0);
        let delta_up = TRUST_GAMMA * s * room_up.powf(TRUST_UP_EXP);
        let delta_down = TRUST_LAMBDA * d * room_down.powf(TRUST_DOWN_EXP);
        self.trust = (self.trust + delta_up - delta_down).clamp(TRUST_MIN, TRUST_MAX);

        let (dominant, dominant_score) = e.dominant();
        let output_intensity = self.trust * dominant_score;

        let result = TurnResult {
            turn: self.turn,
            message: message.to_string(),
            delta_t,
            s,
            d,
            c,
            hormones: h.to_map(),
            hormone_delta: delta.to_map(),
            emotions: e.to_map(),
            dominant_emotion: dominant.name().to_string(),
            dominant_score,
            top_emotions: e
                .top_n(3)
                .into_iter()
                .map(|(name, score)| (name.name().to_string(), score))
                .collect(),
            blend_label: e.blend_label(),
            memory: self.memory.to_map(),
            trust: self.trust,
            output_intensity,
        };

        self.turn_log.push(result.clone());
        result
    }

    pub fn reset(&mut self) {
        self.hormones.reset();
        self.memory = HormoneVector::baseline();
        self.trust = TRUST_INITIAL;
        self.turn = 0;
        self.turn_log.clear();
    }

    pub fn get_full_state(&self) -> EngineState {
        EngineState {
            turn: self.turn,
            hormones: self.current_hormones().to_list(),
            memory: self.memory.to_list(),
            trust: self.trust,
            name: self.name.clone(),
        }
    }

    /// Restores `H`, `memory`, `trust`, and `turn` from a snapshot. History is
    /// a derived log and is intentionally not reconstructed; `turn_log`
    /// restarts empty from the restored point.
    pub fn load_state(&mut self, state: &EngineState) {
        let mut arr = [0.0; evc_dynamics::H];
        for (i, v) in state.hormones.iter().take(evc_dynamics::H).enumerate() {
            arr[i] = *v;
        }
        let h = HormoneVector(arr);
        self.hormones.load(h);

        let mut mem = [0.0; evc_dynamics::H];
        for (i, v) in state.memory.iter().take(evc_dynamics::H).enumerate() {
            mem[i] = *v;
        }
        self.memory = HormoneVector(mem);
        self.trust = state.trust;
        self.turn = state.turn;
        self.turn_log.clear();
        self.name = state.name.clone();
    }
}

fn blend_memory(memory: HormoneVector, h: HormoneVector) -> HormoneVector {
    let mut out = [0.0; evc_dynamics::H];
    for i in 0..evc_dynamics::H {
        out[i] = MEMORY_BETA * memory.0[i] + (1.0 - MEMORY_BETA) * h.0[i];
    }
    HormoneVector(out)
}

pub fn hormone_key(h: Hormone) -> String {
    h.lower()
}

#[cfg(test)]
mod tests {
    use super::*;
    use evc_dynamics::constants::PERSONALITY_DEFAULT;

    #[test]
    fn s1_cold_start_positive() {
        let mut engine = EVCEngine::new("Bot", PERSONALITY_DEFAULT);
        let result = engine.process_turn(0.80, 0.0, 1.0, 1.0, "hi");
        assert_eq!(result.turn, 1);
        assert!(result.trust > 0.5);
        assert!(["Joy", "Love", "Excitement", "Serenity"].contains(&result.dominant_emotion.as_str()));
    }

    #[test]
    fn s2_sustained_stress_raises_cortisol_and_lowers_trust() {
        let mut engine = EVCEngine::new("Bot", PERSONALITY_DEFAULT);
        let mut prev_trust = engine.trust();
        let mut last = None;
        for _ in 0..20 {
            let r = engine.process_turn(0.0, 0.8, 1.2, 1.0, "bad day");
            assert!(r.trust < prev_trust);
            assert!(r.trust >= evc_dynamics::constants::TRUST_MIN);
            prev_trust = r.trust;
            last = Some(r);
        }
        let last = last.unwrap();
        let cortisol_baseline = evc_dynamics::constants::H_BASELINE[Hormone::Cortisol.index()];
        assert!(last.hormones["cortisol"] > cortisol_baseline);
        assert!(["Sadness", "Fear", "Anger"].contains(&last.dominant_emotion.as_str()));
    }

    #[test]
    fn s3_fast_hormone_decays_closer_to_baseline_than_slow_one() {
        let mut engine = EVCEngine::new("Bot", PERSONALITY_DEFAULT);
        engine.process_turn(1.0, 0.0, 1.5, 1.0, "spike");
        let r = engine.process_turn(0.0, 0.0, 1.0, 12.0, "quiet");
        let dopamine_baseline = evc_dynamics::constants::H_BASELINE[Hormone::Dopamine.index()];
        let cortisol_baseline = evc_dynamics::constants::H_BASELINE[Hormone::Cortisol.index()];
        let dopamine_dist = (r.hormones["dopamine"] - dopamine_baseline).abs();
        let cortisol_dist = (r.hormones["cortisol"] - cortisol_baseline).abs();
        assert!(dopamine_dist < cortisol_dist);
    }

    #[test]
    fn s4_trust_saturates_below_max_with_decreasing_increments() {
        let mut engine = EVCEngine::new("Bot", PERSONALITY_DEFAULT);
        let mut prev_delta = f64::INFINITY;
        for _ in 0..200 {
            let before = engine.trust();
            let r = engine.process_turn(1.0, 0.0, 1.0, 1.0, "great");
            assert!(r.trust < evc_dynamics::constants::TRUST_MAX);
            let delta = r.trust - before;
            assert!(delta <= prev_delta + 1e-9);
            prev_delta = delta;
        }
    }

    #[test]
    fn memory_trace_matches_closed_form() {
        let mut engine = EVCEngine::new("Bot", PERSONALITY_DEFAULT);
        let prev_memory = engine.memory.clone();
        let h = engine.hormones.clone();
        let r = engine.process_turn(0.5, 0.2, 1.0, 1.0, "msg");
        let mut h_arr = [0.0; evc_dynamics::H];
        for (i, v) in Hormone::ALL.iter().enumerate() {
            h_arr[i] = r.hormones[&v.lower()];
        }
        for i in 0..evc_dynamics::H {
            let expected = MEMORY_BETA * prev_memory.0[i] + (1.0 - MEMORY_BETA) * h_arr[i];
            assert!((r.memory[&Hormone::ALL[i].lower()] - expected).abs() < 1e-9);
        }
        let _ = h;
    }

    #[test]
    fn round_trip_state_reproduces_next_turn() {
        let mut a = EVCEngine::new("Bot", PERSONALITY_DEFAULT);
        for _ in 0..10 {
            a.process_turn(0.4, 0.3, 1.0, 1.0, "warmup");
        }
        let snapshot = a.get_full_state();

        let mut b = EVCEngine::new("Bot", PERSONALITY_DEFAULT);
        b.load_state(&snapshot);

        let ra = a.process_turn(0.6, 0.1, 1.0, 1.0, "same");
        let rb = b.process_turn(0.6, 0.1, 1.0, 1.0, "same");

        assert!((ra.trust - rb.trust).abs() < 1e-9);
        assert!((ra.dominant_score - rb.dominant_score).abs() < 1e-9);
        for hormone in Hormone::ALL {
            let key = hormone.lower();
            assert!((ra.hormones[&key] - rb.hormones[&key]).abs() < 1e-9);
        }
    }
}
