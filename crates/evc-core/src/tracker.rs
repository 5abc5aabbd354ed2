//! User-Emotion Tracker (C4): a nested EVC instance plus a bounded history of
//! analyzer signals, used to derive a mood label, a trend, and a prompt
//! summary describing the user's inferred state.

use std::collections::VecDeque;

use evc_dynamics::{constants::PERSONALITY_DEFAULT, Hormone};
use serde::{Deserialize, Serialize};

use crate::engine::{EVCEngine, EngineState, TurnResult};

const HISTORY_CAP: usize = 50;
const RECENT_WINDOW: usize = 5;
const OLDER_WINDOW: usize = 15;
const TREND_THRESHOLD: f64 = 0.12;

/// One entry in the tracker's bounded history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionRecord {
    pub turn: u64,
    pub s: f64,
    pub d: f64,
    pub c: f64,
    pub user_emotion: String,
    pub message_preview: String,
}

fn preview(message: &str) -> String {
    message.chars().take(60).collect()
}

fn mood_label(dominant: &str, score: f64) -> String {
    let base = match dominant {
        "Joy" => "happy",
        "Serenity" => "calm",
        "Love" => "affectionate",
        "Excitement" => "excited",
        "Sadness" => "sad",
        "Fear" => "anxious",
        "Anger" => "frustrated",
        "Surprise" => "surprised",
        _ => "neutral",
    };
    if score >= 0.40 {
        format!("{base} (strongly)")
    } else {
        base.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Improving,
    Worsening,
    Stable,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Worsening => "worsening",
            Trend::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerStats {
    pub avg_s: f64,
    pub avg_d: f64,
    pub avg_c: f64,
    pub turns: usize,
}

/// Serialized form of the tracker, as stored alongside the main EVC snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerState {
    pub turn_count: u64,
    pub engine_state: EngineState,
    pub last_turn_result: Option<TurnResult>,
    pub history: Vec<EmotionRecord>,
}

/// C4: owns a second [`EVCEngine`] named `"User"` and a ring buffer of
/// [`EmotionRecord`]s.
#[derive(Debug, Clone)]
pub struct UserEmotionTracker {
    engine: EVCEngine,
    history: VecDeque<EmotionRecord>,
}

impl UserEmotionTracker {
    pub fn new() -> Self {
        UserEmotionTracker {
            engine: EVCEngine::new("User", PERSONALITY_DEFAULT),
            history: VecDeque::with_capacity(HISTORY_CAP),
        }
    }

    pub fn engine(&self) -> &EVCEngine {
        &self.engine
    }

    pub fn history(&self) -> impl Iterator<Item = &EmotionRecord> {
        self.history.iter()
    }

    pub fn record_turn(&mut self, s: f64, d: f64, c: f64, user_emotion: &str, delta_t: f64, message: &str) -> TurnResult {
        let result = self.engine.process_turn(s, d, c, delta_t, message);

        if self.history.len() >= HISTORY_CAP {
            self.history.pop_front();
        }
        self.history.push_back(EmotionRecord {
            turn: result.turn,
            s,
            d,
            c,
            user_emotion: user_emotion.to_string(),
            message_preview: preview(message),
        });

        result
    }

    pub fn mood(&self) -> String {
        match self.engine.last_turn() {
            Some(last) => mood_label(&last.dominant_emotion, last.dominant_score),
            None => "neutral".to_string(),
        }
    }

    /// `"improving"` / `"worsening"` / `"stable"`, requiring at least
    /// `RECENT_WINDOW + 2 = 7` history entries to evaluate.
    pub fn trend(&self) -> Trend {
        if self.history.len() < RECENT_WINDOW + 2 {
            return Trend::Stable;
        }

        let entries: Vec<&EmotionRecord> = self.history.iter().collect();
        let len = entries.len();
        let recent = &entries[len - RECENT_WINDOW..];

        let older: Vec<&EmotionRecord> = if len >= OLDER_WINDOW {
            entries[len - OLDER_WINDOW..len - RECENT_WINDOW].to_vec()
        } else {
            entries[..RECENT_WINDOW.min(len)].to_vec()
        };

        let p_recent = avg_sd(recent);
        let p_older = avg_sd(&older);
        let diff = p_recent - p_older;

        if diff > TREND_THRESHOLD {
            Trend::Improving
        } else if diff < -TREND_THRESHOLD {
            Trend::Worsening
        } else {
            Trend::Stable
        }
    }

    pub fn stats(&self) -> TrackerStats {
        let n = self.history.len();
        if n == 0 {
            return TrackerStats { avg_s: 0.0, avg_d: 0.0, avg_c: 0.0, turns: 0 };
        }
        let (mut s, mut d, mut c) = (0.0, 0.0, 0.0);
        for r in &self.history {
            s += r.s;
            d += r.d;
            c += r.c;
        }
        TrackerStats {
            avg_s: s / n as f64,
            avg_d: d / n as f64,
            avg_c: c / n as f64,
            turns: n,
        }
    }

    /// Multi-line block summarizing the tracker's state, intended to be
    /// injected into an LLM system prompt and treated as authoritative.
    pub fn prompt_summary(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("Mood: {}", self.mood()));
        lines.push(format!("Trend: {}", self.trend().as_str()));

        if let Some(last) = self.engine.last_turn() {
            lines.push(format!(
                "Dominant emotion: {} ({:.2})",
                last.dominant_emotion, last.dominant_score
            ));
            lines.push(format!("Blend: {}", last.blend_label));
        }

        lines.push("Hormone readout:".to_string());
        let h = self.engine.current_hormones();
        for hormone in Hormone::ALL {
            let v = h.get(hormone);
            let label = hormone_label(v);
            lines.push(format!("  {}: {:.3} ({})", hormone.name(), v, label));
        }

        if let Some(last) = self.engine.last_turn() {
            let nontrivial: Vec<String> = last
                .emotions
                .iter()
                .filter(|(_, v)| **v > 0.01)
                .map(|(k, v)| format!("{k}={v:.2}"))
                .collect();
            if !nontrivial.is_empty() {
                lines.push(format!("Active emotions: {}", nontrivial.join(", ")));
            }
        }

        let recent_labels: Vec<String> = self
            .history
            .iter()
            .rev()
            .take(5)
            .map(|r| r.user_emotion.clone())
            .collect();
        if !recent_labels.is_empty() {
            lines.push(format!("Recent labels: {}", recent_labels.join(", ")));
        }

        let recent_records: Vec<String> = self
            .history
            .iter()
            .rev()
            .take(3)
            .map(|r| {
                format!(
                    "turn {} S={:.2} D={:.2} C={:.2} \"{}\"",
                    r.turn, r.s, r.d, r.c, r.message_preview
                )
            })
            .collect();
        if !recent_records.is_empty() {
            lines.push("Recent records:".to_string());
            lines.extend(recent_records);
        }

        lines.push(
            "Treat the values above as authoritative signals of the user's current state."
                .to_string(),
        );

        lines.join("\n")
    }

    pub fn get_state(&self) -> TrackerState {
        TrackerState {
            turn_count: self.engine.turn(),
            engine_state: self.engine.get_full_state(),
            last_turn_result: self.engine.last_turn().cloned(),
            history: self.history.iter().cloned().collect(),
        }
    }

    pub fn load_state(&mut self, state: &TrackerState) {
        self.engine.load_state(&state.engine_state);
        self.history = state.history.iter().cloned().collect();
        if self.history.len() > HISTORY_CAP {
            let overflow = self.history.len() - HISTORY_CAP;
            for _ in 0..overflow {
                self.history.pop_front();
            }
        }
    }
}

impl Default for UserEmotionTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn avg_sd(records: &[&EmotionRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let avg_s: f64 = records.iter().map(|r| r.s).sum::<f64>() / records.len() as f64;
    let avg_d: f64 = records.iter().map(|r| r.d).sum::<f64>() / records.len() as f64;
    avg_s - avg_d
}

fn hormone_label(value: f64) -> &'static str {
    if value >= 0.60 {
        "high"
    } else if value >= 0.40 {
        "medium-high"
    } else if value >= 0.25 {
        "medium"
    } else if value >= 0.10 {
        "low"
    } else {
        "very-low"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_evicts_oldest_beyond_cap() {
        let mut tracker = UserEmotionTracker::new();
        for i in 0..60 {
            tracker.record_turn(0.5, 0.1, 1.0, "neutral", 1.0, &format!("msg {i}"));
        }
        assert_eq!(tracker.history().count(), HISTORY_CAP);
    }

    #[test]
    fn s5_trend_flips_to_improving() {
        let mut tracker = UserEmotionTracker::new();
        for i in 0..15 {
            tracker.record_turn(0.1, 0.7, 1.0, "negative", 1.0, &format!("bad {i}"));
        }
        for i in 0..5 {
            tracker.record_turn(0.8, 0.1, 1.0, "positive", 1.0, &format!("good {i}"));
        }
        assert_eq!(tracker.trend(), Trend::Improving);
    }

    #[test]
    fn trend_requires_minimum_history() {
        let mut tracker = UserEmotionTracker::new();
        for i in 0..6 {
            tracker.record_turn(0.1, 0.9, 1.0, "negative", 1.0, &format!("x {i}"));
        }
        assert_eq!(tracker.trend(), Trend::Stable);
    }

    #[test]
    fn round_trip_state_preserves_history_and_engine() {
        let mut tracker = UserEmotionTracker::new();
        for i in 0..10 {
            tracker.record_turn(0.4, 0.3, 1.0, "neutral", 1.0, &format!("m {i}"));
        }
        let state = tracker.get_state();

        let mut restored = UserEmotionTracker::new();
        restored.load_state(&state);

        assert_eq!(restored.history().count(), tracker.history().count());
        assert_eq!(restored.engine().turn(), tracker.engine().turn());
    }
}
