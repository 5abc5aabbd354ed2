//! Emotion Mapper (C2): linear hormone-to-emotion projection with ReLU and
//! L1 normalization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{E, W_MATRIX};
use crate::hormones::HormoneVector;
use crate::names::Emotion;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionVector(pub [f64; E]);

impl EmotionVector {
    pub fn uniform() -> Self {
        EmotionVector([1.0 / E as f64; E])
    }

    pub fn get(&self, e: Emotion) -> f64 {
        self.0[e.index()]
    }

    pub fn to_map(&self) -> HashMap<String, f64> {
        Emotion::ALL
            .iter()
            .map(|e| (e.lower(), self.get(*e)))
            .collect()
    }

    /// `(name, score)` of the highest-scoring emotion; ties favor the lowest index.
    pub fn dominant(&self) -> (Emotion, f64) {
        let mut best = 0usize;
        for i in 1..E {
            if self.0[i] > self.0[best] {
                best = i;
            }
        }
        (Emotion::from_index(best), self.0[best])
    }

    /// The `n` largest entries, descending, ties broken by ascending index.
    pub fn top_n(&self, n: usize) -> Vec<(Emotion, f64)> {
        let mut ranked: Vec<(Emotion, f64)> = Emotion::ALL
            .iter()
            .map(|e| (*e, self.get(*e)))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap()
                .then(a.0.index().cmp(&b.0.index()))
        });
        ranked.truncate(n);
        ranked
    }

    /// `"Name1(0.dd) + Name2(0.dd) + Name3(0.dd)"` of the top-3 emotions.
    pub fn blend_label(&self) -> String {
        self.top_n(3)
            .into_iter()
            .map(|(e, score)| format!("{}({:.2})", e.name(), score))
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

/// C2: projects a hormone vector into a probability-like emotion distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionMapper {
    history: Vec<EmotionVector>,
}

impl EmotionMapper {
    pub fn new() -> Self {
        EmotionMapper { history: Vec::new() }
    }

    pub fn history(&self) -> &[EmotionVector] {
        &self.history
    }

    pub fn compute(&mut self, h: HormoneVector) -> EmotionVector {
        let mut raw = [0.0; E];
        for (i, row) in W_MATRIX.iter().enumerate() {
            let mut acc = 0.0;
            for j in 0..row.len() {
                acc += row[j] * h.0[j];
            }
            raw[i] = acc.max(0.0);
        }

        let sum: f64 = raw.iter().sum();
        let e = if sum > 0.0 {
            let mut normalized = [0.0; E];
            for i in 0..E {
                normalized[i] = raw[i] / sum;
            }
            EmotionVector(normalized)
        } else {
            EmotionVector::uniform()
        };

        self.history.push(e);
        e
    }
}

impl Default for EmotionMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hormones::HormoneVector;

    #[test]
    fn compute_sums_to_one_when_any_component_positive() {
        let mut mapper = EmotionMapper::new();
        let e = mapper.compute(HormoneVector::baseline());
        let sum: f64 = e.0.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn compute_returns_uniform_when_all_zero() {
        let mut mapper = EmotionMapper::new();
        let e = mapper.compute(HormoneVector([0.0; E]));
        for v in e.0 {
            assert!((v - 1.0 / E as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn dominant_picks_lowest_index_on_tie() {
        let e = EmotionVector([0.5, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(e.dominant().0, Emotion::Joy);
    }

    #[test]
    fn blend_label_formats_top_three() {
        let e = EmotionVector([0.5, 0.3, 0.2, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(e.blend_label(), "Joy(0.50) + Serenity(0.30) + Love(0.20)");
    }
}
