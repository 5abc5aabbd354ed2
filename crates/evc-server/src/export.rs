//! CSV and plain-text renderers for a session's turn log. Out of core scope
//! per the specification (only the formats are contractual); grounded on the
//! `/api/export/csv` and `/api/export/txt` handlers of the original backend.

use evc_core::TurnResult;
use evc_dynamics::{Emotion, Hormone};

/// Renders the full turn log as CSV with the fixed column order the
/// specification requires: turn/message/delta_t/S/D/C/trust/dominant fields,
/// then every hormone, every emotion, then every hormone delta.
pub fn render_csv(turns: &[TurnResult]) -> String {
    let mut header = vec![
        "turn".to_string(),
        "message".to_string(),
        "delta_t".to_string(),
        "S".to_string(),
        "D".to_string(),
        "C".to_string(),
        "trust".to_string(),
        "dominant_emotion".to_string(),
        "dominant_score".to_string(),
    ];
    for hormone in Hormone::ALL {
        header.push(format!("h_{}", hormone.lower()));
    }
    for emotion in Emotion::ALL {
        header.push(format!("e_{}", emotion.lower()));
    }
    for hormone in Hormone::ALL {
        header.push(format!("dh_{}", hormone.lower()));
    }

    let mut out = header.join(",");
    out.push('\n');

    for turn in turns {
        let mut row = vec![
            turn.turn.to_string(),
            csv_escape(&turn.message),
            format!("{:.4}", turn.delta_t),
            format!("{:.4}", turn.s),
            format!("{:.4}", turn.d),
            format!("{:.4}", turn.c),
            format!("{:.4}", turn.trust),
            turn.dominant_emotion.clone(),
            format!("{:.4}", turn.dominant_score),
        ];
        for hormone in Hormone::ALL {
            row.push(format!("{:.4}", turn.hormones.get(&hormone.lower()).copied().unwrap_or(0.0)));
        }
        for emotion in Emotion::ALL {
            row.push(format!("{:.4}", turn.emotions.get(&emotion.lower()).copied().unwrap_or(0.0)));
        }
        for hormone in Hormone::ALL {
            row.push(format!(
                "{:.4}",
                turn.hormone_delta.get(&hormone.lower()).copied().unwrap_or(0.0)
            ));
        }
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Renders the full turn log as labeled plain-text blocks, one per turn.
pub fn render_txt(session_id: &str, turns: &[TurnResult]) -> String {
    let mut out = format!("EVC Export — Session: {session_id}\n");
    out.push_str(&"=".repeat(60));
    out.push('\n');

    for turn in turns {
        out.push_str(&format!("\nTurn {}\n", turn.turn));
        out.push_str(&format!("Message: {}\n", turn.message));
        out.push_str(&format!("Delta_t: {:.4}\n", turn.delta_t));
        out.push_str(&format!(
            "Signals (S={:.3} D={:.3} C={:.3})\n",
            turn.s, turn.d, turn.c
        ));
        out.push_str(&format!("Emotion: {}\n", turn.blend_label));
        out.push_str(&format!(
            "Dominant: {} ({:.3})\n",
            turn.dominant_emotion, turn.dominant_score
        ));
        out.push_str(&format!("Trust: {:.4}\n", turn.trust));

        out.push_str("Hormones:\n");
        for hormone in Hormone::ALL {
            let v = turn.hormones.get(&hormone.lower()).copied().unwrap_or(0.0);
            out.push_str(&format!("  {}: {v:.4}\n", hormone.name()));
        }

        out.push_str("Emotions:\n");
        for emotion in Emotion::ALL {
            let v = turn.emotions.get(&emotion.lower()).copied().unwrap_or(0.0);
            out.push_str(&format!("  {}: {v:.4}\n", emotion.name()));
        }

        out.push_str("H Delta:\n");
        for hormone in Hormone::ALL {
            let v = turn.hormone_delta.get(&hormone.lower()).copied().unwrap_or(0.0);
            out.push_str(&format!("  {}: {v:.4}\n", hormone.name()));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use evc_core::EVCEngine;
    use evc_dynamics::constants::PERSONALITY_DEFAULT;

    fn sample_turns() -> Vec<TurnResult> {
        let mut engine = EVCEngine::new("Bot", PERSONALITY_DEFAULT);
        vec![
            engine.process_turn(0.8, 0.0, 1.0, 1.0, "hi"),
            engine.process_turn(0.5, 0.2, 1.0, 1.0, "hello, again"),
        ]
    }

    #[test]
    fn csv_header_has_the_contractual_column_order() {
        let csv = render_csv(&[]);
        let header = csv.lines().next().unwrap();
        assert!(header.starts_with("turn,message,delta_t,S,D,C,trust,dominant_emotion,dominant_score"));
        assert!(header.contains("h_dopamine"));
        assert!(header.contains("e_joy"));
        assert!(header.contains("dh_norepinephrine"));
    }

    #[test]
    fn csv_rows_match_turn_count() {
        let turns = sample_turns();
        let csv = render_csv(&turns);
        assert_eq!(csv.lines().count(), turns.len() + 1);
    }

    #[test]
    fn csv_escapes_commas_in_message() {
        let csv = csv_escape("hello, world");
        assert_eq!(csv, "\"hello, world\"");
    }

    #[test]
    fn txt_includes_every_turn_and_section_label() {
        let turns = sample_turns();
        let txt = render_txt("s1", &turns);
        assert!(txt.contains("Turn 1"));
        assert!(txt.contains("Turn 2"));
        assert!(txt.contains("Dominant:"));
        assert!(txt.contains("H Delta:"));
    }
}
