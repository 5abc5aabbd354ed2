//! Prompt Assembler (C8): builds the fixed-template LLM system prompt from
//! the bot's EVC snapshot, the user tracker summary, and gathered context.
//!
//! No literal prompt template text is recoverable from the source material
//! for this component (unlike `groq_bridge.py`'s bridge-internal prompts,
//! which are ported verbatim in `evc-llm`), so the template and the
//! per-emotion expression guide below are authored here, grounded in the
//! qualitative emotion semantics the specification fixes (dominant emotion
//! name, blend label, trust fraction, hormone high/low summary).

use evc_core::TurnResult;

const RECENT_HISTORY_LIMIT: usize = 20;

/// Canonical one-line acting instruction per dominant emotion.
fn expression_guide(dominant_emotion: &str) -> &'static str {
    match dominant_emotion {
        "Joy" => "Respond warmly and with light energy; celebrate small wins without overdoing it.",
        "Serenity" => "Respond calmly and unhurried; favor short, settled sentences.",
        "Love" => "Respond with warmth and attentiveness; make the user feel specifically seen.",
        "Excitement" => "Respond with energy and forward momentum; match enthusiasm without rushing past the user's point.",
        "Sadness" => "Respond gently and slow the pace; acknowledge difficulty before offering anything else.",
        "Fear" => "Respond steadily and reassuringly; avoid amplifying uncertainty.",
        "Anger" => "Respond evenly and without defensiveness; de-escalate rather than mirror the tone.",
        "Surprise" => "Respond with open curiosity; invite the user to say more before concluding anything.",
        _ => "Respond naturally, tracking the user's tone.",
    }
}

fn hormone_summary(hormones: &std::collections::HashMap<String, f64>) -> String {
    let mut high: Vec<&str> = Vec::new();
    let mut low: Vec<&str> = Vec::new();
    for (name, value) in hormones {
        if *value > 0.55 {
            high.push(name.as_str());
        } else if *value < 0.25 {
            low.push(name.as_str());
        }
    }
    high.sort_unstable();
    low.sort_unstable();

    if high.is_empty() && low.is_empty() {
        return "Hormones: balanced.".to_string();
    }
    let mut lines = Vec::new();
    for name in high {
        lines.push(format!("{name}: High"));
    }
    for name in low {
        lines.push(format!("{name}: Low"));
    }
    lines.join("\n")
}

/// Assembles the system prompt given the bot's latest turn, the user-emotion
/// tracker's prompt summary, the user-facing emotion label, gathered
/// context, and a bounded chat history suffix.
#[allow(clippy::too_many_arguments)]
pub fn assemble_system_prompt(
    bot_turn: &TurnResult,
    tracker_summary: &str,
    user_emotion: &str,
    profile: &str,
    memory_context: &str,
    skill_context: &str,
    history: &[(String, String)],
    current_message: &str,
) -> String {
    let trust_pct = bot_turn.trust * 100.0;

    let mut prompt = format!(
        "You are a conversational companion whose tone is conditioned by an internal \
         affective state. Do not mention hormones, emotions, or trust scores explicitly; \
         let them shape your tone instead.\n\n\
         Bot state:\n\
         - Dominant emotion: {} ({:.2})\n\
         - Blend: {}\n\
         - Trust: {:.1}%\n\
         - User's apparent emotion: {}\n\n\
         Style guidance: {}\n\n\
         {}\n\n\
         User tracker summary:\n{}",
        bot_turn.dominant_emotion,
        bot_turn.dominant_score,
        bot_turn.blend_label,
        trust_pct,
        user_emotion,
        expression_guide(&bot_turn.dominant_emotion),
        hormone_summary(&bot_turn.hormones),
        tracker_summary,
    );

    if !profile.is_empty() {
        prompt.push_str(&format!("\n\n[USER PROFILE]\n{profile}"));
    }
    if !memory_context.is_empty() {
        prompt.push_str(&format!("\n\n[MEMORY CONTEXT]\n{memory_context}"));
    }
    if !skill_context.is_empty() {
        prompt.push_str(&format!("\n\n[SKILL CONTEXT]\n{skill_context}"));
    }

    let tail = history
        .iter()
        .rev()
        .take(RECENT_HISTORY_LIMIT)
        .rev()
        .map(|(role, content)| format!("{role}: {content}"))
        .collect::<Vec<_>>()
        .join("\n");
    if !tail.is_empty() {
        prompt.push_str(&format!("\n\n[RECENT HISTORY]\n{tail}"));
    }
    prompt.push_str(&format!("\n\nuser: {current_message}"));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use evc_core::EVCEngine;
    use evc_dynamics::constants::PERSONALITY_DEFAULT;

    #[test]
    fn prompt_includes_dominant_emotion_and_trust() {
        let mut engine = EVCEngine::new("Bot", PERSONALITY_DEFAULT);
        let turn = engine.process_turn(0.8, 0.0, 1.0, 1.0, "hi");
        let prompt = assemble_system_prompt(&turn, "Mood: happy", "neutral-positive", "", "", "", &[], "hi");
        assert!(prompt.contains(&turn.dominant_emotion));
        assert!(prompt.contains("Trust:"));
    }

    #[test]
    fn history_is_capped_to_the_last_twenty_entries() {
        let mut engine = EVCEngine::new("Bot", PERSONALITY_DEFAULT);
        let turn = engine.process_turn(0.5, 0.1, 1.0, 1.0, "hi");
        let history: Vec<(String, String)> = (0..30)
            .map(|i| ("user".to_string(), format!("msg {i}")))
            .collect();
        let prompt = assemble_system_prompt(&turn, "", "neutral", "", "", "", &history, "latest");
        assert!(!prompt.contains("msg 0\n"));
        assert!(prompt.contains("msg 29"));
    }
}
