//! Turn Orchestrator (C6): sequences session resolution, elapsed-time
//! scaling, context gathering, the analyzer call, the tracker and engine
//! steps, prompt assembly, the LLM reply, and best-effort persistence for
//! one chat turn.

use chrono::Utc;
use evc_core::{ScratchMessage, TurnResult};
use evc_db::{ConversationDto, EvcSnapshotDto, MessageDto, UserFactDto};
use evc_memory::truncate_utf8;
use uuid::Uuid;

use crate::{prompt::assemble_system_prompt, state::AppState};

const MIN_DELTA_T: f64 = 0.05;
const MAX_DELTA_T: f64 = 12.0;
const HISTORY_HYDRATE_LIMIT: i64 = 20;
const FACT_CONFIDENCE_THRESHOLD: f64 = 0.5;
const MAX_CHAT_HISTORY: usize = 30;
const PROFILE_CAP: usize = 1500;
const MEMORY_CAP: usize = 2000;
const SKILL_CAP: usize = 1000;
const CONVERSATION_TITLE_CAP: usize = 50;

/// The caller's identity, when a valid session token was presented.
pub struct AuthedUser {
    pub user_id: String,
    pub is_guest: bool,
}

/// Everything the `/api/chat` handler needs to assemble its response.
pub struct TurnOutcome {
    pub reply: String,
    pub user_emotion: String,
    pub s: f64,
    pub d: f64,
    pub c: f64,
    pub delta_t: f64,
    pub bot_state: TurnResult,
    pub matched_skill: Option<String>,
    pub memory_used: bool,
    pub learned_facts: Vec<(String, String)>,
    pub mood_current: String,
    pub mood_trend: String,
    pub stats_avg_s: f64,
    pub stats_avg_d: f64,
    pub stats_avg_c: f64,
    pub stats_turns: usize,
}

pub async fn run_turn(
    state: &AppState,
    session_id: &str,
    message: &str,
    user: Option<&AuthedUser>,
) -> TurnOutcome {
    let handle = state.sessions.get_or_create(session_id).await;
    let mut session = handle.lock().await;

    let resume_id = session_id.strip_prefix("conv_");
    let authed_non_guest = user.filter(|u| !u.is_guest);

    // 1. Session resolution: hydrate a restored conversation's EVC + tracker
    // on the first turn this process has seen this session.
    if !session.scratch.restored {
        if let (Some(conv_id), Some(_)) = (resume_id, authed_non_guest) {
            if let Ok(Some(snapshot)) = state.persistence.get_evc_state(conv_id).await {
                if let Ok(engine_state) = serde_json::from_value(snapshot.evc_blob.clone()) {
                    session.engine.load_state(&engine_state);
                }
                if let Some(tracker_blob) = snapshot.evc_blob.get("user_emotion_tracker") {
                    if let Ok(tracker_state) = serde_json::from_value(tracker_blob.clone()) {
                        session.tracker.load_state(&tracker_state);
                    }
                }
                session.scratch.last_turn_ts = snapshot.last_turn_ts;
            }
            session.scratch.conversation_id = Some(conv_id.to_string());
        }
        session.scratch.restored = true;
    }

    // 2. Elapsed-time scaling.
    let now = Utc::now();
    let last = session.scratch.last_turn_ts;
    session.scratch.last_turn_ts = Some(now);
    let delta_t = match last {
        None => 1.0,
        Some(last) => {
            let elapsed_secs = (now - last).num_milliseconds() as f64 / 1000.0;
            (elapsed_secs / state.turn_seconds()).clamp(MIN_DELTA_T, MAX_DELTA_T)
        }
    };

    // 3. Context gathering.
    let note_context = state.note_store.context_for(session_id, message).await;
    let skill_match = state.skill_matcher.match_skill(message);

    let mut profile = note_context.profile_blob;
    let mut memory_context = note_context.excerpt;
    if let Some(user) = authed_non_guest {
        if let Ok(profile_ctx) = state.memory_adapter.context_for(&user.user_id, PROFILE_CAP).await {
            if !profile_ctx.profile.is_empty() {
                profile = if profile.is_empty() {
                    profile_ctx.profile
                } else {
                    format!("{}\n\n{profile}", profile_ctx.profile)
                };
            }
            if !profile_ctx.facts_block.is_empty() {
                memory_context = if memory_context.is_empty() {
                    profile_ctx.facts_block
                } else {
                    format!("{}\n\n{memory_context}", profile_ctx.facts_block)
                };
            }
        }
    }
    let profile = truncate_utf8(&profile, PROFILE_CAP);
    let memory_context = truncate_utf8(&memory_context, MEMORY_CAP);
    let skill_context = skill_match
        .as_ref()
        .map(|m| truncate_utf8(&m.context, SKILL_CAP))
        .unwrap_or_default();
    let memory_used = !memory_context.is_empty();

    // 4. Analyzer (always resolves, falling back to the heuristic internally).
    let analyzed = state.chat_bridge.analyze_message(message).await;
    let s = analyzed.signals.s.clamp(0.0, 1.0);
    let d = analyzed.signals.d.clamp(0.0, 1.0);
    let c = analyzed.signals.c.clamp(0.5, 1.5);

    // 5. Tracker step.
    session.tracker.record_turn(s, d, c, &analyzed.user_emotion, delta_t, message);

    // 6. Engine step.
    let bot_turn = session.engine.process_turn(s, d, c, delta_t, message);

    // 7. History hydration, first turn of a restored conversation only.
    if session.scratch.chat_history.is_empty() {
        if let (Some(conv_id), Some(_)) = (resume_id, authed_non_guest) {
            if let Ok(rows) = state.persistence.get_messages(conv_id, HISTORY_HYDRATE_LIMIT).await {
                session.scratch.chat_history = rows
                    .into_iter()
                    .map(|m| ScratchMessage { role: m.role, content: m.content })
                    .collect();
            }
        }
    }

    // 8. Prompt assembly and LLM reply.
    let tracker_summary = session.tracker.prompt_summary();
    let history_pairs: Vec<(String, String)> = session
        .scratch
        .chat_history
        .iter()
        .map(|m| (m.role.clone(), m.content.clone()))
        .collect();
    let system_prompt = assemble_system_prompt(
        &bot_turn,
        &tracker_summary,
        &analyzed.user_emotion,
        &profile,
        &memory_context,
        &skill_context,
        &history_pairs,
        message,
    );
    let reply = state.chat_bridge.generate_reply(&system_prompt, message).await;

    session.scratch.chat_history.push(ScratchMessage {
        role: "user".to_string(),
        content: message.to_string(),
    });
    session.scratch.chat_history.push(ScratchMessage {
        role: "assistant".to_string(),
        content: reply.clone(),
    });
    if session.scratch.chat_history.len() > MAX_CHAT_HISTORY {
        let overflow = session.scratch.chat_history.len() - MAX_CHAT_HISTORY;
        session.scratch.chat_history.drain(0..overflow);
    }
    session.scratch.last_reply = Some(reply.clone());

    // 9. Persistence, best-effort, authenticated non-guest users only.
    let mut learned_facts = Vec::new();
    if let Some(user) = authed_non_guest {
        let conv_id = resolve_conversation_id(state, &mut session.scratch, resume_id, user, message).await;

        let _ = state
            .persistence
            .create_message(MessageDto {
                id: Uuid::new_v4().to_string(),
                conversation_id: conv_id.clone(),
                role: "user".to_string(),
                content: message.to_string(),
                signals_s: Some(s),
                signals_d: Some(d),
                signals_c: Some(c),
                dominant_emotion: None,
                trust_level: None,
                metadata: "{}".to_string(),
                created_at: None,
            })
            .await;

        let metadata =
            serde_json::json!({ "matched_skill": skill_match.as_ref().map(|m| &m.name) }).to_string();
        let _ = state
            .persistence
            .create_message(MessageDto {
                id: Uuid::new_v4().to_string(),
                conversation_id: conv_id.clone(),
                role: "assistant".to_string(),
                content: reply.clone(),
                signals_s: None,
                signals_d: None,
                signals_c: None,
                dominant_emotion: Some(bot_turn.dominant_emotion.clone()),
                trust_level: Some(bot_turn.trust),
                metadata,
                created_at: None,
            })
            .await;

        let mut evc_blob =
            serde_json::to_value(session.engine.get_full_state()).unwrap_or(serde_json::Value::Null);
        if let serde_json::Value::Object(ref mut map) = evc_blob {
            map.insert(
                "user_emotion_tracker".to_string(),
                serde_json::to_value(session.tracker.get_state()).unwrap_or(serde_json::Value::Null),
            );
        }
        let _ = state
            .persistence
            .save_evc_state(EvcSnapshotDto {
                conversation_id: conv_id,
                evc_blob,
                last_turn_ts: Some(now),
            })
            .await;

        for fact in state.chat_bridge.extract_facts(message).await {
            if fact.confidence < FACT_CONFIDENCE_THRESHOLD {
                continue;
            }
            let upsert = state
                .persistence
                .upsert_fact(UserFactDto {
                    id: Uuid::new_v4().to_string(),
                    user_id: user.user_id.clone(),
                    category: fact.category,
                    key: fact.key.clone(),
                    value: fact.value.clone(),
                    confidence: fact.confidence,
                    source: "conversation".to_string(),
                    first_mentioned: None,
                    last_confirmed: None,
                    mention_count: 1,
                    is_active: true,
                })
                .await;
            if upsert.is_ok() {
                learned_facts.push((fact.key, fact.value));
            }
        }
    }

    let stats = session.tracker.stats();
    TurnOutcome {
        reply,
        user_emotion: analyzed.user_emotion,
        s,
        d,
        c,
        delta_t,
        bot_state: bot_turn,
        matched_skill: skill_match.map(|m| m.name),
        memory_used,
        learned_facts,
        mood_current: session.tracker.mood(),
        mood_trend: session.tracker.trend().as_str().to_string(),
        stats_avg_s: stats.avg_s,
        stats_avg_d: stats.avg_d,
        stats_avg_c: stats.avg_c,
        stats_turns: stats.turns,
    }
}

/// Finds or creates the conversation this turn belongs to, caching the
/// result in scratch so later turns on the same session skip the lookup.
async fn resolve_conversation_id(
    state: &AppState,
    scratch: &mut evc_core::Scratch,
    resume_id: Option<&str>,
    user: &AuthedUser,
    message: &str,
) -> String {
    if let Some(id) = &scratch.conversation_id {
        return id.clone();
    }

    if let Some(resume_id) = resume_id {
        if let Ok(Some(existing)) = state.persistence.get_conversation(resume_id).await {
            if existing.user_id == user.user_id {
                scratch.conversation_id = Some(resume_id.to_string());
                return resume_id.to_string();
            }
        }
    }

    let new_id = Uuid::new_v4().to_string();
    let title = truncate_utf8(message, CONVERSATION_TITLE_CAP);
    let _ = state
        .persistence
        .create_conversation(ConversationDto {
            id: new_id.clone(),
            user_id: user.user_id.clone(),
            title,
            platform: "web".to_string(),
            is_active: true,
            created_at: None,
            updated_at: None,
        })
        .await;
    scratch.conversation_id = Some(new_id.clone());
    new_id
}
