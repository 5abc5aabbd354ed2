//! Data-transfer objects exchanged with the persistence backend. Field names
//! follow the wire/storage contract of the original system rather than any
//! internal convenience naming, since these rows are also the export format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserDto {
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub display_name: String,
    pub avatar_url: String,
    pub password_hash: Option<String>,
    pub auth_provider: String,
    pub is_guest: bool,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformIdentityDto {
    pub id: String,
    pub user_id: String,
    pub platform: String,
    pub platform_uid: String,
    pub platform_name: String,
    pub metadata: String,
    pub linked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationDto {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub platform: String,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub conversation_id: String,
    pub role: String,
    pub content: String,
    pub signals_s: Option<f64>,
    pub signals_d: Option<f64>,
    pub signals_c: Option<f64>,
    pub dominant_emotion: Option<String>,
    pub trust_level: Option<f64>,
    pub metadata: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFactDto {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub key: String,
    pub value: String,
    pub confidence: f64,
    pub source: String,
    pub first_mentioned: Option<DateTime<Utc>>,
    pub last_confirmed: Option<DateTime<Utc>>,
    pub mention_count: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferenceDto {
    pub user_id: String,
    pub pref_key: String,
    pub pref_value: String,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummaryDto {
    pub id: String,
    pub conversation_id: String,
    pub user_id: String,
    pub summary: String,
    pub key_topics: String,
    pub emotional_arc: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// EVC snapshot bound to a conversation id, the exact output of
/// `EVCEngine::get_full_state()` serialized to JSON plus an optional tracker
/// state under `user_emotion_tracker`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvcSnapshotDto {
    pub conversation_id: String,
    pub evc_blob: serde_json::Value,
    pub last_turn_ts: Option<DateTime<Utc>>,
}
