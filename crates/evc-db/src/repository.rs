//! Persistence Adapter (C7): the storage contract the core consumes, kept
//! implementation-agnostic behind a trait so a SQLite, Postgres, or
//! document-store backend can be swapped at startup.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    ConversationDto, ConversationSummaryDto, EvcSnapshotDto, MessageDto, PlatformIdentityDto,
    UserDto, UserFactDto, UserPreferenceDto,
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("backend error: {0}")]
    Backend(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Storage contract consumed by the orchestrator and the HTTP layer. Every
/// method here is a straightforward CRUD operation except `delete_fact`,
/// which must scope by user id and never silently no-op (some historical
/// backends returned unconditional failure there; this interface rejects
/// that shape by construction).
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    async fn create_user(&self, user: UserDto) -> RepoResult<UserDto>;
    async fn get_user_by_id(&self, user_id: &str) -> RepoResult<Option<UserDto>>;
    async fn get_user_by_username(&self, username: &str) -> RepoResult<Option<UserDto>>;
    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<UserDto>>;
    async fn update_user(&self, user: UserDto) -> RepoResult<UserDto>;
    async fn update_last_login(&self, user_id: &str) -> RepoResult<()>;

    async fn create_platform_identity(
        &self,
        identity: PlatformIdentityDto,
    ) -> RepoResult<PlatformIdentityDto>;
    async fn get_user_by_platform(
        &self,
        platform: &str,
        platform_uid: &str,
    ) -> RepoResult<Option<UserDto>>;
    async fn get_platform_identities(&self, user_id: &str) -> RepoResult<Vec<PlatformIdentityDto>>;

    async fn create_conversation(&self, conv: ConversationDto) -> RepoResult<ConversationDto>;
    async fn get_conversation(&self, conv_id: &str) -> RepoResult<Option<ConversationDto>>;
    async fn list_conversations(
        &self,
        user_id: &str,
        limit: i64,
    ) -> RepoResult<Vec<ConversationDto>>;
    async fn update_conversation(&self, conv: ConversationDto) -> RepoResult<ConversationDto>;

    async fn create_message(&self, msg: MessageDto) -> RepoResult<MessageDto>;
    async fn get_messages(&self, conversation_id: &str, limit: i64) -> RepoResult<Vec<MessageDto>>;
    async fn get_recent_messages(&self, user_id: &str, limit: i64) -> RepoResult<Vec<MessageDto>>;

    async fn upsert_fact(&self, fact: UserFactDto) -> RepoResult<UserFactDto>;
    async fn get_facts(
        &self,
        user_id: &str,
        category: Option<&str>,
    ) -> RepoResult<Vec<UserFactDto>>;
    /// Soft-deletes a fact, scoped to `user_id`. Returns whether a row was
    /// affected; never silently succeeds for a fact owned by a different user.
    async fn delete_fact(&self, user_id: &str, fact_id: &str) -> RepoResult<bool>;

    async fn set_preference(&self, pref: UserPreferenceDto) -> RepoResult<UserPreferenceDto>;
    async fn get_preferences(&self, user_id: &str) -> RepoResult<Vec<UserPreferenceDto>>;
    async fn get_preference(
        &self,
        user_id: &str,
        pref_key: &str,
    ) -> RepoResult<Option<UserPreferenceDto>>;

    async fn create_summary(
        &self,
        summary: ConversationSummaryDto,
    ) -> RepoResult<ConversationSummaryDto>;
    async fn get_summaries(
        &self,
        user_id: &str,
        limit: i64,
    ) -> RepoResult<Vec<ConversationSummaryDto>>;

    async fn save_evc_state(&self, snapshot: EvcSnapshotDto) -> RepoResult<()>;
    async fn get_evc_state(&self, conversation_id: &str) -> RepoResult<Option<EvcSnapshotDto>>;
}
