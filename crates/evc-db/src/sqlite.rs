//! SQLite implementation of [`PersistenceAdapter`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};

use crate::models::{
    ConversationDto, ConversationSummaryDto, EvcSnapshotDto, MessageDto, PlatformIdentityDto,
    UserDto, UserFactDto, UserPreferenceDto,
};
use crate::repository::{PersistenceAdapter, RepoResult, RepositoryError};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> UserDto {
    UserDto {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        avatar_url: row.get("avatar_url"),
        password_hash: row.get("password_hash"),
        auth_provider: row.get("auth_provider"),
        is_guest: row.get::<i64, _>("is_guest") != 0,
        is_active: row.get::<i64, _>("is_active") != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        last_login_at: row.get("last_login_at"),
    }
}

fn row_to_conversation(row: &sqlx::sqlite::SqliteRow) -> ConversationDto {
    ConversationDto {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        platform: row.get("platform"),
        is_active: row.get::<i64, _>("is_active") != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> MessageDto {
    MessageDto {
        id: row.get("id"),
        conversation_id: row.get("conversation_id"),
        role: row.get("role"),
        content: row.get("content"),
        signals_s: row.get("signals_s"),
        signals_d: row.get("signals_d"),
        signals_c: row.get("signals_c"),
        dominant_emotion: row.get("dominant_emotion"),
        trust_level: row.get("trust_level"),
        metadata: row.get("metadata"),
        created_at: row.get("created_at"),
    }
}

fn row_to_fact(row: &sqlx::sqlite::SqliteRow) -> UserFactDto {
    UserFactDto {
        id: row.get("id"),
        user_id: row.get("user_id"),
        category: row.get("category"),
        key: row.get("key"),
        value: row.get("value"),
        confidence: row.get("confidence"),
        source: row.get("source"),
        first_mentioned: row.get("first_mentioned"),
        last_confirmed: row.get("last_confirmed"),
        mention_count: row.get("mention_count"),
        is_active: row.get::<i64, _>("is_active") != 0,
    }
}

fn row_to_preference(row: &sqlx::sqlite::SqliteRow) -> UserPreferenceDto {
    UserPreferenceDto {
        user_id: row.get("user_id"),
        pref_key: row.get("pref_key"),
        pref_value: row.get("pref_value"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_platform_identity(row: &sqlx::sqlite::SqliteRow) -> PlatformIdentityDto {
    PlatformIdentityDto {
        id: row.get("id"),
        user_id: row.get("user_id"),
        platform: row.get("platform"),
        platform_uid: row.get("platform_uid"),
        platform_name: row.get("platform_name"),
        metadata: row.get("metadata"),
        linked_at: row.get("linked_at"),
    }
}

fn row_to_summary(row: &sqlx::sqlite::SqliteRow) -> ConversationSummaryDto {
    ConversationSummaryDto {
        id: row.get("id"),
        conversation_id: row.get("conversation_id"),
        user_id: row.get("user_id"),
        summary: row.get("summary"),
        key_topics: row.get("key_topics"),
        emotional_arc: row.get("emotional_arc"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl PersistenceAdapter for SqliteRepository {
    async fn create_user(&self, user: UserDto) -> RepoResult<UserDto> {
        let now = Utc::now();
        sqlx::query(
            r#"INSERT INTO users
               (id, username, email, display_name, avatar_url, password_hash,
                auth_provider, is_guest, is_active, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)"#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.avatar_url)
        .bind(&user.password_hash)
        .bind(&user.auth_provider)
        .bind(user.is_guest as i64)
        .bind(user.is_active as i64)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_user_by_id(&user.id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_user_by_id(&self, user_id: &str) -> RepoResult<Option<UserDto>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn get_user_by_username(&self, username: &str) -> RepoResult<Option<UserDto>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<UserDto>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn update_user(&self, user: UserDto) -> RepoResult<UserDto> {
        let now = Utc::now();
        sqlx::query(
            r#"UPDATE users SET username=?2, email=?3, display_name=?4, avatar_url=?5,
               password_hash=?6, auth_provider=?7, is_guest=?8, is_active=?9, updated_at=?10
               WHERE id=?1"#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.avatar_url)
        .bind(&user.password_hash)
        .bind(&user.auth_provider)
        .bind(user.is_guest as i64)
        .bind(user.is_active as i64)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_user_by_id(&user.id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn update_last_login(&self, user_id: &str) -> RepoResult<()> {
        sqlx::query("UPDATE users SET last_login_at = ?2 WHERE id = ?1")
            .bind(user_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_platform_identity(
        &self,
        identity: PlatformIdentityDto,
    ) -> RepoResult<PlatformIdentityDto> {
        let now = Utc::now();
        sqlx::query(
            r#"INSERT INTO platform_identities
               (id, user_id, platform, platform_uid, platform_name, metadata, linked_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
        )
        .bind(&identity.id)
        .bind(&identity.user_id)
        .bind(&identity.platform)
        .bind(&identity.platform_uid)
        .bind(&identity.platform_name)
        .bind(&identity.metadata)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(PlatformIdentityDto {
            linked_at: Some(now),
            ..identity
        })
    }

    async fn get_user_by_platform(
        &self,
        platform: &str,
        platform_uid: &str,
    ) -> RepoResult<Option<UserDto>> {
        let row = sqlx::query(
            r#"SELECT u.* FROM users u
               JOIN platform_identities p ON p.user_id = u.id
               WHERE p.platform = ?1 AND p.platform_uid = ?2"#,
        )
        .bind(platform)
        .bind(platform_uid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_user))
    }

    async fn get_platform_identities(&self, user_id: &str) -> RepoResult<Vec<PlatformIdentityDto>> {
        let rows = sqlx::query("SELECT * FROM platform_identities WHERE user_id = ?1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_platform_identity).collect())
    }

    async fn create_conversation(&self, conv: ConversationDto) -> RepoResult<ConversationDto> {
        let now = Utc::now();
        sqlx::query(
            r#"INSERT INTO conversations (id, user_id, title, platform, is_active, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)"#,
        )
        .bind(&conv.id)
        .bind(&conv.user_id)
        .bind(&conv.title)
        .bind(&conv.platform)
        .bind(conv.is_active as i64)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_conversation(&conv.id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_conversation(&self, conv_id: &str) -> RepoResult<Option<ConversationDto>> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ?1")
            .bind(conv_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_conversation))
    }

    async fn list_conversations(
        &self,
        user_id: &str,
        limit: i64,
    ) -> RepoResult<Vec<ConversationDto>> {
        let rows = sqlx::query(
            "SELECT * FROM conversations WHERE user_id = ?1 ORDER BY updated_at DESC LIMIT ?2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_conversation).collect())
    }

    async fn update_conversation(&self, conv: ConversationDto) -> RepoResult<ConversationDto> {
        sqlx::query(
            r#"UPDATE conversations SET title=?2, platform=?3, is_active=?4, updated_at=?5
               WHERE id=?1"#,
        )
        .bind(&conv.id)
        .bind(&conv.title)
        .bind(&conv.platform)
        .bind(conv.is_active as i64)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get_conversation(&conv.id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_message(&self, msg: MessageDto) -> RepoResult<MessageDto> {
        let now = Utc::now();
        sqlx::query(
            r#"INSERT INTO messages
               (id, conversation_id, role, content, signals_s, signals_d, signals_c,
                dominant_emotion, trust_level, metadata, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"#,
        )
        .bind(&msg.id)
        .bind(&msg.conversation_id)
        .bind(&msg.role)
        .bind(&msg.content)
        .bind(msg.signals_s)
        .bind(msg.signals_d)
        .bind(msg.signals_c)
        .bind(&msg.dominant_emotion)
        .bind(msg.trust_level)
        .bind(&msg.metadata)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(MessageDto {
            created_at: Some(now),
            ..msg
        })
    }

    async fn get_messages(&self, conversation_id: &str, limit: i64) -> RepoResult<Vec<MessageDto>> {
        let rows = sqlx::query(
            "SELECT * FROM messages WHERE conversation_id = ?1 ORDER BY created_at ASC LIMIT ?2",
        )
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_message).collect())
    }

    async fn get_recent_messages(&self, user_id: &str, limit: i64) -> RepoResult<Vec<MessageDto>> {
        let rows = sqlx::query(
            r#"SELECT m.* FROM messages m
               JOIN conversations c ON c.id = m.conversation_id
               WHERE c.user_id = ?1
               ORDER BY m.created_at DESC LIMIT ?2"#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_message).collect())
    }

    async fn upsert_fact(&self, fact: UserFactDto) -> RepoResult<UserFactDto> {
        let existing = sqlx::query(
            "SELECT * FROM user_facts WHERE user_id = ?1 AND category = ?2 AND key = ?3",
        )
        .bind(&fact.user_id)
        .bind(&fact.category)
        .bind(&fact.key)
        .fetch_optional(&self.pool)
        .await?;

        let now = Utc::now();

        if let Some(row) = existing {
            let current = row_to_fact(&row);
            sqlx::query(
                r#"UPDATE user_facts SET value=?2, confidence=?3, source=?4,
                   last_confirmed=?5, mention_count=?6 WHERE id=?1"#,
            )
            .bind(&current.id)
            .bind(&fact.value)
            .bind(fact.confidence)
            .bind(&fact.source)
            .bind(now)
            .bind(current.mention_count + 1)
            .execute(&self.pool)
            .await?;

            Ok(UserFactDto {
                id: current.id,
                value: fact.value,
                confidence: fact.confidence,
                source: fact.source,
                last_confirmed: Some(now),
                mention_count: current.mention_count + 1,
                ..current
            })
        } else {
            sqlx::query(
                r#"INSERT INTO user_facts
                   (id, user_id, category, key, value, confidence, source,
                    first_mentioned, last_confirmed, mention_count, is_active)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, 1, 1)"#,
            )
            .bind(&fact.id)
            .bind(&fact.user_id)
            .bind(&fact.category)
            .bind(&fact.key)
            .bind(&fact.value)
            .bind(fact.confidence)
            .bind(&fact.source)
            .bind(now)
            .execute(&self.pool)
            .await?;

            Ok(UserFactDto {
                first_mentioned: Some(now),
                last_confirmed: Some(now),
                mention_count: 1,
                is_active: true,
                ..fact
            })
        }
    }

    async fn get_facts(
        &self,
        user_id: &str,
        category: Option<&str>,
    ) -> RepoResult<Vec<UserFactDto>> {
        let rows = if let Some(cat) = category {
            sqlx::query(
                "SELECT * FROM user_facts WHERE user_id = ?1 AND category = ?2 AND is_active = 1",
            )
            .bind(user_id)
            .bind(cat)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query("SELECT * FROM user_facts WHERE user_id = ?1 AND is_active = 1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
        };
        Ok(rows.iter().map(row_to_fact).collect())
    }

    async fn delete_fact(&self, user_id: &str, fact_id: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE user_facts SET is_active = 0 WHERE id = ?1 AND user_id = ?2",
        )
        .bind(fact_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_preference(&self, pref: UserPreferenceDto) -> RepoResult<UserPreferenceDto> {
        let now = Utc::now();
        sqlx::query(
            r#"INSERT INTO user_preferences (user_id, pref_key, pref_value, updated_at)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(user_id, pref_key) DO UPDATE
               SET pref_value = excluded.pref_value, updated_at = excluded.updated_at"#,
        )
        .bind(&pref.user_id)
        .bind(&pref.pref_key)
        .bind(&pref.pref_value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(UserPreferenceDto {
            updated_at: Some(now),
            ..pref
        })
    }

    async fn get_preferences(&self, user_id: &str) -> RepoResult<Vec<UserPreferenceDto>> {
        let rows = sqlx::query("SELECT * FROM user_preferences WHERE user_id = ?1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_preference).collect())
    }

    async fn get_preference(
        &self,
        user_id: &str,
        pref_key: &str,
    ) -> RepoResult<Option<UserPreferenceDto>> {
        let row = sqlx::query(
            "SELECT * FROM user_preferences WHERE user_id = ?1 AND pref_key = ?2",
        )
        .bind(user_id)
        .bind(pref_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_preference))
    }

    async fn create_summary(
        &self,
        summary: ConversationSummaryDto,
    ) -> RepoResult<ConversationSummaryDto> {
        let now = Utc::now();
        sqlx::query(
            r#"INSERT INTO conversation_summaries
               (id, conversation_id, user_id, summary, key_topics, emotional_arc, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
        )
        .bind(&summary.id)
        .bind(&summary.conversation_id)
        .bind(&summary.user_id)
        .bind(&summary.summary)
        .bind(&summary.key_topics)
        .bind(&summary.emotional_arc)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(ConversationSummaryDto {
            created_at: Some(now),
            ..summary
        })
    }

    async fn get_summaries(
        &self,
        user_id: &str,
        limit: i64,
    ) -> RepoResult<Vec<ConversationSummaryDto>> {
        let rows = sqlx::query(
            "SELECT * FROM conversation_summaries WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_summary).collect())
    }

    async fn save_evc_state(&self, snapshot: EvcSnapshotDto) -> RepoResult<()> {
        let blob = snapshot.evc_blob.to_string();
        sqlx::query(
            r#"INSERT INTO evc_snapshots (conversation_id, evc_blob, last_turn_ts)
               VALUES (?1, ?2, ?3)
               ON CONFLICT(conversation_id) DO UPDATE
               SET evc_blob = excluded.evc_blob, last_turn_ts = excluded.last_turn_ts"#,
        )
        .bind(&snapshot.conversation_id)
        .bind(blob)
        .bind(snapshot.last_turn_ts)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_evc_state(&self, conversation_id: &str) -> RepoResult<Option<EvcSnapshotDto>> {
        let row = sqlx::query(
            "SELECT conversation_id, evc_blob, last_turn_ts FROM evc_snapshots WHERE conversation_id = ?1",
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(r) => {
                let blob_text: String = r.get("evc_blob");
                let blob: serde_json::Value =
                    serde_json::from_str(&blob_text).unwrap_or(serde_json::Value::Null);
                let last_turn_ts: Option<DateTime<Utc>> = r.get("last_turn_ts");
                Some(EvcSnapshotDto {
                    conversation_id: r.get("conversation_id"),
                    evc_blob: blob,
                    last_turn_ts,
                })
            }
            None => None,
        })
    }
}
