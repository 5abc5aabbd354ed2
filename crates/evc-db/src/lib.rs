//! Persistence Adapter (C7): storage-agnostic trait, DTOs, and a SQLite
//! implementation, plus a file-driven migration runner.

pub mod migrator;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use migrator::{MigrationAction, MigrationError, MigrationStatus, Migrator};
pub use models::{
    ConversationDto, ConversationSummaryDto, EvcSnapshotDto, MessageDto, PlatformIdentityDto,
    UserDto, UserFactDto, UserPreferenceDto,
};
pub use repository::{PersistenceAdapter, RepoResult, RepositoryError};
pub use sqlite::SqliteRepository;
