//! Keyword-indexed note store (out of scope for the core per the
//! specification, which only fixes the interface the orchestrator calls).
//! The implementation here is the trivial one: a process-wide map of
//! free-text notes per user, ranked by keyword overlap against the current
//! message. A real deployment would back this with the markdown-chunking +
//! BM25 index the bot used before the core was split out; this crate only
//! needs to hand the orchestrator a short, relevant excerpt.

use std::collections::HashMap;

use tokio::sync::RwLock;

/// A single stored note: a user id, free text, and the turn it was recorded.
#[derive(Debug, Clone)]
pub struct Note {
    pub user_id: String,
    pub text: String,
    pub turn: u64,
}

/// Relevance-ranked excerpt plus the long-term profile blob for a user.
#[derive(Debug, Clone, Default)]
pub struct NoteContext {
    pub excerpt: String,
    pub profile_blob: String,
}

#[async_trait::async_trait]
pub trait NoteStore: Send + Sync {
    /// Returns a short relevance-ranked excerpt keyed on `message`, plus the
    /// user's long-term profile blob. Either field may be empty.
    async fn context_for(&self, user_id: &str, message: &str) -> NoteContext;

    /// Appends a note to the user's store (called after facts are learned).
    async fn record(&self, user_id: &str, text: &str, turn: u64);
}

/// In-memory keyword-overlap note store. Ranks stored notes by the count of
/// shared lowercase words with the query message and returns the single best
/// match as the excerpt; the profile blob is the concatenation of every note
/// on file, oldest first.
#[derive(Debug, Default)]
pub struct InMemoryNoteStore {
    notes: RwLock<HashMap<String, Vec<Note>>>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self {
            notes: RwLock::new(HashMap::new()),
        }
    }

    fn overlap_score(message: &str, note: &str) -> usize {
        let message_words: std::collections::HashSet<&str> =
            message.split_whitespace().collect();
        note.split_whitespace()
            .filter(|w| message_words.contains(w))
            .count()
    }
}

#[async_trait::async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn context_for(&self, user_id: &str, message: &str) -> NoteContext {
        let notes = self.notes.read().await;
        let Some(user_notes) = notes.get(user_id) else {
            return NoteContext::default();
        };
        if user_notes.is_empty() {
            return NoteContext::default();
        }

        let lower_message = message.to_lowercase();
        let best = user_notes
            .iter()
            .max_by_key(|n| Self::overlap_score(&lower_message, &n.text.to_lowercase()));

        let excerpt = best.map(|n| n.text.clone()).unwrap_or_default();
        let profile_blob = user_notes
            .iter()
            .map(|n| n.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        NoteContext {
            excerpt,
            profile_blob,
        }
    }

    async fn record(&self, user_id: &str, text: &str, turn: u64) {
        let mut notes = self.notes.write().await;
        notes
            .entry(user_id.to_string())
            .or_default()
            .push(Note {
                user_id: user_id.to_string(),
                text: text.to_string(),
                turn,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_store_returns_empty_context() {
        let store = InMemoryNoteStore::new();
        let ctx = store.context_for("u1", "hello there").await;
        assert!(ctx.excerpt.is_empty());
        assert!(ctx.profile_blob.is_empty());
    }

    #[tokio::test]
    async fn ranks_best_overlap_as_excerpt() {
        let store = InMemoryNoteStore::new();
        store.record("u1", "likes hiking on weekends", 1).await;
        store.record("u1", "works as a nurse in the city", 2).await;

        let ctx = store.context_for("u1", "do you still go hiking?").await;
        assert_eq!(ctx.excerpt, "likes hiking on weekends");
        assert!(ctx.profile_blob.contains("nurse"));
    }
}
