//! User-memory adapter: builds the profile + known-facts block the prompt
//! assembler folds in for authenticated non-guest users, sourced from the
//! persistence adapter's facts and preferences tables.

use std::sync::Arc;

use evc_db::{PersistenceAdapter, RepoResult};

/// Profile text plus a rendered known-facts block, each already trimmed to
/// the caller's byte cap.
#[derive(Debug, Clone, Default)]
pub struct UserProfileContext {
    pub profile: String,
    pub facts_block: String,
}

pub struct UserMemoryAdapter {
    store: Arc<dyn PersistenceAdapter>,
}

impl UserMemoryAdapter {
    pub fn new(store: Arc<dyn PersistenceAdapter>) -> Self {
        Self { store }
    }

    /// Builds a profile block from preferences and an active-facts block,
    /// each truncated to `cap` bytes on a UTF-8 boundary.
    pub async fn context_for(&self, user_id: &str, cap: usize) -> RepoResult<UserProfileContext> {
        let preferences = self.store.get_preferences(user_id).await?;
        let facts = self.store.get_facts(user_id, None).await?;

        let profile = preferences
            .iter()
            .map(|p| format!("{}: {}", p.pref_key, p.pref_value))
            .collect::<Vec<_>>()
            .join("\n");

        let facts_block = facts
            .iter()
            .filter(|f| f.is_active)
            .map(|f| format!("[{}] {} = {}", f.category, f.key, f.value))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(UserProfileContext {
            profile: truncate_utf8(&profile, cap),
            facts_block: truncate_utf8(&facts_block, cap),
        })
    }
}

/// Truncates `s` to at most `cap` bytes, backing off to the nearest char
/// boundary so the result is always valid UTF-8.
pub fn truncate_utf8(s: &str, cap: usize) -> String {
    if s.len() <= cap {
        return s.to_string();
    }
    let mut end = cap;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "héllo wörld";
        let truncated = truncate_utf8(s, 3);
        assert!(truncated.len() <= 3);
        assert!(std::str::from_utf8(truncated.as_bytes()).is_ok());
    }

    #[test]
    fn truncate_is_noop_under_cap() {
        let s = "short";
        assert_eq!(truncate_utf8(s, 100), s);
    }
}
