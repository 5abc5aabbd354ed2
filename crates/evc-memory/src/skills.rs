//! Skill matcher (out of scope for the core; the orchestrator only needs the
//! interface). The trivial implementation here matches a fixed set of
//! trigger phrases against the incoming message and returns at most one
//! matched skill name plus a short context blurb.

/// A skill match: the skill's name and a context blurb to fold into the
/// prompt (capped at 1000 bytes by the caller).
#[derive(Debug, Clone)]
pub struct SkillMatch {
    pub name: String,
    pub context: String,
}

pub trait SkillMatcher: Send + Sync {
    /// Returns the single best-matching skill for `message`, if any.
    fn match_skill(&self, message: &str) -> Option<SkillMatch>;
}

/// Rule-based matcher: a fixed ordered list of (trigger words, skill name,
/// context) tuples, first match wins.
pub struct RuleBasedSkillMatcher {
    rules: Vec<(Vec<&'static str>, &'static str, &'static str)>,
}

impl Default for RuleBasedSkillMatcher {
    fn default() -> Self {
        Self {
            rules: vec![
                (
                    vec!["weather", "forecast", "rain"],
                    "weather",
                    "The user is asking about weather conditions.",
                ),
                (
                    vec!["remind", "reminder", "remember to"],
                    "reminder",
                    "The user wants something remembered for later.",
                ),
                (
                    vec!["breathe", "anxious", "panic", "calm down"],
                    "grounding",
                    "The user may benefit from a brief grounding exercise.",
                ),
            ],
        }
    }
}

impl RuleBasedSkillMatcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SkillMatcher for RuleBasedSkillMatcher {
    fn match_skill(&self, message: &str) -> Option<SkillMatch> {
        let lower = message.to_lowercase();
        self.rules
            .iter()
            .find(|(triggers, _, _)| triggers.iter().any(|t| lower.contains(t)))
            .map(|(_, name, context)| SkillMatch {
                name: (*name).to_string(),
                context: (*context).to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_match_returns_none() {
        let matcher = RuleBasedSkillMatcher::new();
        assert!(matcher.match_skill("tell me about your day").is_none());
    }

    #[test]
    fn first_matching_rule_wins() {
        let matcher = RuleBasedSkillMatcher::new();
        let m = matcher
            .match_skill("can you remind me to call mom tomorrow?")
            .expect("should match reminder skill");
        assert_eq!(m.name, "reminder");
    }
}
