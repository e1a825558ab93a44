//! Block-list content moderation.
//!
//! A message is unsafe when it contains any configured term, compared
//! case-insensitively as a plain substring. No state, no side effects.

use crate::ports::{ContentModerator, ModerationVerdict};

/// Reason reported to the sender when a message is rejected.
pub const BLOCKED_CONTENT_REASON: &str = "Message contains prohibited content";

/// Terms blocked when no list is configured.
pub const DEFAULT_BLOCKED_TERMS: &[&str] = &["spam", "垃圾", "广告", "违法"];

/// Moderator backed by a fixed list of blocked terms.
#[derive(Debug, Clone)]
pub struct BlockListModerator {
    /// Lowercased, non-empty terms.
    terms: Vec<String>,
}

impl BlockListModerator {
    /// Builds a moderator from `terms`. Blank entries are ignored.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

impl Default for BlockListModerator {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKED_TERMS)
    }
}

impl ContentModerator for BlockListModerator {
    fn check(&self, text: &str) -> ModerationVerdict {
        let lowered = text.to_lowercase();
        match self.terms.iter().find(|term| lowered.contains(term.as_str())) {
            Some(term) => {
                tracing::debug!(term = %term, "Message matched blocked term");
                ModerationVerdict::rejected(BLOCKED_CONTENT_REASON)
            }
            None => ModerationVerdict::safe(),
        }
    }
}
