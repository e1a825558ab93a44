//! Content moderation port.

/// Outcome of moderating one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationVerdict {
    pub safe: bool,
    pub reason: Option<String>,
}

impl ModerationVerdict {
    pub fn safe() -> Self {
        Self {
            safe: true,
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            safe: false,
            reason: Some(reason.into()),
        }
    }
}

/// Classifies message text as safe or unsafe.
///
/// Implementations must be pure: same input, same verdict, no side effects.
pub trait ContentModerator: Send + Sync {
    fn check(&self, text: &str) -> ModerationVerdict;
}
