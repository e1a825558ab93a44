//! Reply generator port.
//!
//! The seam where a real inference backend plugs in. Sessions call it from a
//! spawned reply job, never while holding a conversation's write lock.

use async_trait::async_trait;

use crate::domain::conversation::{Confidence, Message, Sentiment};
use crate::domain::foundation::DomainError;

/// A reply body with its sentiment tag.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReply {
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence: Confidence,
}

#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Produce a reply to `message` given the recent `context`, oldest first.
    async fn generate(
        &self,
        message: &str,
        context: &[Message],
    ) -> Result<GeneratedReply, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_generator_is_object_safe() {
        fn _accepts_dyn(_generator: &dyn ReplyGenerator) {}
    }
}
