//! Message entity for conversations.
//!
//! Messages are immutable records appended to a conversation, authored either
//! by the user or by the reply generator. The serialized shape
//! (`id`, `type`, `content`, `timestamp`, `emotion`, `confidence`) is the
//! payload of the `new-message` event and must stay stable for clients.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp, ValidationError};

/// Maximum length of a message body, in Unicode code points.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorKind {
    /// Typed by a connected user.
    User,
    /// Produced by the reply generator.
    Ai,
}

/// Coarse emotional classification attached to generated replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Question,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Question => "question",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence score in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    /// Creates a confidence score.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if the value is NaN or outside `[0, 1]`
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::invalid_format(
                "confidence",
                format!("{} is outside [0, 1]", value),
            ));
        }
        Ok(Self(value))
    }

    /// Creates a confidence score, clamping into `[0, 1]`. NaN maps to 0.
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Confidence {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}

/// Validated message body.
///
/// # Invariants
///
/// - non-empty after trimming whitespace
/// - at most the configured number of code points ([`MAX_MESSAGE_CHARS`] by default)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageContent(String);

impl MessageContent {
    /// Validates `text` against the default length limit.
    pub fn new(text: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_limit(text, MAX_MESSAGE_CHARS)
    }

    /// Validates `text` against an explicit length limit.
    pub fn with_limit(text: impl Into<String>, max_chars: usize) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::empty_field("content"));
        }
        let chars = text.chars().count();
        if chars > max_chars {
            return Err(ValidationError::too_long("content", max_chars, chars));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An immutable message within a conversation.
///
/// # Invariants
///
/// - `id` is unique within its conversation
/// - `timestamp` is set at construction and never changes
/// - only `Ai` messages carry a sentiment and confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,

    #[serde(rename = "type")]
    author: AuthorKind,

    content: MessageContent,

    timestamp: Timestamp,

    #[serde(rename = "emotion", default, skip_serializing_if = "Option::is_none")]
    sentiment: Option<Sentiment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<Confidence>,
}

impl Message {
    /// Creates a user-authored message.
    pub fn user(content: MessageContent) -> Self {
        Self {
            id: MessageId::new(),
            author: AuthorKind::User,
            content,
            timestamp: Timestamp::now(),
            sentiment: None,
            confidence: None,
        }
    }

    /// Creates a generated reply.
    pub fn ai(content: MessageContent, sentiment: Sentiment, confidence: Confidence) -> Self {
        Self {
            id: MessageId::new(),
            author: AuthorKind::Ai,
            content,
            timestamp: Timestamp::now(),
            sentiment: Some(sentiment),
            confidence: Some(confidence),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn author(&self) -> AuthorKind {
        self.author
    }

    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn sentiment(&self) -> Option<Sentiment> {
        self.sentiment
    }

    pub fn confidence(&self) -> Option<Confidence> {
        self.confidence
    }

    pub fn is_from_user(&self) -> bool {
        self.author == AuthorKind::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_rejects_empty_and_whitespace() {
        assert_eq!(
            MessageContent::new(""),
            Err(ValidationError::empty_field("content"))
        );
        assert!(MessageContent::new("  \n\t").is_err());
    }

    #[test]
    fn content_limit_counts_code_points_not_bytes() {
        // 2000 CJK characters are 6000 bytes but exactly at the limit.
        let at_limit = "好".repeat(MAX_MESSAGE_CHARS);
        assert!(MessageContent::new(at_limit).is_ok());

        let over = "好".repeat(MAX_MESSAGE_CHARS + 1);
        assert_eq!(
            MessageContent::new(over),
            Err(ValidationError::too_long("content", 2000, 2001))
        );
    }

    #[test]
    fn confidence_bounds_are_enforced() {
        assert!(Confidence::new(0.0).is_ok());
        assert!(Confidence::new(1.0).is_ok());
        assert!(Confidence::new(1.01).is_err());
        assert!(Confidence::new(-0.1).is_err());
        assert!(Confidence::new(f64::NAN).is_err());
    }

    #[test]
    fn saturating_confidence_clamps() {
        assert_eq!(Confidence::saturating(1.5).value(), 1.0);
        assert_eq!(Confidence::saturating(-2.0).value(), 0.0);
        assert_eq!(Confidence::saturating(f64::NAN).value(), 0.0);
        assert_eq!(Confidence::saturating(0.75).value(), 0.75);
    }

    #[test]
    fn user_message_serializes_without_reply_fields() {
        let msg = Message::user(MessageContent::new("hello").unwrap());
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "user");
        assert_eq!(json["content"], "hello");
        assert!(json.get("emotion").is_none());
        assert!(json.get("confidence").is_none());
    }

    #[test]
    fn ai_message_serializes_emotion_and_confidence() {
        let msg = Message::ai(
            MessageContent::new("hi there").unwrap(),
            Sentiment::Question,
            Confidence::new(0.8).unwrap(),
        );
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "ai");
        assert_eq!(json["emotion"], "question");
        assert_eq!(json["confidence"], 0.8);
    }

    #[test]
    fn deserializing_out_of_range_confidence_fails() {
        let json = serde_json::json!({
            "id": MessageId::new(),
            "type": "ai",
            "content": "x",
            "timestamp": Timestamp::now(),
            "emotion": "neutral",
            "confidence": 3.5
        });
        assert!(serde_json::from_value::<Message>(json).is_err());
    }
}
