//! Conversation domain module.
//!
//! Conversations, their append-only message log, and the events
//! pushed to clients when that log changes.

mod conversation;
mod events;
mod message;

pub use conversation::{Conversation, DEFAULT_TITLE, MAX_TITLE_CHARS};
pub use events::{ChatEvent, MessageErrorPayload, UserTypingPayload};
pub use message::{AuthorKind, Confidence, Message, MessageContent, Sentiment, MAX_MESSAGE_CHARS};
