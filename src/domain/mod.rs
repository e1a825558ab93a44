//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, identity)
//! - `conversation` - Conversation aggregate, messages, outbound events
//! - `moderation` - Block-list content moderator
//! - `reply` - Sentiment classification and templated reply generation

pub mod conversation;
pub mod foundation;
pub mod moderation;
pub mod reply;
