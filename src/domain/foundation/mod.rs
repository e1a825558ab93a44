//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types
//! that form the vocabulary of the chat engine.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{AuthError, VerifiedIdentity};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ConnectionId, ConversationId, MessageId, UserId};
pub use timestamp::Timestamp;
