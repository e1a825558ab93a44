//! Application layer - coordinates domain operations across ports.
//!
//! The conversation session is the only component that mutates a
//! conversation's message log.

pub mod session;

pub use session::{
    AppendOutcome, ConversationSession, ReplyDelay, SessionConfig, SessionDependencies,
    SessionError, SessionManager, SessionState,
};
