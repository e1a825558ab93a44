//! Conversation sessions: per-conversation ordering, moderation, and
//! delayed reply scheduling.

mod config;
mod conversation_session;
mod manager;

pub use config::{ReplyDelay, SessionConfig};
pub use conversation_session::{
    AppendOutcome, ConversationSession, SessionDependencies, SessionError, SessionState,
};
pub use manager::SessionManager;
