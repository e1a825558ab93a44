//! HTTP adapter for conversation records.
//!
//! Messages are posted over the WebSocket; REST only lists, creates, and
//! loads conversations.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::ConversationAppState;
pub use routes::{conversation_router, conversation_routes};
