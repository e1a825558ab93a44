//! HTTP adapters - REST API implementations.

pub mod conversation;
pub mod error;
pub mod health;
pub mod middleware;

pub use conversation::{conversation_router, ConversationAppState};
pub use error::ApiError;
pub use health::health_router;
pub use middleware::{auth_middleware, AuthState, RequireAuth};
