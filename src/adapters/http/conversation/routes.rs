//! Axum routes for conversation endpoints.

use axum::routing::get;
use axum::Router;

use super::handlers::{
    create_conversation, get_conversation, list_conversations, ConversationAppState,
};

/// Creates routes for conversation endpoints.
///
/// - GET  /conversations
/// - POST /conversations
/// - GET  /conversations/:id
pub fn conversation_routes() -> Router<ConversationAppState> {
    Router::new()
        .route(
            "/conversations",
            get(list_conversations).post(create_conversation),
        )
        .route("/conversations/:id", get(get_conversation))
}

/// Combined router with all conversation routes under /api.
pub fn conversation_router() -> Router<ConversationAppState> {
    Router::new().nest("/api", conversation_routes())
}
