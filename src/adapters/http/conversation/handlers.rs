//! HTTP handlers for conversation endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::domain::foundation::ConversationId;
use crate::ports::ConversationStore;

use super::dto::{ConversationListResponse, ConversationSummary, CreateConversationRequest};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ConversationAppState {
    pub store: Arc<dyn ConversationStore>,
}

impl ConversationAppState {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/conversations - List the caller's conversations
pub async fn list_conversations(
    State(state): State<ConversationAppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<ConversationListResponse>, ApiError> {
    let conversations = state.store.list_for_owner(&identity.user_id).await?;
    Ok(Json(ConversationListResponse {
        conversations: conversations.iter().map(ConversationSummary::from).collect(),
    }))
}

/// POST /api/conversations - Create a conversation
pub async fn create_conversation(
    State(state): State<ConversationAppState>,
    RequireAuth(identity): RequireAuth,
    body: Option<Json<CreateConversationRequest>>,
) -> Result<Response, ApiError> {
    let request = body.map(|Json(req)| req).unwrap_or_default();
    let conversation = state.store.create(&identity.user_id, request.title).await?;

    tracing::info!(
        conversation_id = %conversation.id(),
        user_id = %identity.user_id,
        "Conversation created"
    );
    Ok((StatusCode::CREATED, Json(conversation)).into_response())
}

/// GET /api/conversations/:id - Load a conversation with its messages
pub async fn get_conversation(
    State(state): State<ConversationAppState>,
    RequireAuth(identity): RequireAuth,
    Path(conversation_id): Path<String>,
) -> Result<Response, ApiError> {
    let id: ConversationId = conversation_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid conversation ID".to_string()))?;

    let conversation = state.store.load(&id).await?;
    if !conversation.is_owned_by(&identity.user_id) {
        return Err(ApiError::Forbidden);
    }
    Ok(Json(conversation).into_response())
}
