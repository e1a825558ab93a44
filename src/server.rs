//! # Server Setup
//!
//! Wires adapters to the session layer and builds the axum application.
//!
//! One [`ChatEngine`] is built at process start. It owns the room registry
//! and the session manager for the lifetime of the process; dropping it
//! closes every connection queue.

use std::sync::Arc;

use axum::{middleware, Router};
use http::HeaderValue;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::adapters::auth::JwtIdentityVerifier;
use crate::adapters::http::{auth_middleware, conversation_router, health_router, AuthState, ConversationAppState};
use crate::adapters::storage::{FileConversationStore, InMemoryConversationStore};
use crate::adapters::websocket::{websocket_router, ConnectionGateway, RoomRegistry, WebSocketState};
use crate::application::session::{SessionConfig, SessionDependencies, SessionManager};
use crate::config::{AppConfig, ServerConfig, StorageBackend};
use crate::domain::moderation::BlockListModerator;
use crate::domain::reply::TemplateReplyGenerator;
use crate::ports::{ContentModerator, ConversationStore, IdentityVerifier, ReplyGenerator};

/// Collaborators the engine is assembled from.
#[derive(Clone)]
pub struct EngineComponents {
    pub store: Arc<dyn ConversationStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub moderator: Arc<dyn ContentModerator>,
    pub reply_generator: Arc<dyn ReplyGenerator>,
    pub session: SessionConfig,
    pub outbound_buffer: usize,
}

impl EngineComponents {
    /// Builds production collaborators from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let store: Arc<dyn ConversationStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(InMemoryConversationStore::new()),
            StorageBackend::File => Arc::new(FileConversationStore::new(config.storage.data_path())),
        };

        Self {
            store,
            verifier: Arc::new(JwtIdentityVerifier::new(
                &config.auth.jwt_secret,
                config.auth.token_ttl(),
            )),
            moderator: Arc::new(BlockListModerator::new(config.chat.blocked_terms_list())),
            reply_generator: Arc::new(TemplateReplyGenerator::new()),
            session: config.chat.session_config(),
            outbound_buffer: config.chat.outbound_buffer,
        }
    }
}

/// The running chat engine.
pub struct ChatEngine {
    store: Arc<dyn ConversationStore>,
    verifier: Arc<dyn IdentityVerifier>,
    rooms: Arc<RoomRegistry>,
    sessions: Arc<SessionManager>,
    gateway: Arc<ConnectionGateway>,
}

impl ChatEngine {
    pub fn new(components: EngineComponents) -> Self {
        let rooms = Arc::new(RoomRegistry::new());
        let deps = SessionDependencies {
            store: components.store.clone(),
            broadcaster: rooms.clone(),
            moderator: components.moderator,
            reply_generator: components.reply_generator,
        };
        let sessions = Arc::new(SessionManager::new(deps, components.session));
        let gateway = Arc::new(ConnectionGateway::new(
            rooms.clone(),
            sessions.clone(),
            components.outbound_buffer,
        ));

        Self {
            store: components.store,
            verifier: components.verifier,
            rooms,
            sessions,
            gateway,
        }
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn rooms(&self) -> &Arc<RoomRegistry> {
        &self.rooms
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn gateway(&self) -> &Arc<ConnectionGateway> {
        &self.gateway
    }

    /// Builds the full HTTP application.
    ///
    /// REST routes get the request timeout; the WebSocket route does not.
    pub fn router(&self, server: &ServerConfig) -> Router {
        let auth_state: AuthState = self.verifier.clone();

        let api = conversation_router()
            .with_state(ConversationAppState::new(self.store.clone()))
            .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
            .layer(TimeoutLayer::new(server.request_timeout()));

        let ws = websocket_router().with_state(WebSocketState::new(
            self.gateway.clone(),
            self.verifier.clone(),
        ));

        Router::new()
            .merge(health_router())
            .merge(api)
            .merge(ws)
            .layer(cors_layer(server))
            .layer(TraceLayer::new_for_http())
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter. Production logs are JSON.
pub fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if server.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
