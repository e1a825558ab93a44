//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the engine to external systems:
//! - `auth` - Identity verification (JWT, mock)
//! - `http` - REST endpoints and middleware
//! - `storage` - Conversation stores (file, in-memory)
//! - `websocket` - Rooms, connection gateway, upgrade handler

pub mod auth;
pub mod http;
pub mod storage;
pub mod websocket;

pub use auth::{JwtIdentityVerifier, MockIdentityVerifier};
pub use storage::{FileConversationStore, InMemoryConversationStore};
pub use websocket::{ConnectionGateway, RoomRegistry};
