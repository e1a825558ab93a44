//! WebSocket adapters for real-time chat.
//!
//! # Architecture
//!
//! ```text
//!   client ──frames──▶ handler ──ClientEvent──▶ ConnectionGateway
//!                                                 │        │
//!                                   join/typing   │        │ send-message
//!                                                 ▼        ▼
//!                                        RoomRegistry ◀── SessionManager
//!                                                 │
//!   client ◀──frames── handler ◀──ChatEvent (per-connection queue)
//! ```
//!
//! # Components
//!
//! - [`messages`] - Inbound protocol types
//! - [`rooms`] - Conversation rooms and fan-out
//! - [`gateway`] - Socket-independent per-connection event handling
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod gateway;
pub mod handler;
pub mod messages;
pub mod rooms;

pub use gateway::{ClientConnection, ConnectionGateway};
pub use handler::{websocket_router, ws_handler, WebSocketState};
pub use messages::{ClientEvent, SendMessagePayload, TypingPayload};
pub use rooms::RoomRegistry;
