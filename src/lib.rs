//! Chat Engine - Real-time conversation service
//!
//! Users post messages into conversations over a WebSocket; every message is
//! moderated, appended in order, fanned out to the conversation's room, and
//! answered by a delayed, sentiment-aware generated reply.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod server;
