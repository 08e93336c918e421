//! HTTP and WebSocket relay for a single liar's dice game.
//!
//! Every game operation is exposed as a small REST endpoint, and every event
//! tag the engine publishes is forwarded to WebSocket subscribers.

pub mod api;
pub mod config;
pub mod logging;
