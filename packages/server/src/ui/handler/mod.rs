//! HTTP / WebSocket handlers.

pub mod websocket;

pub use websocket::websocket_handler;
