//! WebSocket relay server implementation.

mod handler;
mod heartbeat;
mod server;
mod signal;
pub mod state;

pub use server::Server;
