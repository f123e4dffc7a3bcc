//! Watch-party relay server.
//!
//! Clients create or join a party with a handshake token carried in the
//! WebSocket subprotocol header, then exchange chat lines and
//! latency-compensated playback commands through the relay. A heartbeat
//! reaps silent connections and hands the host role over when needed.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
