//! Error types for the terminal client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The party code does not exist or the password was wrong
    #[error("No party with that code, or the password is wrong")]
    BadRoom,

    /// The server speaks another protocol version
    #[error("The server requires a newer client")]
    UpgradeRequired,

    /// The server refused the handshake before upgrading
    #[error("Handshake rejected by server: {0}")]
    Rejected(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}
