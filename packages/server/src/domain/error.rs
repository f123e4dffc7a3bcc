//! Domain error types.

use thiserror::Error;

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("connection id must not be empty")]
    EmptyConnectionId,
}

/// Registry / Repository 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),

    #[error("party '{0}' does not exist")]
    PartyNotFound(String),

    #[error("wrong password for party '{0}'")]
    WrongPassword(String),
}

/// MessagePusher のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' is not connected")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}
