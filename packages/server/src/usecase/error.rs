//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::RepositoryError;

/// パーティへの入室（作成・参加）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// 参加先のパーティが存在しない、またはパスワードが一致しない
    #[error("join rejected: {0}")]
    BadRoom(#[from] RepositoryError),
}
