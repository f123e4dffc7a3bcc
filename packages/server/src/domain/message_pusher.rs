//! MessagePusher trait 定義
//!
//! 接続中のクライアントへフレームを届けるためのインターフェース。
//! 送信は常にベストエフォートで、配信確認は行いません。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};

use super::{ConnectionId, MessagePushError};

/// Item carried by a connection's outbound channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Text(String),
    /// Send a close frame and stop writing.
    Close,
}

/// Outbound channel of one connection; drained by that connection's writer task.
pub type PusherChannel = mpsc::UnboundedSender<OutboundFrame>;

/// Kill switch of one connection, watched by its connection task.
///
/// Fired by [`MessagePusher::terminate`]; unlike [`OutboundFrame::Close`] it
/// does not wait behind frames still queued on the [`PusherChannel`].
pub type TerminateSignal = Arc<Notify>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントの送信チャンネルと強制切断シグナルを登録
    async fn register_client(
        &self,
        client_id: ConnectionId,
        sender: PusherChannel,
        terminate: TerminateSignal,
    );

    /// クライアントの送信チャンネルを登録解除（以後のフレームは届かない）
    async fn unregister_client(&self, client_id: &ConnectionId);

    /// 特定のクライアントへテキストフレームを送信
    async fn push_to(&self, client_id: &ConnectionId, content: &str)
    -> Result<(), MessagePushError>;

    /// 複数のクライアントへ同じテキストフレームを送信（部分失敗は許容）
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 積まれたフレームを送り切った後に接続を閉じる（close フレームを積む）
    async fn close(&self, client_id: &ConnectionId) -> Result<(), MessagePushError>;

    /// 送信キューを待たずに接続を即座に切断する
    async fn terminate(&self, client_id: &ConnectionId) -> Result<(), MessagePushError>;
}
