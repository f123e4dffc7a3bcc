//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `PusherChannel` と `TerminateSignal` を管理
//! - クライアントへのフレーム送信（push_to, broadcast）
//! - 切断要求：送信キューの後ろに積む close と、キューを待たない terminate
//!
//! ## 設計ノート
//!
//! WebSocket の受け付けは UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は UI 層が作った送信チャンネルを受け取り、フレームを積むだけです。
//! 実際のソケット書き込みは接続ごとの writer タスクが行います。
//!
//! 相手が読み込みを止めると writer タスクはソケット書き込みで止まったままに
//! なるため、heartbeat による切断は送信キューを経由せず `TerminateSignal` で
//! 接続タスクに直接伝えます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, MessagePushError, MessagePusher, OutboundFrame, PusherChannel, TerminateSignal,
};

/// 登録済みクライアント 1 件分
pub struct ClientEntry {
    sender: PusherChannel,
    terminate: TerminateSignal,
}

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new(Arc::new(Mutex::new(HashMap::new())));
/// pusher.push_to(&connection_id, "ping").await?;
/// ```
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの送信チャンネルと切断シグナル
    ///
    /// Key: connection id
    clients: Arc<Mutex<HashMap<ConnectionId, ClientEntry>>>,
}

impl WebSocketMessagePusher {
    pub fn new(clients: Arc<Mutex<HashMap<ConnectionId, ClientEntry>>>) -> Self {
        Self { clients }
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(HashMap::new())))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(
        &self,
        client_id: ConnectionId,
        sender: PusherChannel,
        terminate: TerminateSignal,
    ) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Client '{}' registered to MessagePusher", client_id);
        clients.insert(client_id, ClientEntry { sender, terminate });
    }

    async fn unregister_client(&self, client_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(client_id);
        tracing::debug!("Client '{}' unregistered from MessagePusher", client_id);
    }

    async fn push_to(
        &self,
        client_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let client = clients
            .get(client_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(client_id.to_string()))?;
        client
            .sender
            .send(OutboundFrame::Text(content.to_string()))
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::trace!("Pushed frame to client '{}'", client_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        for target in targets {
            match clients.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(client) => {
                    if let Err(e) = client.sender.send(OutboundFrame::Text(content.to_string())) {
                        tracing::debug!("Skipping closed client '{}': {}", target, e);
                    }
                }
                None => {
                    tracing::debug!("Client '{}' not found during broadcast, skipping", target);
                }
            }
        }

        Ok(())
    }

    async fn close(&self, client_id: &ConnectionId) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let client = clients
            .get(client_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(client_id.to_string()))?;
        client
            .sender
            .send(OutboundFrame::Close)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Queued close for client '{}'", client_id);
        Ok(())
    }

    async fn terminate(&self, client_id: &ConnectionId) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let client = clients
            .get(client_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(client_id.to_string()))?;
        // notify_one keeps a permit, so a task that starts waiting later still sees it
        client.terminate.notify_one();
        tracing::debug!("Signalled termination of client '{}'", client_id);
        Ok(())
    }
}
