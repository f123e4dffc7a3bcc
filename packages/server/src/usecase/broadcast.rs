//! Broadcast Dispatcher
//!
//! ユースケースが共有する送信窓口です。ドメインの値をワイヤーフレームに
//! エンコードし、`MessagePusher` 経由で接続ごとの送信キューに積みます。
//!
//! 送信はベストエフォートです。閉じた接続への送信失敗はログに残すだけで、
//! 呼び出し元には伝えません。
//!
//! パーティ構成を変える操作（作成・参加・離脱・ホスト切り替え）は
//! [`BroadcastDispatcher::order_snapshots`] のガードを持ったままリポジトリを
//! 更新し、スナップショットを積みます。これで各メンバーの送信キューには
//! 確定した順にスナップショットが並びます。

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::{
    domain::{
        CommandDelivery, ConnectionId, MessagePusher, PartySnapshot, PusherChannel,
        TerminateSignal,
    },
    infrastructure::dto::{PartyDto, ServerFrame},
};

pub struct BroadcastDispatcher {
    message_pusher: Arc<dyn MessagePusher>,
    snapshot_order: Mutex<()>,
}

impl BroadcastDispatcher {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            message_pusher,
            snapshot_order: Mutex::new(()),
        }
    }

    /// 接続の送信チャンネルと強制切断シグナルを登録
    pub async fn attach(
        &self,
        id: ConnectionId,
        channel: PusherChannel,
        terminate: TerminateSignal,
    ) {
        self.message_pusher
            .register_client(id, channel, terminate)
            .await;
    }

    /// パーティ構成の変更とそのスナップショット送信を直列化するガード
    ///
    /// リポジトリの更新から [`BroadcastDispatcher::party_snapshot`] まで保持すること。
    /// 送信キューへの積み込みは待たないので、保持時間は短い。
    pub async fn order_snapshots(&self) -> MutexGuard<'_, ()> {
        self.snapshot_order.lock().await
    }

    /// 接続の送信チャンネルを登録解除。以後この接続には何も届かない
    pub async fn detach(&self, id: &ConnectionId) {
        self.message_pusher.unregister_client(id).await;
    }

    /// 1 つの接続にフレームを送信
    pub async fn send(&self, id: &ConnectionId, frame: &ServerFrame) {
        let Some(text) = encode(frame) else {
            return;
        };
        if let Err(e) = self.message_pusher.push_to(id, &text).await {
            tracing::debug!("Failed to send frame to '{}': {}", id, e);
        }
    }

    /// `party:` スナップショットをパーティの全メンバーに送信
    pub async fn party_snapshot(&self, snapshot: &PartySnapshot) {
        let frame = ServerFrame::Party(PartyDto::from(snapshot));
        self.broadcast(snapshot.member_ids(), &frame).await;
    }

    /// チャットを送信者を含む全員に中継
    pub async fn chat(&self, recipients: Vec<ConnectionId>, sender: &ConnectionId, text: &str) {
        let frame = ServerFrame::Chat {
            sender_id: sender.to_string(),
            text: text.to_string(),
        };
        self.broadcast(recipients, &frame).await;
    }

    /// コマンドを受信者ごとの遅延補正値付きで中継
    pub async fn commands(&self, deliveries: Vec<CommandDelivery>, text: &str) {
        for delivery in deliveries {
            let frame = ServerFrame::Command {
                latency_ms: delivery.compensation_ms,
                text: text.to_string(),
            };
            self.send(&delivery.receiver, &frame).await;
        }
    }

    /// 生存確認の `ping` を送信
    pub async fn ping(&self, targets: Vec<ConnectionId>) {
        self.broadcast(targets, &ServerFrame::Ping).await;
    }

    /// 積まれたフレームを送り切ってから接続を閉じる
    pub async fn close(&self, id: &ConnectionId) {
        if let Err(e) = self.message_pusher.close(id).await {
            tracing::debug!("Failed to close '{}': {}", id, e);
        }
    }

    /// 送信キューを待たずに接続を切断する
    pub async fn terminate(&self, id: &ConnectionId) {
        if let Err(e) = self.message_pusher.terminate(id).await {
            tracing::debug!("Failed to terminate '{}': {}", id, e);
        }
    }

    async fn broadcast(&self, targets: Vec<ConnectionId>, frame: &ServerFrame) {
        if targets.is_empty() {
            return;
        }
        let Some(text) = encode(frame) else {
            return;
        };
        if let Err(e) = self.message_pusher.broadcast(targets, &text).await {
            tracing::warn!("Broadcast failed: {}", e);
        }
    }
}

fn encode(frame: &ServerFrame) -> Option<String> {
    match frame.encode() {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::error!("Failed to encode frame {:?}: {}", frame, e);
            None
        }
    }
}
