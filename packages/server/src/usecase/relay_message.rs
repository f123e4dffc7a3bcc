//! UseCase: チャットと再生コマンドの中継

use std::sync::Arc;

use crate::domain::{ConnectionId, PartyRepository};

use super::broadcast::BroadcastDispatcher;

/// メッセージ中継のユースケース
pub struct RelayMessageUseCase {
    repository: Arc<dyn PartyRepository>,
    dispatcher: Arc<BroadcastDispatcher>,
}

impl RelayMessageUseCase {
    pub fn new(repository: Arc<dyn PartyRepository>, dispatcher: Arc<BroadcastDispatcher>) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    /// チャットを送信者を含むパーティ全員に中継
    ///
    /// # Returns
    ///
    /// 配信先の数（パーティに入っていなければ 0）
    pub async fn relay_chat(&self, sender: &ConnectionId, text: &str) -> usize {
        let recipients = self.repository.chat_recipients(sender).await;
        let count = recipients.len();
        tracing::debug!("Relaying chat from '{}' to {} members", sender, count);
        self.dispatcher.chat(recipients, sender, text).await;
        count
    }

    /// 再生コマンドを送信者以外のメンバーに、受信者ごとの遅延補正値を付けて中継
    ///
    /// # Returns
    ///
    /// 配信先の数
    pub async fn relay_command(&self, sender: &ConnectionId, text: &str) -> usize {
        let deliveries = self.repository.command_recipients(sender).await;
        let count = deliveries.len();
        tracing::debug!("Relaying command from '{}' to {} members", sender, count);
        self.dispatcher.commands(deliveries, text).await;
        count
    }
}
