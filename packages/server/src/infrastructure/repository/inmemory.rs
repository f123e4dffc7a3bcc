//! InMemory Party Repository 実装
//!
//! ドメイン層が定義する PartyRepository trait の具体的な実装。
//! `PartyRegistry` を 1 つの Mutex で包み、全ての変更（作成・参加・離脱・
//! ホスト切り替え・heartbeat）をこの 1 箇所で直列化します。
//!
//! ロック中に行うのは registry の読み書きだけで、ネットワーク送信は
//! 戻り値（所有データ）を使って呼び出し側がロック外で行います。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    CommandDelivery, Connection, ConnectionId, DisplayName, HeartbeatSweep, Party, PartyCode,
    PartyCodeFactory, PartyPassword, PartyRegistry, PartyRepository, PartySettings,
    PartySnapshot, RepositoryError, Timestamp,
};

/// インメモリ Party Repository 実装
pub struct InMemoryPartyRepository {
    registry: Mutex<PartyRegistry>,
}

impl InMemoryPartyRepository {
    /// 新しい InMemoryPartyRepository を作成
    pub fn new(code_factory: PartyCodeFactory) -> Self {
        Self {
            registry: Mutex::new(PartyRegistry::new(code_factory)),
        }
    }
}

impl Default for InMemoryPartyRepository {
    fn default() -> Self {
        Self::new(PartyCodeFactory::default())
    }
}

#[async_trait]
impl PartyRepository for InMemoryPartyRepository {
    async fn register_connection(&self, candidate: ConnectionId, now: Timestamp) -> ConnectionId {
        self.registry
            .lock()
            .await
            .register_connection(candidate, now)
    }

    async fn unregister_connection(&self, id: &ConnectionId) {
        self.registry.lock().await.unregister_connection(id);
    }

    async fn create_party(
        &self,
        creator: &ConnectionId,
        display_name: DisplayName,
        settings: PartySettings,
    ) -> Result<PartySnapshot, RepositoryError> {
        self.registry
            .lock()
            .await
            .create_party(creator, display_name, settings)
    }

    async fn join_party(
        &self,
        id: &ConnectionId,
        code: &PartyCode,
        password: &PartyPassword,
        display_name: DisplayName,
    ) -> Result<PartySnapshot, RepositoryError> {
        self.registry
            .lock()
            .await
            .join_party(id, code, password, display_name)
    }

    async fn leave_party(&self, id: &ConnectionId) -> Option<PartySnapshot> {
        self.registry.lock().await.leave_party(id)
    }

    async fn toggle_host(
        &self,
        requester: &ConnectionId,
        target: &ConnectionId,
    ) -> Option<PartySnapshot> {
        self.registry.lock().await.toggle_host(requester, target)
    }

    async fn chat_recipients(&self, sender: &ConnectionId) -> Vec<ConnectionId> {
        self.registry.lock().await.chat_recipients(sender)
    }

    async fn command_recipients(&self, sender: &ConnectionId) -> Vec<CommandDelivery> {
        self.registry.lock().await.command_recipients(sender)
    }

    async fn record_pong(&self, id: &ConnectionId, now: Timestamp) -> Option<u64> {
        self.registry.lock().await.record_pong(id, now)
    }

    async fn sweep(&self, now: Timestamp) -> HeartbeatSweep {
        self.registry.lock().await.sweep(now)
    }

    async fn get_party(&self, code: &PartyCode) -> Option<Party> {
        self.registry.lock().await.party(code).cloned()
    }

    async fn get_connection(&self, id: &ConnectionId) -> Option<Connection> {
        self.registry.lock().await.connection(id).cloned()
    }

    async fn count_parties(&self) -> usize {
        self.registry.lock().await.party_count()
    }

    async fn count_connections(&self) -> usize {
        self.registry.lock().await.connection_count()
    }
}
