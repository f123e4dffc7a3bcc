//! Repository trait 定義
//!
//! ドメイン層が必要とするパーティ状態へのアクセスインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 原子性
//!
//! 各メソッドは 1 回の呼び出しが 1 つの不可分な操作として実行されることを
//! 実装側に要求します。戻り値はロック外で安全に使える所有データです。

use async_trait::async_trait;

use super::{
    CommandDelivery, Connection, ConnectionId, DisplayName, HeartbeatSweep, Party, PartyCode,
    PartyPassword, PartySettings, PartySnapshot, RepositoryError, Timestamp,
};

/// Party Repository trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[async_trait]
pub trait PartyRepository: Send + Sync {
    /// 接続を登録し、実際に割り当てた ID を返す
    async fn register_connection(&self, candidate: ConnectionId, now: Timestamp) -> ConnectionId;

    /// 接続を登録解除
    async fn unregister_connection(&self, id: &ConnectionId);

    /// パーティを作成（作成者がホストになる）
    async fn create_party(
        &self,
        creator: &ConnectionId,
        display_name: DisplayName,
        settings: PartySettings,
    ) -> Result<PartySnapshot, RepositoryError>;

    /// 既存パーティへ参加
    async fn join_party(
        &self,
        id: &ConnectionId,
        code: &PartyCode,
        password: &PartyPassword,
        display_name: DisplayName,
    ) -> Result<PartySnapshot, RepositoryError>;

    /// パーティから離脱（通知が必要な場合のみスナップショットを返す）
    async fn leave_party(&self, id: &ConnectionId) -> Option<PartySnapshot>;

    /// ホスト権限の切り替え（変更があった場合のみスナップショットを返す）
    async fn toggle_host(
        &self,
        requester: &ConnectionId,
        target: &ConnectionId,
    ) -> Option<PartySnapshot>;

    /// チャットの配信先（送信者を含む）
    async fn chat_recipients(&self, sender: &ConnectionId) -> Vec<ConnectionId>;

    /// コマンドの配信先（送信者を除く、受信者ごとの遅延補正付き）
    async fn command_recipients(&self, sender: &ConnectionId) -> Vec<CommandDelivery>;

    /// pong を記録し、計測した往復時間を返す
    async fn record_pong(&self, id: &ConnectionId, now: Timestamp) -> Option<u64>;

    /// heartbeat の 1 周分の判定
    async fn sweep(&self, now: Timestamp) -> HeartbeatSweep;

    async fn get_party(&self, code: &PartyCode) -> Option<Party>;

    async fn get_connection(&self, id: &ConnectionId) -> Option<Connection>;

    async fn count_parties(&self) -> usize;

    async fn count_connections(&self) -> usize;
}
