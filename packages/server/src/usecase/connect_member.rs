//! UseCase: 接続受付とパーティへの入室
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectMemberUseCase::register() と enter_party()
//! - 接続直後の ping 送信、作成・参加後のスナップショット配信、参加失敗時の badroom 通知
//!
//! ### なぜこのテストが必要か
//! - 最初の ping は必ず最初の `party:` より先に届かなければならない
//! - 参加に失敗した接続はメンバーにならず、切断されなければならない
//! - 同時に参加しても、各メンバーに最後に届くスナップショットは最新の構成でなければならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：パーティ作成、パスワードなしでの参加
//! - 異常系：存在しないコード、パスワード不一致
//! - エッジケース：joinAsHost が有効なパーティへの参加、複数の接続からの同時参加

use std::sync::Arc;

use party_relay_shared::time::Clock;

use crate::{
    domain::{
        ConnectionId, PartyRepository, PartySnapshot, PusherChannel, TerminateSignal, Timestamp,
    },
    infrastructure::dto::{Handshake, ServerFrame},
};

use super::{broadcast::BroadcastDispatcher, error::ConnectError};

/// 接続受付のユースケース
pub struct ConnectMemberUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn PartyRepository>,
    /// 送信窓口
    dispatcher: Arc<BroadcastDispatcher>,
    clock: Arc<dyn Clock>,
}

impl ConnectMemberUseCase {
    pub fn new(
        repository: Arc<dyn PartyRepository>,
        dispatcher: Arc<BroadcastDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            clock,
        }
    }

    /// ハンドシェイクに成功した接続を登録し、最初の ping を送る
    ///
    /// # Returns
    ///
    /// 実際に割り当てられた接続 ID（候補が使用中なら別の ID になる）
    pub async fn register(
        &self,
        candidate: ConnectionId,
        sender: PusherChannel,
        terminate: TerminateSignal,
    ) -> ConnectionId {
        let now = Timestamp::new(self.clock.now_millis());
        let id = self.repository.register_connection(candidate, now).await;
        self.dispatcher.attach(id.clone(), sender, terminate).await;
        self.dispatcher.send(&id, &ServerFrame::Ping).await;
        tracing::info!("Connection '{}' registered", id);
        id
    }

    /// ハンドシェイクの内容に従ってパーティを作成、または参加する
    ///
    /// 成功時はパーティ全員にスナップショットを配信します。
    /// 参加に失敗した場合は `badroom` を送ってから接続を閉じます。
    pub async fn enter_party(
        &self,
        id: &ConnectionId,
        handshake: Handshake,
    ) -> Result<PartySnapshot, ConnectError> {
        let _order = self.dispatcher.order_snapshots().await;
        let result = match handshake {
            Handshake::Create {
                display_name,
                settings,
            } => {
                self.repository
                    .create_party(id, display_name, settings)
                    .await
            }
            Handshake::Join {
                display_name,
                code,
                password,
            } => {
                self.repository
                    .join_party(id, &code, &password, display_name)
                    .await
            }
        };

        match result {
            Ok(snapshot) => {
                tracing::info!(
                    "Connection '{}' entered party '{}' ({} members)",
                    id,
                    snapshot.code,
                    snapshot.members.len()
                );
                self.dispatcher.party_snapshot(&snapshot).await;
                Ok(snapshot)
            }
            Err(e) => {
                tracing::warn!("Connection '{}' could not enter a party: {}", id, e);
                self.dispatcher.send(id, &ServerFrame::BadRoom).await;
                self.dispatcher.close(id).await;
                Err(ConnectError::BadRoom(e))
            }
        }
    }
}
