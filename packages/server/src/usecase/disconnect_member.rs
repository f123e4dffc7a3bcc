//! UseCase: 切断処理
//!
//! 自発的な切断・通信エラー・heartbeat による強制切断のいずれでも、
//! 接続ごとに 1 回だけ呼ばれます。

use std::sync::Arc;

use crate::domain::{ConnectionId, PartyRepository, PartySnapshot};

use super::broadcast::BroadcastDispatcher;

/// 切断のユースケース
pub struct DisconnectMemberUseCase {
    repository: Arc<dyn PartyRepository>,
    dispatcher: Arc<BroadcastDispatcher>,
}

impl DisconnectMemberUseCase {
    pub fn new(repository: Arc<dyn PartyRepository>, dispatcher: Arc<BroadcastDispatcher>) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    /// 切断を実行
    ///
    /// 1. 送信チャンネルを外す（以後この接続には何も届かない）
    /// 2. パーティから離脱（必要ならホストを昇格、空ならパーティを削除）
    /// 3. 接続の記録を削除
    /// 4. 残ったメンバーにスナップショットを配信
    ///
    /// # Returns
    ///
    /// 残りのメンバーに配信したスナップショット（誰もいなければ `None`）
    pub async fn execute(&self, id: &ConnectionId) -> Option<PartySnapshot> {
        self.dispatcher.detach(id).await;
        let _order = self.dispatcher.order_snapshots().await;
        let snapshot = self.repository.leave_party(id).await;
        self.repository.unregister_connection(id).await;
        tracing::info!("Connection '{}' disconnected", id);

        if let Some(snapshot) = &snapshot {
            self.dispatcher.party_snapshot(snapshot).await;
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            DisplayName, OutboundFrame, PartyName, PartyPassword, PartySettings, Timestamp,
        },
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryPartyRepository,
        },
    };
    use tokio::sync::{Notify, mpsc};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - ホストが抜けたときに残りの先頭メンバーがホストになり、通知されること
    // - 最後の 1 人が抜けるとパーティが消え、誰にも通知されないこと
    // - 切断した本人には何も届かないこと
    // ========================================

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    async fn setup(
        members: &[&str],
    ) -> (
        Arc<InMemoryPartyRepository>,
        DisconnectMemberUseCase,
        Vec<mpsc::UnboundedReceiver<OutboundFrame>>,
    ) {
        let repository = Arc::new(InMemoryPartyRepository::default());
        let dispatcher = Arc::new(BroadcastDispatcher::new(Arc::new(
            WebSocketMessagePusher::default(),
        )));
        let mut receivers = Vec::new();
        let mut code = None;
        for name in members {
            let member = repository
                .register_connection(id(name), Timestamp::new(0))
                .await;
            let (tx, rx) = mpsc::unbounded_channel();
            dispatcher
                .attach(member.clone(), tx, Arc::new(Notify::new()))
                .await;
            receivers.push(rx);
            match &code {
                None => {
                    let settings = PartySettings {
                        name: PartyName::new("MyRoom"),
                        password: PartyPassword::default(),
                        join_as_host: false,
                    };
                    let snapshot = repository
                        .create_party(&member, DisplayName::new(*name), settings)
                        .await
                        .unwrap();
                    code = Some(snapshot.code);
                }
                Some(code) => {
                    repository
                        .join_party(
                            &member,
                            code,
                            &PartyPassword::default(),
                            DisplayName::new(*name),
                        )
                        .await
                        .unwrap();
                }
            }
        }
        let usecase = DisconnectMemberUseCase::new(repository.clone(), dispatcher);
        (repository, usecase, receivers)
    }

    #[tokio::test]
    async fn test_host_leaving_promotes_first_remaining_member() {
        // テスト項目: ホストが抜けると残りの先頭メンバーがホストになり、通知される
        // given (前提条件):
        let (repository, usecase, mut receivers) = setup(&["alice", "bob", "carol"]).await;

        // when (操作):
        let snapshot = usecase.execute(&id("alice")).await.unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.member_ids(), vec![id("bob"), id("carol")]);
        assert!(snapshot.members[0].is_host);
        assert!(!snapshot.members[1].is_host);
        assert_eq!(repository.count_connections().await, 2);

        let bob_frame = receivers[1].recv().await.unwrap();
        let OutboundFrame::Text(bob_frame) = bob_frame else {
            panic!("expected text frame");
        };
        assert!(bob_frame.contains(r#"{"userId":"bob","userName":"bob","isHost":true}"#));
        // 本人の送信チャンネルは外されている
        assert_eq!(receivers[0].recv().await, None);
    }

    #[tokio::test]
    async fn test_last_member_leaving_deletes_party() {
        // テスト項目: 最後のメンバーが抜けるとパーティが削除され、通知はない
        // given (前提条件):
        let (repository, usecase, _receivers) = setup(&["alice"]).await;

        // when (操作):
        let snapshot = usecase.execute(&id("alice")).await;

        // then (期待する結果):
        assert_eq!(snapshot, None);
        assert_eq!(repository.count_parties().await, 0);
        assert_eq!(repository.count_connections().await, 0);
    }

    #[tokio::test]
    async fn test_disconnect_outside_party_is_noop() {
        // テスト項目: パーティに入っていない接続の切断は記録の削除だけ行う
        // given (前提条件):
        let repository = Arc::new(InMemoryPartyRepository::default());
        let dispatcher = Arc::new(BroadcastDispatcher::new(Arc::new(
            WebSocketMessagePusher::default(),
        )));
        repository
            .register_connection(id("loner"), Timestamp::new(0))
            .await;
        let usecase = DisconnectMemberUseCase::new(repository.clone(), dispatcher);

        // when (操作):
        let snapshot = usecase.execute(&id("loner")).await;

        // then (期待する結果):
        assert_eq!(snapshot, None);
        assert_eq!(repository.count_connections().await, 0);
    }
}
