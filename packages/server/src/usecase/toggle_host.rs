//! UseCase: ホスト権限の切り替え

use std::sync::Arc;

use crate::domain::{ConnectionId, PartyRepository, PartySnapshot};

use super::broadcast::BroadcastDispatcher;

/// ホスト切り替えのユースケース
pub struct ToggleHostUseCase {
    repository: Arc<dyn PartyRepository>,
    dispatcher: Arc<BroadcastDispatcher>,
}

impl ToggleHostUseCase {
    pub fn new(repository: Arc<dyn PartyRepository>, dispatcher: Arc<BroadcastDispatcher>) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    /// `target` のホスト権限を反転する
    ///
    /// 要求者がホストでない、対象が同じパーティにいない、最後のホストを
    /// 外そうとしている、のいずれかに当たる場合は何もせず `None` を返します。
    /// 拒否してもエラーフレームは送りません。
    pub async fn execute(&self, requester: &ConnectionId, target: &str) -> Option<PartySnapshot> {
        let Ok(target) = ConnectionId::try_from(target) else {
            tracing::trace!("Ignoring toggle with empty target from '{}'", requester);
            return None;
        };

        let _order = self.dispatcher.order_snapshots().await;
        let snapshot = self.repository.toggle_host(requester, &target).await;
        match &snapshot {
            Some(snapshot) => self.dispatcher.party_snapshot(snapshot).await,
            None => tracing::debug!("Toggle of '{}' by '{}' refused", target, requester),
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            DisplayName, MockMessagePusher, PartyCode, PartyPassword, PartySettings, Timestamp,
        },
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryPartyRepository,
        },
    };

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    /// alice（ホスト）と bob（非ホスト）のパーティを作る
    async fn party_of_alice_and_bob() -> (Arc<InMemoryPartyRepository>, PartyCode) {
        let repository = Arc::new(InMemoryPartyRepository::default());
        let alice = repository
            .register_connection(id("alice"), Timestamp::new(0))
            .await;
        let bob = repository
            .register_connection(id("bob"), Timestamp::new(0))
            .await;
        let code = repository
            .create_party(&alice, DisplayName::new("Alice"), PartySettings::default())
            .await
            .unwrap()
            .code;
        repository
            .join_party(&bob, &code, &PartyPassword::default(), DisplayName::new("Bob"))
            .await
            .unwrap();
        (repository, code)
    }

    #[tokio::test]
    async fn test_host_can_promote_member() {
        // テスト項目: ホストは他のメンバーをホストにでき、全員に通知される
        // given (前提条件):
        let (repository, _code) = party_of_alice_and_bob().await;
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_broadcast()
            .withf(|targets, content| targets.len() == 2 && content.starts_with("party:"))
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = ToggleHostUseCase::new(
            repository.clone(),
            Arc::new(BroadcastDispatcher::new(Arc::new(pusher))),
        );

        // when (操作):
        let snapshot = usecase.execute(&id("alice"), "bob").await.unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.host_count(), 2);
        assert!(repository.get_connection(&id("bob")).await.unwrap().is_host);
    }

    #[tokio::test]
    async fn test_non_host_toggle_emits_nothing() {
        // テスト項目: 非ホストからの切り替え要求は無視され、何も送信されない
        // given (前提条件):
        let (repository, _code) = party_of_alice_and_bob().await;
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().never();
        pusher.expect_push_to().never();
        let usecase = ToggleHostUseCase::new(
            repository.clone(),
            Arc::new(BroadcastDispatcher::new(Arc::new(pusher))),
        );

        // when (操作):
        let snapshot = usecase.execute(&id("bob"), "bob").await;

        // then (期待する結果):
        assert_eq!(snapshot, None);
        assert!(!repository.get_connection(&id("bob")).await.unwrap().is_host);
    }

    #[tokio::test]
    async fn test_sole_host_cannot_demote_self() {
        // テスト項目: 唯一のホストが自分を外そうとしても拒否される
        // given (前提条件):
        let (repository, _code) = party_of_alice_and_bob().await;
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().never();
        let usecase = ToggleHostUseCase::new(
            repository.clone(),
            Arc::new(BroadcastDispatcher::new(Arc::new(pusher))),
        );

        // when (操作):
        let snapshot = usecase.execute(&id("alice"), "alice").await;

        // then (期待する結果):
        assert_eq!(snapshot, None);
        assert!(repository.get_connection(&id("alice")).await.unwrap().is_host);
    }

    #[tokio::test]
    async fn test_host_can_step_down_once_another_host_exists() {
        // テスト項目: ホストが 2 人いれば自分のホスト権限を外せる
        // given (前提条件):
        let (repository, _code) = party_of_alice_and_bob().await;
        let usecase = ToggleHostUseCase::new(
            repository.clone(),
            Arc::new(BroadcastDispatcher::new(Arc::new(
                WebSocketMessagePusher::default(),
            ))),
        );
        usecase.execute(&id("alice"), "bob").await.unwrap();

        // when (操作):
        let snapshot = usecase.execute(&id("alice"), "alice").await.unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.host_count(), 1);
        assert!(!snapshot.members[0].is_host);
        assert!(snapshot.members[1].is_host);
    }

    #[tokio::test]
    async fn test_empty_target_is_ignored() {
        // テスト項目: 対象 ID が空の要求は無視される
        // given (前提条件):
        let (repository, _code) = party_of_alice_and_bob().await;
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().never();
        let usecase = ToggleHostUseCase::new(
            repository,
            Arc::new(BroadcastDispatcher::new(Arc::new(pusher))),
        );

        // when (操作):
        let snapshot = usecase.execute(&id("alice"), "").await;

        // then (期待する結果):
        assert_eq!(snapshot, None);
    }
}
