//! UseCase: 生存確認（heartbeat）と遅延計測
//!
//! 周期的な呼び出し自体は UI 層の driver タスク（`ui/heartbeat.rs`）が行います。

use std::sync::Arc;

use party_relay_shared::time::Clock;

use crate::domain::{ConnectionId, HeartbeatSweep, PartyRepository, Timestamp};

use super::broadcast::BroadcastDispatcher;

pub struct HeartbeatUseCase {
    repository: Arc<dyn PartyRepository>,
    dispatcher: Arc<BroadcastDispatcher>,
    clock: Arc<dyn Clock>,
}

impl HeartbeatUseCase {
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

    /// 全接続に対する 1 回分の生存確認
    ///
    /// 前回の ping に応答しなかった接続は送信キューを待たずに切断し、
    /// それ以外には新しい ping を送ります。
    /// 切断された接続の離脱処理は、その接続の切断パスで行われます。
    pub async fn sweep(&self) -> HeartbeatSweep {
        let now = Timestamp::new(self.clock.now_millis());
        let sweep = self.repository.sweep(now).await;

        for id in &sweep.expired {
            tracing::info!("Connection '{}' missed its heartbeat, terminating", id);
            self.dispatcher.terminate(id).await;
        }
        tracing::debug!(
            "Heartbeat: {} pinged, {} expired",
            sweep.pinged.len(),
            sweep.expired.len()
        );
        self.dispatcher.ping(sweep.pinged.clone()).await;

        sweep
    }

    /// `pong` を記録し、計測した往復遅延（ミリ秒）を返す
    pub async fn record_pong(&self, id: &ConnectionId) -> Option<u64> {
        let now = Timestamp::new(self.clock.now_millis());
        let latency = self.repository.record_pong(id, now).await;
        if let Some(latency) = latency {
            tracing::trace!("Connection '{}' latency {}ms", id, latency);
        }
        latency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::OutboundFrame,
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryPartyRepository,
        },
    };
    use party_relay_shared::time::FixedClock;
    use std::time::Duration;
    use tokio::sync::{Notify, mpsc};

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_silent_connection_is_terminated_on_next_sweep() {
        // テスト項目: ping に応答しない接続は次の sweep で切断要求を受け、応答した接続は残る
        // given (前提条件):
        let repository = Arc::new(InMemoryPartyRepository::default());
        let dispatcher = Arc::new(BroadcastDispatcher::new(Arc::new(
            WebSocketMessagePusher::default(),
        )));
        let clock = Arc::new(FixedClock::new(0));
        let usecase = HeartbeatUseCase::new(repository.clone(), dispatcher.clone(), clock.clone());

        let (tx_alice, mut rx_alice) = mpsc::unbounded_channel();
        let (tx_bob, mut rx_bob) = mpsc::unbounded_channel();
        let terminate_alice = Arc::new(Notify::new());
        let terminate_bob = Arc::new(Notify::new());
        for (name, tx, terminate) in [
            ("alice", tx_alice, terminate_alice.clone()),
            ("bob", tx_bob, terminate_bob.clone()),
        ] {
            let member = repository.register_connection(id(name), Timestamp::new(0)).await;
            dispatcher.attach(member, tx, terminate).await;
        }

        // when (操作):
        clock.set(30_000);
        let first = usecase.sweep().await;
        clock.advance(25);
        let latency = usecase.record_pong(&id("alice")).await;
        clock.set(60_000);
        let second = usecase.sweep().await;

        // then (期待する結果):
        assert!(first.expired.is_empty());
        assert_eq!(first.pinged.len(), 2);
        assert_eq!(latency, Some(25));
        assert_eq!(second.expired, vec![id("bob")]);
        assert_eq!(second.pinged, vec![id("alice")]);

        let ping = Some(OutboundFrame::Text("ping".to_string()));
        assert_eq!(rx_alice.recv().await, ping);
        assert_eq!(rx_alice.recv().await, ping);
        assert_eq!(rx_bob.recv().await, ping);
        // 切断は送信キューを経由しない
        assert!(rx_bob.try_recv().is_err());
        let bob_terminated =
            tokio::time::timeout(Duration::from_secs(1), terminate_bob.notified()).await;
        assert!(bob_terminated.is_ok());
        let alice_terminated =
            tokio::time::timeout(Duration::from_millis(50), terminate_alice.notified()).await;
        assert!(alice_terminated.is_err());
    }

    #[tokio::test]
    async fn test_pong_from_unknown_connection_is_ignored() {
        // テスト項目: 登録されていない接続からの pong は無視される
        // given (前提条件):
        let usecase = HeartbeatUseCase::new(
            Arc::new(InMemoryPartyRepository::default()),
            Arc::new(BroadcastDispatcher::new(Arc::new(
                WebSocketMessagePusher::default(),
            ))),
            Arc::new(FixedClock::new(0)),
        );

        // when (操作):
        let latency = usecase.record_pong(&id("ghost")).await;

        // then (期待する結果):
        assert_eq!(latency, None);
    }
}
