//! Entities of the party domain.
//!
//! `Connection` is the per-client record (role, liveness, latency) and
//! `Party` is the code-addressed group of connections. Both are owned by the
//! `PartyRegistry`; everything handed out of the registry is an owned
//! snapshot.

use super::value_object::{
    ConnectionId, DisplayName, PartyCode, PartyName, PartyPassword, Timestamp,
};

/// Per-client record shared by the registry and the heartbeat sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub display_name: DisplayName,
    /// Party this connection belongs to; `None` until create/join succeeds.
    pub party_code: Option<PartyCode>,
    pub is_host: bool,
    /// Cleared before each ping, set again by `pong`.
    pub alive: bool,
    pub last_ping_sent_at: Timestamp,
    /// Last measured round trip in milliseconds.
    pub latency_ms: u64,
}

impl Connection {
    /// A freshly accepted connection: alive, pinged at `now`, no party.
    pub fn new(id: ConnectionId, now: Timestamp) -> Self {
        Self {
            id,
            display_name: DisplayName::default(),
            party_code: None,
            is_host: false,
            alive: true,
            last_ping_sent_at: now,
            latency_ms: 0,
        }
    }

    /// Arm a new liveness ping.
    pub fn mark_ping_sent(&mut self, now: Timestamp) {
        self.alive = false;
        self.last_ping_sent_at = now;
    }

    /// Register a `pong` and return the measured round trip.
    pub fn record_pong(&mut self, now: Timestamp) -> u64 {
        self.alive = true;
        self.latency_ms = now.millis_since(self.last_ping_sent_at);
        self.latency_ms
    }
}

/// Parameters chosen by the creator of a party.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartySettings {
    pub name: PartyName,
    pub password: PartyPassword,
    /// Every joiner starts as host when set.
    pub join_as_host: bool,
}

/// A watch party.
///
/// `members` keeps join order; index 0 is the promotion candidate when the
/// last host leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub code: PartyCode,
    pub name: PartyName,
    pub password: PartyPassword,
    pub join_as_host: bool,
    pub members: Vec<ConnectionId>,
}

impl Party {
    pub fn new(code: PartyCode, settings: PartySettings, creator: ConnectionId) -> Self {
        Self {
            code,
            name: settings.name,
            password: settings.password,
            join_as_host: settings.join_as_host,
            members: vec![creator],
        }
    }

    pub fn is_member(&self, id: &ConnectionId) -> bool {
        self.members.iter().any(|member| member == id)
    }
}

/// Member entry of a [`PartySnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSnapshot {
    pub id: ConnectionId,
    pub display_name: DisplayName,
    pub is_host: bool,
}

/// Consistent copy of a party's state, captured under the registry lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartySnapshot {
    pub name: PartyName,
    pub code: PartyCode,
    pub members: Vec<MemberSnapshot>,
}

impl PartySnapshot {
    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.members.iter().map(|member| member.id.clone()).collect()
    }

    pub fn host_count(&self) -> usize {
        self.members.iter().filter(|member| member.is_host).count()
    }
}

/// One receiver of a relayed playback command together with its
/// latency compensation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDelivery {
    pub receiver: ConnectionId,
    pub compensation_ms: u64,
}

/// Result of one heartbeat pass over every connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeartbeatSweep {
    /// Connections whose previous ping was never answered.
    pub expired: Vec<ConnectionId>,
    /// Connections that were sent a fresh ping.
    pub pinged: Vec<ConnectionId>,
}

/// Latency compensation attached to a relayed command: the rounded sum of
/// the sender's and the receiver's last round trip.
pub fn latency_compensation(sender_latency_ms: u64, receiver_latency_ms: u64) -> u64 {
    sender_latency_ms.saturating_add(receiver_latency_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    #[test]
    fn test_new_connection_is_alive_without_party() {
        // テスト項目: 新しい接続は alive かつパーティ未所属で作成される
        // given (前提条件):
        let now = Timestamp::new(1_000);

        // when (操作):
        let connection = Connection::new(id("alice"), now);

        // then (期待する結果):
        assert!(connection.alive);
        assert!(!connection.is_host);
        assert_eq!(connection.party_code, None);
        assert_eq!(connection.latency_ms, 0);
        assert_eq!(connection.last_ping_sent_at, now);
        assert_eq!(connection.display_name.as_str(), "Anonymous");
    }

    #[test]
    fn test_ping_then_pong_measures_round_trip() {
        // テスト項目: ping 送信後の pong で往復時間が計測され alive に戻る
        // given (前提条件):
        let mut connection = Connection::new(id("alice"), Timestamp::new(0));

        // when (操作):
        connection.mark_ping_sent(Timestamp::new(10_000));
        let alive_after_ping = connection.alive;
        let latency = connection.record_pong(Timestamp::new(10_087));

        // then (期待する結果):
        assert!(!alive_after_ping);
        assert!(connection.alive);
        assert_eq!(latency, 87);
        assert_eq!(connection.latency_ms, 87);
    }

    #[test]
    fn test_party_starts_with_creator_only() {
        // テスト項目: パーティは作成者のみをメンバーとして作成される
        // given (前提条件):
        let settings = PartySettings {
            name: PartyName::new("MyRoom"),
            password: PartyPassword::new("pw"),
            join_as_host: true,
        };

        // when (操作):
        let party = Party::new(PartyCode::new("SABCDE"), settings, id("alice"));

        // then (期待する結果):
        assert_eq!(party.members, vec![id("alice")]);
        assert!(party.is_member(&id("alice")));
        assert!(!party.is_member(&id("bob")));
        assert!(party.join_as_host);
        assert_eq!(party.name.as_str(), "MyRoom");
    }

    #[test]
    fn test_latency_compensation_sums_both_sides() {
        // テスト項目: 遅延補正値は送信者と受信者の往復時間の和になる
        // given (前提条件):
        let sender = 40;
        let receiver = 75;

        // when (操作):
        let compensation = latency_compensation(sender, receiver);

        // then (期待する結果):
        assert_eq!(compensation, 115);
        assert_eq!(latency_compensation(0, 0), 0);
    }
}
