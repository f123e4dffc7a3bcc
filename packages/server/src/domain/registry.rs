//! Party registry: the authoritative code → party map and the per-connection
//! records, with the host state machine.
//!
//! This type is synchronous and not thread-safe on its own. The repository
//! wraps it in a single mutex so every method below runs as one atomic step.
//!
//! Invariants maintained by every method:
//! - a party never exists with zero members;
//! - a party with members always has at least one host.

use std::collections::HashMap;

use super::{
    entity::{
        CommandDelivery, Connection, HeartbeatSweep, MemberSnapshot, Party, PartySettings,
        PartySnapshot, latency_compensation,
    },
    error::RepositoryError,
    factory::{ConnectionIdFactory, PartyCodeFactory},
    value_object::{ConnectionId, DisplayName, PartyCode, PartyPassword, Timestamp},
};

#[derive(Debug, Default)]
pub struct PartyRegistry {
    parties: HashMap<PartyCode, Party>,
    connections: HashMap<ConnectionId, Connection>,
    code_factory: PartyCodeFactory,
}

impl PartyRegistry {
    pub fn new(code_factory: PartyCodeFactory) -> Self {
        Self {
            parties: HashMap::new(),
            connections: HashMap::new(),
            code_factory,
        }
    }

    /// Track a newly accepted connection and return the id it was stored
    /// under. A candidate already held by a live connection is replaced by a
    /// random id.
    pub fn register_connection(&mut self, candidate: ConnectionId, now: Timestamp) -> ConnectionId {
        let mut id = candidate;
        while self.connections.contains_key(&id) {
            tracing::warn!("Connection id '{}' already in use, assigning a random id", id);
            id = ConnectionIdFactory::generate();
        }
        self.connections
            .insert(id.clone(), Connection::new(id.clone(), now));
        id
    }

    /// Forget a connection. Must run after [`PartyRegistry::leave_party`].
    pub fn unregister_connection(&mut self, id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(id)
    }

    pub fn create_party(
        &mut self,
        creator: &ConnectionId,
        display_name: DisplayName,
        settings: PartySettings,
    ) -> Result<PartySnapshot, RepositoryError> {
        if !self.connections.contains_key(creator) {
            return Err(RepositoryError::ConnectionNotFound(creator.to_string()));
        }

        let parties = &self.parties;
        let code = self
            .code_factory
            .generate(|candidate| parties.contains_key(&PartyCode::new(candidate)));

        if let Some(connection) = self.connections.get_mut(creator) {
            connection.display_name = display_name;
            connection.party_code = Some(code.clone());
            connection.is_host = true;
        }

        let party = Party::new(code.clone(), settings, creator.clone());
        tracing::info!("Party '{}' ({}) created by '{}'", code, party.name.as_str(), creator);
        self.parties.insert(code.clone(), party);

        self.snapshot(&code)
            .ok_or_else(|| RepositoryError::PartyNotFound(code.to_string()))
    }

    /// Add a connection to an existing party. The joiner's role comes from
    /// the party's `join_as_host` policy alone.
    pub fn join_party(
        &mut self,
        id: &ConnectionId,
        code: &PartyCode,
        password: &PartyPassword,
        display_name: DisplayName,
    ) -> Result<PartySnapshot, RepositoryError> {
        if !self.connections.contains_key(id) {
            return Err(RepositoryError::ConnectionNotFound(id.to_string()));
        }

        let party = self
            .parties
            .get_mut(code)
            .ok_or_else(|| RepositoryError::PartyNotFound(code.to_string()))?;
        if !party.password.matches(password) {
            return Err(RepositoryError::WrongPassword(code.to_string()));
        }

        party.members.push(id.clone());
        let join_as_host = party.join_as_host;

        if let Some(connection) = self.connections.get_mut(id) {
            connection.display_name = display_name;
            connection.party_code = Some(code.clone());
            connection.is_host = join_as_host;
        }

        self.snapshot(code)
            .ok_or_else(|| RepositoryError::PartyNotFound(code.to_string()))
    }

    /// Remove a connection from its party.
    ///
    /// Returns the state the remaining members must be told about, or `None`
    /// when there is nobody to notify (not in a party, or the party was
    /// deleted because it became empty).
    pub fn leave_party(&mut self, id: &ConnectionId) -> Option<PartySnapshot> {
        let connection = self.connections.get_mut(id)?;
        let code = connection.party_code.take()?;
        connection.is_host = false;

        let party = self.parties.get_mut(&code)?;
        party.members.retain(|member| member != id);

        if party.members.is_empty() {
            self.parties.remove(&code);
            tracing::info!("Party '{}' deleted (last member left)", code);
            return None;
        }

        let has_host = party.members.iter().any(|member| {
            self.connections
                .get(member)
                .is_some_and(|connection| connection.is_host)
        });
        if !has_host {
            let successor = party.members[0].clone();
            if let Some(connection) = self.connections.get_mut(&successor) {
                connection.is_host = true;
                tracing::info!("Promoted '{}' to host of party '{}'", successor, code);
            }
        }

        self.snapshot(&code)
    }

    /// Flip `target`'s host flag on behalf of `requester`.
    ///
    /// No-op (returns `None`) when the requester is not a host, the target is
    /// not in the requester's party, or the flip would remove the last host.
    pub fn toggle_host(
        &mut self,
        requester: &ConnectionId,
        target: &ConnectionId,
    ) -> Option<PartySnapshot> {
        let requester = self.connections.get(requester)?;
        if !requester.is_host {
            return None;
        }
        let code = requester.party_code.clone()?;
        let party = self.parties.get(&code)?;
        if !party.is_member(target) {
            return None;
        }

        let host_count = self.host_count(party);
        let target_connection = self.connections.get_mut(target)?;
        if host_count <= 1 && target_connection.is_host {
            return None;
        }

        target_connection.is_host = !target_connection.is_host;
        tracing::info!(
            "Host role of '{}' in party '{}' set to {}",
            target,
            code,
            target_connection.is_host
        );

        self.snapshot(&code)
    }

    /// Everyone in the sender's party, sender included.
    pub fn chat_recipients(&self, sender: &ConnectionId) -> Vec<ConnectionId> {
        self.party_of(sender)
            .map(|party| party.members.clone())
            .unwrap_or_default()
    }

    /// Everyone in the sender's party except the sender, each with their own
    /// latency compensation.
    pub fn command_recipients(&self, sender: &ConnectionId) -> Vec<CommandDelivery> {
        let Some(party) = self.party_of(sender) else {
            return Vec::new();
        };
        let sender_latency = self
            .connections
            .get(sender)
            .map_or(0, |connection| connection.latency_ms);

        party
            .members
            .iter()
            .filter(|member| *member != sender)
            .filter_map(|member| self.connections.get(member))
            .map(|receiver| CommandDelivery {
                receiver: receiver.id.clone(),
                compensation_ms: latency_compensation(sender_latency, receiver.latency_ms),
            })
            .collect()
    }

    pub fn record_pong(&mut self, id: &ConnectionId, now: Timestamp) -> Option<u64> {
        self.connections
            .get_mut(id)
            .map(|connection| connection.record_pong(now))
    }

    /// One liveness pass: connections that never answered the previous ping
    /// are reported as expired, the rest are re-armed.
    pub fn sweep(&mut self, now: Timestamp) -> HeartbeatSweep {
        let mut sweep = HeartbeatSweep::default();
        for connection in self.connections.values_mut() {
            if connection.alive {
                connection.mark_ping_sent(now);
                sweep.pinged.push(connection.id.clone());
            } else {
                sweep.expired.push(connection.id.clone());
            }
        }
        sweep
    }

    pub fn snapshot(&self, code: &PartyCode) -> Option<PartySnapshot> {
        let party = self.parties.get(code)?;
        let members = party
            .members
            .iter()
            .filter_map(|member| self.connections.get(member))
            .map(|connection| MemberSnapshot {
                id: connection.id.clone(),
                display_name: connection.display_name.clone(),
                is_host: connection.is_host,
            })
            .collect();

        Some(PartySnapshot {
            name: party.name.clone(),
            code: party.code.clone(),
            members,
        })
    }

    pub fn party(&self, code: &PartyCode) -> Option<&Party> {
        self.parties.get(code)
    }

    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn party_count(&self) -> usize {
        self.parties.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn party_of(&self, id: &ConnectionId) -> Option<&Party> {
        let code = self.connections.get(id)?.party_code.as_ref()?;
        self.parties.get(code)
    }

    fn host_count(&self, party: &Party) -> usize {
        party
            .members
            .iter()
            .filter(|member| {
                self.connections
                    .get(*member)
                    .is_some_and(|connection| connection.is_host)
            })
            .count()
    }
}
