//! Client-side view of the party.

use party_relay_server::infrastructure::dto::PartyDto;

/// Latest snapshot plus who "me" is.
#[derive(Debug, Default)]
pub struct PartyView {
    party: Option<PartyDto>,
    me: Option<String>,
}

impl PartyView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fresh snapshot. The first snapshot a connection receives is
    /// sent right after it entered, so its last member is this client.
    pub fn update(&mut self, party: PartyDto) {
        if self.me.is_none() {
            self.me = party.members.last().map(|member| member.user_id.clone());
        }
        self.party = Some(party);
    }

    pub fn party(&self) -> Option<&PartyDto> {
        self.party.as_ref()
    }

    pub fn me(&self) -> Option<&str> {
        self.me.as_deref()
    }

    /// Display name of a member, or the raw id if unknown.
    pub fn display_name<'a>(&'a self, user_id: &'a str) -> &'a str {
        self.party
            .as_ref()
            .and_then(|party| party.members.iter().find(|m| m.user_id == user_id))
            .map_or(user_id, |member| member.user_name.as_str())
    }
}
