//! Domain → DTO conversions for the `party:` snapshot frame.

use crate::domain::{MemberSnapshot, PartySnapshot};

use super::websocket::{MemberDto, PartyDto};

impl From<&MemberSnapshot> for MemberDto {
    fn from(member: &MemberSnapshot) -> Self {
        Self {
            user_id: member.id.as_str().to_string(),
            user_name: member.display_name.as_str().to_string(),
            is_host: member.is_host,
        }
    }
}

impl From<&PartySnapshot> for PartyDto {
    fn from(snapshot: &PartySnapshot) -> Self {
        Self {
            name: snapshot.name.as_str().to_string(),
            code: snapshot.code.as_str().to_string(),
            members: snapshot.members.iter().map(MemberDto::from).collect(),
        }
    }
}
