//! Domain layer: party state, the host state machine and the ports the
//! use cases depend on.

pub mod entity;
pub mod error;
pub mod factory;
pub mod message_pusher;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use entity::{
    CommandDelivery, Connection, HeartbeatSweep, MemberSnapshot, Party, PartySettings,
    PartySnapshot, latency_compensation,
};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use factory::{ConnectionIdFactory, DEFAULT_SERVER_PREFIX, PartyCodeFactory};
pub use message_pusher::{MessagePusher, OutboundFrame, PusherChannel, TerminateSignal};
pub use registry::PartyRegistry;
pub use repository::PartyRepository;
pub use value_object::{
    ConnectionId, DisplayName, PartyCode, PartyName, PartyPassword, Timestamp,
};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
