//! Identifier factories.
//!
//! ## Party code
//!
//! `prefix + N random characters` from an alphabet without look-alikes
//! (`0`/`O`, `1`/`I`). `N` starts at [`BASE_CODE_LENGTH`] and grows by one
//! every [`COLLISIONS_PER_EXTRA_CHAR`] collisions; every retry draws a fresh
//! code.

use rand::Rng;
use uuid::Uuid;

use super::value_object::{ConnectionId, PartyCode};

/// Characters used for the random part of a party code.
pub const PARTY_CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Random characters in a code drawn without any collision.
pub const BASE_CODE_LENGTH: usize = 5;

pub const COLLISIONS_PER_EXTRA_CHAR: usize = 3;

/// Default server-identity prefix.
pub const DEFAULT_SERVER_PREFIX: char = 'S';

/// Generates party codes for one server instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartyCodeFactory {
    prefix: char,
}

impl PartyCodeFactory {
    pub fn new(prefix: char) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> char {
        self.prefix
    }

    /// Draw a code that `is_taken` does not report as in use.
    pub fn generate<F>(&self, is_taken: F) -> PartyCode
    where
        F: Fn(&str) -> bool,
    {
        self.generate_with(&mut rand::rng(), is_taken)
    }

    /// Same as [`PartyCodeFactory::generate`] with an explicit RNG.
    pub fn generate_with<R, F>(&self, rng: &mut R, is_taken: F) -> PartyCode
    where
        R: Rng + ?Sized,
        F: Fn(&str) -> bool,
    {
        let mut collisions = 0;
        loop {
            let length = BASE_CODE_LENGTH + collisions / COLLISIONS_PER_EXTRA_CHAR;
            let code = self.draw(rng, length);
            if !is_taken(&code) {
                return PartyCode::new(code);
            }
            tracing::debug!("Party code '{}' collided (collision #{})", code, collisions + 1);
            collisions += 1;
        }
    }

    fn draw<R>(&self, rng: &mut R, length: usize) -> String
    where
        R: Rng + ?Sized,
    {
        let mut code = String::with_capacity(length + 1);
        code.push(self.prefix);
        for _ in 0..length {
            let index = rng.random_range(0..PARTY_CODE_ALPHABET.len());
            code.push(char::from(PARTY_CODE_ALPHABET[index]));
        }
        code
    }
}

impl Default for PartyCodeFactory {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_PREFIX)
    }
}

/// Derives connection ids from the upgrade request.
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// Use the client-provided handshake key when present, otherwise a random id.
    pub fn from_handshake_key(key: Option<&str>) -> ConnectionId {
        key.and_then(|key| ConnectionId::new(key.to_string()).ok())
            .unwrap_or_else(Self::generate)
    }

    /// Random id for connections without a usable key, or whose key is
    /// already held by a live connection.
    pub fn generate() -> ConnectionId {
        ConnectionId::new(Uuid::new_v4().simple().to_string())
            .unwrap_or_else(|_| unreachable!("uuid strings are never empty"))
    }
}
