//! Handshake token codec.
//!
//! The token travels in the `Sec-WebSocket-Protocol` header as `#`-separated,
//! percent-encoded fields:
//!
//! ```text
//! c#<version>#<displayName>#<password>#<partyName>#<joinAsHost:"0"|"1">
//! j#<version>#<displayName>#<partyCode>#<password>
//! ```
//!
//! Missing trailing fields fall back to their defaults.

use std::borrow::Cow;

use thiserror::Error;

use crate::domain::{DisplayName, PartyCode, PartyName, PartyPassword, PartySettings};

use super::websocket::ServerFrame;

/// Protocol version this server speaks.
pub const SUPPORTED_VERSION: &str = "1";
pub const FIELD_SEPARATOR: char = '#';

const CREATE_MODE: char = 'c';
const JOIN_MODE: char = 'j';
/// Code used when a join token omits it; never matches a generated code.
const UNKNOWN_PARTY_CODE: &str = "???";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handshake {
    Create {
        display_name: DisplayName,
        settings: PartySettings,
    },
    Join {
        display_name: DisplayName,
        code: PartyCode,
        password: PartyPassword,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    #[error("handshake token is missing")]
    Missing,
    #[error("unknown handshake mode '{0}'")]
    UnknownMode(char),
    #[error("handshake field is not valid percent-encoded UTF-8")]
    InvalidEncoding,
    #[error("unsupported protocol version '{0}'")]
    VersionMismatch(String),
}

impl HandshakeError {
    /// Frame sent to the client before closing, if any.
    pub fn notice(&self) -> Option<ServerFrame> {
        match self {
            Self::VersionMismatch(_) => Some(ServerFrame::Upgrade),
            _ => None,
        }
    }
}

pub fn parse_handshake(token: &str) -> Result<Handshake, HandshakeError> {
    let mode = token.chars().next().ok_or(HandshakeError::Missing)?;
    if mode != CREATE_MODE && mode != JOIN_MODE {
        return Err(HandshakeError::UnknownMode(mode));
    }

    let fields = token
        .split(FIELD_SEPARATOR)
        .map(|field| urlencoding::decode(field).map_err(|_| HandshakeError::InvalidEncoding))
        .collect::<Result<Vec<Cow<'_, str>>, _>>()?;
    let field = |index: usize| fields.get(index).map(|f| f.as_ref()).unwrap_or("");

    let version = field(1);
    if version != SUPPORTED_VERSION {
        return Err(HandshakeError::VersionMismatch(version.to_string()));
    }

    let display_name = DisplayName::new(field(2));
    let handshake = if mode == CREATE_MODE {
        Handshake::Create {
            display_name,
            settings: PartySettings {
                password: PartyPassword::new(field(3)),
                name: PartyName::new(field(4)),
                join_as_host: field(5) == "1",
            },
        }
    } else {
        let code = match field(3) {
            "" => UNKNOWN_PARTY_CODE,
            code => code,
        };
        Handshake::Join {
            display_name,
            code: PartyCode::new(code),
            password: PartyPassword::new(field(4)),
        }
    };

    Ok(handshake)
}

impl Handshake {
    /// Encode as a handshake token for [`SUPPORTED_VERSION`].
    pub fn to_token(&self) -> String {
        let fields: Vec<String> = match self {
            Self::Create {
                display_name,
                settings,
            } => vec![
                CREATE_MODE.to_string(),
                SUPPORTED_VERSION.to_string(),
                display_name.as_str().to_string(),
                settings.password.as_str().to_string(),
                settings.name.as_str().to_string(),
                if settings.join_as_host { "1" } else { "0" }.to_string(),
            ],
            Self::Join {
                display_name,
                code,
                password,
            } => vec![
                JOIN_MODE.to_string(),
                SUPPORTED_VERSION.to_string(),
                display_name.as_str().to_string(),
                code.as_str().to_string(),
                password.as_str().to_string(),
            ],
        };

        fields
            .iter()
            .map(|field| urlencoding::encode(field).into_owned())
            .collect::<Vec<_>>()
            .join(&FIELD_SEPARATOR.to_string())
    }

    pub fn display_name(&self) -> &DisplayName {
        match self {
            Self::Create { display_name, .. } | Self::Join { display_name, .. } => display_name,
        }
    }
}
