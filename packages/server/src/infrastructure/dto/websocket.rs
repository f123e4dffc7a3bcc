//! Text frame protocol spoken after the handshake.
//!
//! | Direction        | Frame                                   |
//! |------------------|-----------------------------------------|
//! | server → client  | `ping`, `upgrade`, `badroom`            |
//! | server → client  | `party:<json>`                          |
//! | server → client  | `msg:<senderId>:<text>`                 |
//! | server → client  | `cmd:<latencyMs>:<text>`                |
//! | client → server  | `pong`, `msg:<text>`, `cmd:<text>`, `toggle:<userId>` |

use serde::{Deserialize, Serialize};

pub const PING: &str = "ping";
pub const PONG: &str = "pong";
pub const UPGRADE: &str = "upgrade";
pub const BAD_ROOM: &str = "badroom";
pub const PARTY_PREFIX: &str = "party:";
pub const CHAT_PREFIX: &str = "msg:";
pub const COMMAND_PREFIX: &str = "cmd:";
pub const TOGGLE_PREFIX: &str = "toggle:";

/// Member entry of the `party:` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub user_id: String,
    pub user_name: String,
    pub is_host: bool,
}

/// `party:` payload: full state of one party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyDto {
    pub name: String,
    pub code: String,
    pub members: Vec<MemberDto>,
}

/// Frame received from a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientFrame<'a> {
    Chat(&'a str),
    Command(&'a str),
    ToggleHost(&'a str),
    Pong,
}

impl<'a> ClientFrame<'a> {
    /// Classify a text frame. Prefixes are case-sensitive; anything else is
    /// `None` and gets dropped by the caller.
    pub fn parse(text: &'a str) -> Option<Self> {
        if let Some(body) = text.strip_prefix(CHAT_PREFIX) {
            Some(Self::Chat(body))
        } else if let Some(body) = text.strip_prefix(TOGGLE_PREFIX) {
            Some(Self::ToggleHost(body))
        } else if let Some(body) = text.strip_prefix(COMMAND_PREFIX) {
            Some(Self::Command(body))
        } else if text == PONG {
            Some(Self::Pong)
        } else {
            None
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Chat(text) => format!("{CHAT_PREFIX}{text}"),
            Self::Command(text) => format!("{COMMAND_PREFIX}{text}"),
            Self::ToggleHost(user_id) => format!("{TOGGLE_PREFIX}{user_id}"),
            Self::Pong => PONG.to_string(),
        }
    }
}

/// Frame sent by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    Ping,
    Upgrade,
    BadRoom,
    Party(PartyDto),
    Chat { sender_id: String, text: String },
    Command { latency_ms: u64, text: String },
}

impl ServerFrame {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let frame = match self {
            Self::Ping => PING.to_string(),
            Self::Upgrade => UPGRADE.to_string(),
            Self::BadRoom => BAD_ROOM.to_string(),
            Self::Party(party) => format!("{PARTY_PREFIX}{}", serde_json::to_string(party)?),
            Self::Chat { sender_id, text } => format!("{CHAT_PREFIX}{sender_id}:{text}"),
            Self::Command { latency_ms, text } => format!("{COMMAND_PREFIX}{latency_ms}:{text}"),
        };
        Ok(frame)
    }

    /// Inverse of [`ServerFrame::encode`], used by clients.
    ///
    /// The sender id of a chat line ends at the first `:`; the rest is the
    /// text verbatim.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            PING => return Some(Self::Ping),
            UPGRADE => return Some(Self::Upgrade),
            BAD_ROOM => return Some(Self::BadRoom),
            _ => {}
        }

        if let Some(json) = text.strip_prefix(PARTY_PREFIX) {
            serde_json::from_str(json).ok().map(Self::Party)
        } else if let Some(body) = text.strip_prefix(CHAT_PREFIX) {
            let (sender_id, text) = body.split_once(':')?;
            Some(Self::Chat {
                sender_id: sender_id.to_string(),
                text: text.to_string(),
            })
        } else if let Some(body) = text.strip_prefix(COMMAND_PREFIX) {
            let (latency, text) = body.split_once(':')?;
            Some(Self::Command {
                latency_ms: latency.parse().ok()?,
                text: text.to_string(),
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_frames() {
        // テスト項目: 4 種類のクライアントフレームが prefix で分類される
        // given (前提条件):
        let frames = [
            "msg:hello: world",
            "cmd:play:{\"time\":12.5}",
            "toggle:abc==",
            "pong",
        ];

        // when (操作):
        let parsed: Vec<Option<ClientFrame>> = frames.iter().map(|f| ClientFrame::parse(f)).collect();

        // then (期待する結果):
        assert_eq!(
            parsed,
            vec![
                Some(ClientFrame::Chat("hello: world")),
                Some(ClientFrame::Command("play:{\"time\":12.5}")),
                Some(ClientFrame::ToggleHost("abc==")),
                Some(ClientFrame::Pong),
            ]
        );
    }

    #[test]
    fn test_unrecognized_client_frames_are_dropped() {
        // テスト項目: 未知のフレームや大文字小文字違いは None になる
        // given (前提条件):
        let frames = ["MSG:hi", "Pong", "pong ", "ping", "", "party:{}"];

        // when (操作):
        let parsed: Vec<Option<ClientFrame>> = frames.iter().map(|f| ClientFrame::parse(f)).collect();

        // then (期待する結果):
        assert!(parsed.iter().all(Option::is_none));
    }

    #[test]
    fn test_encode_party_frame_uses_camel_case_keys() {
        // テスト項目: party: フレームの JSON が userId/userName/isHost のキーで出力される
        // given (前提条件):
        let frame = ServerFrame::Party(PartyDto {
            name: "MyRoom".to_string(),
            code: "SABCDE".to_string(),
            members: vec![MemberDto {
                user_id: "k1".to_string(),
                user_name: "Alice".to_string(),
                is_host: true,
            }],
        });

        // when (操作):
        let encoded = frame.encode().unwrap();

        // then (期待する結果):
        assert_eq!(
            encoded,
            r#"party:{"name":"MyRoom","code":"SABCDE","members":[{"userId":"k1","userName":"Alice","isHost":true}]}"#
        );
    }

    #[test]
    fn test_encode_relay_frames() {
        // テスト項目: チャットとコマンドの中継フレームが prefix 付きで出力される
        // given (前提条件):
        let chat = ServerFrame::Chat {
            sender_id: "k1".to_string(),
            text: "hi: there".to_string(),
        };
        let command = ServerFrame::Command {
            latency_ms: 130,
            text: "pause".to_string(),
        };

        // when (操作):
        let chat = chat.encode().unwrap();
        let command = command.encode().unwrap();

        // then (期待する結果):
        assert_eq!(chat, "msg:k1:hi: there");
        assert_eq!(command, "cmd:130:pause");
        assert_eq!(ServerFrame::BadRoom.encode().unwrap(), "badroom");
        assert_eq!(ServerFrame::Upgrade.encode().unwrap(), "upgrade");
        assert_eq!(ServerFrame::Ping.encode().unwrap(), "ping");
    }

    #[test]
    fn test_parse_server_frames() {
        // テスト項目: クライアント側でサーバーフレームを解析できる
        // given (前提条件):
        let chat = "msg:k1:hello:world";
        let command = "cmd:42:seek:{\"t\":3}";
        let broken_command = "cmd:abc:seek";

        // when (操作):
        let chat = ServerFrame::parse(chat);
        let command = ServerFrame::parse(command);
        let broken = ServerFrame::parse(broken_command);

        // then (期待する結果):
        assert_eq!(
            chat,
            Some(ServerFrame::Chat {
                sender_id: "k1".to_string(),
                text: "hello:world".to_string(),
            })
        );
        assert_eq!(
            command,
            Some(ServerFrame::Command {
                latency_ms: 42,
                text: "seek:{\"t\":3}".to_string(),
            })
        );
        assert_eq!(broken, None);
        assert_eq!(ServerFrame::parse("ping"), Some(ServerFrame::Ping));
    }
}
