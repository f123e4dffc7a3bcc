//! Data Transfer Objects
//!
//! ワイヤーフォーマット（ハンドシェイクトークンとテキストフレーム）と
//! ドメインモデルの間の変換を担当します。

pub mod conversion;
pub mod handshake;
pub mod websocket;

pub use handshake::{Handshake, HandshakeError, SUPPORTED_VERSION, parse_handshake};
pub use websocket::{ClientFrame, MemberDto, PartyDto, ServerFrame};
