//! Value Object 定義
//!
//! 接続 ID・パーティコード・表示名などのプリミティブをラップし、
//! 既定値の補完や比較規則をここに閉じ込めます。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

/// Fallback display name for members who did not provide one.
pub const DEFAULT_DISPLAY_NAME: &str = "Anonymous";

/// Fallback party name.
pub const DEFAULT_PARTY_NAME: &str = "Watch Party";

/// Stable per-connection identifier.
///
/// Assigned once at accept time and never reused while the connection lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::EmptyConnectionId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ConnectionId {
    type Error = ValueObjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Human-typable party identifier.
///
/// Any string is accepted: codes typed by users are looked up as-is and an
/// unknown code simply fails the join.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyCode(String);

impl PartyCode {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Member display name; empty input falls back to [`DEFAULT_DISPLAY_NAME`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self(DEFAULT_DISPLAY_NAME.to_string())
        } else {
            Self(value)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DisplayName {
    fn default() -> Self {
        Self(DEFAULT_DISPLAY_NAME.to_string())
    }
}

/// Party display name; empty input falls back to [`DEFAULT_PARTY_NAME`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyName(String);

impl PartyName {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self(DEFAULT_PARTY_NAME.to_string())
        } else {
            Self(value)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PartyName {
    fn default() -> Self {
        Self(DEFAULT_PARTY_NAME.to_string())
    }
}

/// Plaintext shared secret. Empty means the party is open.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct PartyPassword(String);

impl PartyPassword {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn is_open(&self) -> bool {
        self.0.is_empty()
    }

    /// Exact, case-sensitive comparison.
    pub fn matches(&self, attempt: &PartyPassword) -> bool {
        self.0 == attempt.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// パスワードはログに出さない
impl fmt::Debug for PartyPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_open() {
            f.write_str("PartyPassword(<open>)")
        } else {
            f.write_str("PartyPassword(<redacted>)")
        }
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, clamped at zero.
    pub fn millis_since(&self, earlier: Timestamp) -> u64 {
        u64::try_from(self.0.saturating_sub(earlier.0)).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_rejects_empty() {
        // テスト項目: 空文字列の ConnectionId は作成できない
        // given (前提条件):
        let value = String::new();

        // when (操作):
        let result = ConnectionId::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyConnectionId));
    }

    #[test]
    fn test_connection_id_keeps_value() {
        // テスト項目: ConnectionId は与えられた値をそのまま保持する
        // given (前提条件):
        let value = "dGhlIHNhbXBsZSBub25jZQ==".to_string();

        // when (操作):
        let id = ConnectionId::try_from(value.clone()).unwrap();

        // then (期待する結果):
        assert_eq!(id.as_str(), value);
        assert_eq!(id.to_string(), value);
    }

    #[test]
    fn test_display_name_defaults_to_anonymous() {
        // テスト項目: 空の表示名は "Anonymous" に補完される
        // given (前提条件):
        let empty = "";

        // when (操作):
        let name = DisplayName::new(empty);

        // then (期待する結果):
        assert_eq!(name.as_str(), "Anonymous");
        assert_eq!(DisplayName::default(), name);
    }

    #[test]
    fn test_party_name_defaults_to_watch_party() {
        // テスト項目: 空のパーティ名は "Watch Party" に補完される
        // given (前提条件):
        let empty = String::new();

        // when (操作):
        let name = PartyName::new(empty);

        // then (期待する結果):
        assert_eq!(name.as_str(), "Watch Party");
        assert_eq!(PartyName::new("MyRoom").as_str(), "MyRoom");
    }

    #[test]
    fn test_password_matches_exactly() {
        // テスト項目: パスワードは完全一致のみ受け付ける
        // given (前提条件):
        let password = PartyPassword::new("Secret");

        // when (操作):
        let exact = password.matches(&PartyPassword::new("Secret"));
        let different_case = password.matches(&PartyPassword::new("secret"));
        let empty = password.matches(&PartyPassword::default());

        // then (期待する結果):
        assert!(exact);
        assert!(!different_case);
        assert!(!empty);
        assert!(!password.is_open());
    }

    #[test]
    fn test_password_debug_is_redacted() {
        // テスト項目: Debug 出力にパスワード本体が含まれない
        // given (前提条件):
        let password = PartyPassword::new("hunter2");

        // when (操作):
        let rendered = format!("{:?}", password);

        // then (期待する結果):
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_timestamp_millis_since_clamps_at_zero() {
        // テスト項目: 過去方向の差分は 0 に丸められる
        // given (前提条件):
        let earlier = Timestamp::new(1_000);
        let later = Timestamp::new(1_120);

        // when (操作):
        let forward = later.millis_since(earlier);
        let backward = earlier.millis_since(later);

        // then (期待する結果):
        assert_eq!(forward, 120);
        assert_eq!(backward, 0);
    }
}
