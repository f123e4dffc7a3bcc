//! Server configuration.

use std::time::Duration;

use crate::domain::DEFAULT_SERVER_PREFIX;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7860;
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Prepended to every generated party code
    pub server_prefix: char,
    pub heartbeat_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            server_prefix: DEFAULT_SERVER_PREFIX,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // テスト項目: デフォルト設定が既定値になっている
        // given (前提条件):

        // when (操作):
        let config = ServerConfig::default();

        // then (期待する結果):
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 7860);
        assert_eq!(config.server_prefix, 'S');
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
    }
}
