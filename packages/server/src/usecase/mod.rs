//! UseCase 層
//!
//! ユースケースごとにファイルを分け、Repository と MessagePusher の trait だけに依存します。
//!
//! - `connect_member`: 接続の受付とパーティへの入室
//! - `disconnect_member`: 切断とホスト引き継ぎ
//! - `relay_message`: チャットと再生コマンドの中継
//! - `toggle_host`: ホスト権限の切り替え
//! - `heartbeat`: 生存確認と遅延計測
//! - `broadcast`: 上記が共有する送信窓口

pub mod broadcast;
pub mod connect_member;
pub mod disconnect_member;
pub mod error;
pub mod heartbeat;
pub mod relay_message;
pub mod toggle_host;

pub use broadcast::BroadcastDispatcher;
pub use connect_member::ConnectMemberUseCase;
pub use disconnect_member::DisconnectMemberUseCase;
pub use error::ConnectError;
pub use heartbeat::HeartbeatUseCase;
pub use relay_message::RelayMessageUseCase;
pub use toggle_host::ToggleHostUseCase;
