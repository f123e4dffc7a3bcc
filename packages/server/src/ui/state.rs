//! Server state and connection management.

use std::sync::Arc;

use crate::usecase::{
    ConnectMemberUseCase, DisconnectMemberUseCase, HeartbeatUseCase, RelayMessageUseCase,
    ToggleHostUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectMemberUseCase（接続受付・入室のユースケース）
    pub connect_member_usecase: Arc<ConnectMemberUseCase>,
    /// DisconnectMemberUseCase（切断のユースケース）
    pub disconnect_member_usecase: Arc<DisconnectMemberUseCase>,
    /// RelayMessageUseCase（チャット・コマンド中継のユースケース）
    pub relay_message_usecase: Arc<RelayMessageUseCase>,
    /// ToggleHostUseCase（ホスト切り替えのユースケース）
    pub toggle_host_usecase: Arc<ToggleHostUseCase>,
    /// HeartbeatUseCase（pong の記録に使用）
    pub heartbeat_usecase: Arc<HeartbeatUseCase>,
}
