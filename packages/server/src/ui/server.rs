//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use party_relay_shared::time::{Clock, SystemClock};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::{MessagePusher, PartyCodeFactory, PartyRepository},
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryPartyRepository},
    usecase::{
        BroadcastDispatcher, ConnectMemberUseCase, DisconnectMemberUseCase, HeartbeatUseCase,
        RelayMessageUseCase, ToggleHostUseCase,
    },
};

use super::{
    handler::websocket_handler, heartbeat::spawn_heartbeat, signal::shutdown_signal,
    state::AppState,
};

/// WebSocket watch-party relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::in_memory(&ServerConfig::default());
/// server.run("127.0.0.1".to_string(), 7860).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    heartbeat_usecase: Arc<HeartbeatUseCase>,
    heartbeat_interval: Duration,
}

impl Server {
    pub fn new(state: AppState, heartbeat_interval: Duration) -> Self {
        Self {
            heartbeat_usecase: state.heartbeat_usecase.clone(),
            state: Arc::new(state),
            heartbeat_interval,
        }
    }

    /// Wire every dependency with the in-memory repository and the system clock.
    pub fn in_memory(config: &ServerConfig) -> Self {
        // Initialize dependencies in order:
        // 1. Repository
        // 2. MessagePusher
        // 3. UseCases
        // 4. AppState

        // 1. Create Repository (in-memory registry)
        let repository: Arc<dyn PartyRepository> = Arc::new(InMemoryPartyRepository::new(
            PartyCodeFactory::new(config.server_prefix),
        ));

        // 2. Create MessagePusher (WebSocket implementation)
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::default());
        let dispatcher = Arc::new(BroadcastDispatcher::new(message_pusher));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        // 3. Create UseCases
        let state = AppState {
            connect_member_usecase: Arc::new(ConnectMemberUseCase::new(
                repository.clone(),
                dispatcher.clone(),
                clock.clone(),
            )),
            disconnect_member_usecase: Arc::new(DisconnectMemberUseCase::new(
                repository.clone(),
                dispatcher.clone(),
            )),
            relay_message_usecase: Arc::new(RelayMessageUseCase::new(
                repository.clone(),
                dispatcher.clone(),
            )),
            toggle_host_usecase: Arc::new(ToggleHostUseCase::new(
                repository.clone(),
                dispatcher.clone(),
            )),
            heartbeat_usecase: Arc::new(HeartbeatUseCase::new(repository, dispatcher, clock)),
        };

        // 4. Create AppState
        Self::new(state, config.heartbeat_interval)
    }

    fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント（ハンドシェイクは Sec-WebSocket-Protocol で受け取る）
            .route("/", get(websocket_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the relay server until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Watch-party relay listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// The heartbeat task lives exactly as long as this call.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let heartbeat = spawn_heartbeat(self.heartbeat_usecase.clone(), self.heartbeat_interval);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        heartbeat.abort();
        result
    }
}
