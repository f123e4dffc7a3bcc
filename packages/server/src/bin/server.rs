//! Watch-party relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin party-relay-server
//! cargo run --bin party-relay-server -- --host 0.0.0.0 --port 7860 --server-prefix E
//! ```

use clap::Parser;
use party_relay_server::{
    config::{DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_HOST, DEFAULT_PORT, ServerConfig},
    domain::DEFAULT_SERVER_PREFIX,
    ui::Server,
};
use party_relay_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "party-relay-server")]
#[command(about = "Watch-party relay server over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Character prepended to every generated party code
    #[arg(long, env = "SERVER_PREFIX", default_value_t = DEFAULT_SERVER_PREFIX)]
    server_prefix: char,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        server_prefix: args.server_prefix,
        heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
    };
    tracing::info!(
        "Party codes will be prefixed with '{}'",
        config.server_prefix
    );

    let server = Server::in_memory(&config);
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
