//! Terminal client for the watch-party relay.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin party-relay-client -- --name Alice create --party-name "Movie Night"
//! cargo run --bin party-relay-client -- --name Bob join SABCDE
//! ```

use clap::{Parser, Subcommand};
use party_relay_client::run_client_session;
use party_relay_server::{
    domain::{DisplayName, PartyCode, PartyName, PartyPassword, PartySettings},
    infrastructure::dto::Handshake,
};
use party_relay_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "party-relay-client")]
#[command(about = "Watch-party relay terminal client", long_about = None)]
struct Args {
    /// Relay server URL
    #[arg(short = 'u', long, global = true, default_value = "ws://127.0.0.1:7860")]
    url: String,

    /// Display name shown to other members
    #[arg(short = 'n', long, global = true, default_value = "")]
    name: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new party and become its host
    Create {
        #[arg(long, default_value = "")]
        party_name: String,

        #[arg(long, default_value = "")]
        password: String,

        /// Everyone who joins becomes a host
        #[arg(long)]
        join_as_host: bool,
    },
    /// Join an existing party by code
    Join {
        code: String,

        #[arg(long, default_value = "")]
        password: String,
    },
}

impl Command {
    fn into_handshake(self, name: String) -> Handshake {
        let display_name = DisplayName::new(name);
        match self {
            Self::Create {
                party_name,
                password,
                join_as_host,
            } => Handshake::Create {
                display_name,
                settings: PartySettings {
                    name: PartyName::new(party_name),
                    password: PartyPassword::new(password),
                    join_as_host,
                },
            },
            Self::Join { code, password } => Handshake::Join {
                display_name,
                code: PartyCode::new(code.to_uppercase()),
                password: PartyPassword::new(password),
            },
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    let args = Args::parse();
    let handshake = args.command.into_handshake(args.name);

    if let Err(e) = run_client_session(&args.url, &handshake).await {
        tracing::error!("Client error: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
