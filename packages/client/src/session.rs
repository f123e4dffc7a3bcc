//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use party_relay_server::infrastructure::dto::{Handshake, ServerFrame};
use party_relay_shared::time::unix_millis;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        self, Message,
        client::IntoClientRequest,
        http::{HeaderValue, header::SEC_WEBSOCKET_PROTOCOL},
    },
};

use crate::{
    domain::PartyView,
    error::ClientError,
    formatter::MessageFormatter,
    input::UserInput,
    ui::redisplay_prompt,
};

/// Run one session: connect, enter the party, relay until `/quit` or the
/// connection ends. There is no reconnection.
pub async fn run_client_session(url: &str, handshake: &Handshake) -> Result<(), ClientError> {
    let mut request = url
        .into_client_request()
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    let token = HeaderValue::from_str(&handshake.to_token())
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, token);

    let (ws_stream, _response) = connect_async(request).await.map_err(|e| match e {
        tungstenite::Error::Http(response) => ClientError::Rejected(response.status().to_string()),
        other => ClientError::ConnectionError(other.to_string()),
    })?;

    let name = handshake.display_name().as_str().to_string();
    tracing::info!("Connected to relay at {}", url);
    println!(
        "\nYou are '{}'. Type to chat, /cmd <text> to send a command, /toggle <userId> to toggle host, /quit to exit.\n",
        name
    );

    let (mut write, mut read) = ws_stream.split();

    // Everything bound for the server goes through this channel
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();

    let mut write_task = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if let Err(e) = write.send(Message::Text(frame.into())).await {
                tracing::warn!("Failed to send frame: {}", e);
                return Err(ClientError::ConnectionError(e.to_string()));
            }
        }
        let _ = write.close().await;
        Ok(())
    });

    let pong_tx = out_tx.clone();
    let prompt_name = name.clone();
    let mut read_task = tokio::spawn(async move {
        let mut view = PartyView::new();

        while let Some(message) = read.next().await {
            let text = match message {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
            };

            match ServerFrame::parse(text.as_str()) {
                Some(ServerFrame::Ping) => {
                    let _ = pong_tx.send("pong".to_string());
                    continue;
                }
                Some(ServerFrame::Upgrade) => return Err(ClientError::UpgradeRequired),
                Some(ServerFrame::BadRoom) => return Err(ClientError::BadRoom),
                Some(ServerFrame::Party(party)) => {
                    view.update(party);
                    if let Some(party) = view.party() {
                        print!("{}", MessageFormatter::format_party(party, view.me()));
                    }
                }
                Some(ServerFrame::Chat { sender_id, text }) => {
                    let from = view.display_name(&sender_id);
                    print!(
                        "{}",
                        MessageFormatter::format_chat_message(from, &text, unix_millis())
                    );
                }
                Some(ServerFrame::Command { latency_ms, text }) => {
                    print!("{}", MessageFormatter::format_command(latency_ms, &text));
                }
                None => print!("{}", MessageFormatter::format_raw_message(text.as_str())),
            }
            redisplay_prompt(&prompt_name);
        }

        Err(ClientError::ConnectionError(
            "Server closed the connection".to_string(),
        ))
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", name);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    let mut input_task = tokio::spawn(async move {
        while let Some(line) = input_rx.recv().await {
            let input = UserInput::parse(&line);
            let Some(frame) = input.to_frame() else {
                break;
            };
            if out_tx.send(frame).is_err() {
                break;
            }
        }
    });

    // If any one of the tasks completes, abort the others
    let result = tokio::select! {
        read_result = &mut read_task => {
            read_result.unwrap_or_else(|e| Err(ClientError::ConnectionError(e.to_string())))
        }
        write_result = &mut write_task => {
            write_result.unwrap_or_else(|e| Err(ClientError::ConnectionError(e.to_string())))
        }
        _ = &mut input_task => Ok(()),
    };
    read_task.abort();
    write_task.abort();
    input_task.abort();

    result
}
