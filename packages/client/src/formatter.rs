//! Message formatting utilities for client display.

use party_relay_server::infrastructure::dto::PartyDto;
use party_relay_shared::time::format_local_time;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a party snapshot as a member list
    ///
    /// # Arguments
    ///
    /// * `party` - The latest snapshot
    /// * `me` - The current client's user id (to mark as "me")
    pub fn format_party(party: &PartyDto, me: Option<&str>) -> String {
        let mut output = String::new();
        output.push_str("\n\n============================================================\n");
        output.push_str(&format!("Party: {} (code {})\n", party.name, party.code));

        for member in &party.members {
            let host = if member.is_host { " [host]" } else { "" };
            let me_suffix = if Some(member.user_id.as_str()) == me {
                " (me)"
            } else {
                ""
            };
            output.push_str(&format!(
                "{}{}{} - {}\n",
                member.user_name, host, me_suffix, member.user_id
            ));
        }

        output.push_str("============================================================\n");
        output
    }

    /// Format a relayed chat line
    ///
    /// # Arguments
    ///
    /// * `from` - Display name of the sender
    /// * `content` - The message content
    /// * `received_at` - Unix timestamp of arrival (milliseconds)
    pub fn format_chat_message(from: &str, content: &str, received_at: i64) -> String {
        format!(
            "\n[{}] @{}: {}\n",
            format_local_time(received_at),
            from,
            content
        )
    }

    /// Format a relayed playback command
    pub fn format_command(latency_ms: u64, content: &str) -> String {
        format!("\n▶ {} (compensate {}ms)\n", content, latency_ms)
    }

    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}
