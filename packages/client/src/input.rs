//! Parsing of lines typed at the prompt.

use party_relay_server::infrastructure::dto::ClientFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInput<'a> {
    Chat(&'a str),
    /// `/cmd <text>`
    Command(&'a str),
    /// `/toggle <userId>`
    Toggle(&'a str),
    /// `/quit`
    Quit,
}

impl<'a> UserInput<'a> {
    pub fn parse(line: &'a str) -> Self {
        if line == "/quit" {
            Self::Quit
        } else if let Some(text) = line.strip_prefix("/cmd ") {
            Self::Command(text.trim())
        } else if let Some(target) = line.strip_prefix("/toggle ") {
            Self::Toggle(target.trim())
        } else {
            Self::Chat(line)
        }
    }

    /// Wire frame for this input; `None` for `/quit`.
    pub fn to_frame(&self) -> Option<String> {
        let frame = match self {
            Self::Chat(text) => ClientFrame::Chat(text),
            Self::Command(text) => ClientFrame::Command(text),
            Self::Toggle(target) => ClientFrame::ToggleHost(target),
            Self::Quit => return None,
        };
        Some(frame.encode())
    }
}
