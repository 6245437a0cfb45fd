//! Incoming chat messages reduced to commands and plain messages.

use teloxide::types::{Message, MessageEntityKind};

/// One incoming update, already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// `/name args` with a `bot_command` entity at offset 0.
    Command {
        name: String,
        args: String,
        sender_id: Option<i64>,
        chat_id: i64,
    },
    /// Anything else. Messages without text (photos, stickers) carry an empty string.
    Message {
        text: String,
        sender_id: Option<i64>,
        chat_id: i64,
    },
}

impl Update {
    pub(crate) fn from_message(message: &Message) -> Self {
        let sender_id = message
            .from
            .as_ref()
            .and_then(|user| i64::try_from(user.id.0).ok());
        let chat_id = message.chat.id.0;
        let text = message.text().unwrap_or_default().to_string();

        let is_command = message
            .entities()
            .and_then(|entities| entities.first())
            .is_some_and(|e| e.kind == MessageEntityKind::BotCommand && e.offset == 0);
        if !is_command {
            return Update::Message {
                text,
                sender_id,
                chat_id,
            };
        }

        let (name, args) = split_command(&text);
        Update::Command {
            name,
            args,
            sender_id,
            chat_id,
        }
    }
}

/// `"/add@relay_bot a b"` → `("add", "a b")`. One separator after the
/// command token is dropped; the rest of the arguments are kept verbatim.
fn split_command(text: &str) -> (String, String) {
    let token_end = text.find(char::is_whitespace).unwrap_or(text.len());
    let token = &text[..token_end];
    let name = token.trim_start_matches('/');
    let name = name.split_once('@').map_or(name, |(n, _)| n);

    let rest = &text[token_end..];
    let args = rest.strip_prefix(char::is_whitespace).unwrap_or(rest);
    (name.to_string(), args.to_string())
}
