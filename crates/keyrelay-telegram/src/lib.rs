//! Telegram side of the relay: a teloxide bot, a background dispatcher feeding
//! updates into a channel, and the command/message split the relay loop
//! dispatches on.

mod bot;
mod error;
mod update;

pub use bot::{Replier, TelegramBot};
pub use error::TelegramError;
pub use update::Update;
