//! The bot's single control loop: admin commands over the keyword list, and
//! relaying keyword matches into the day's sheet.

mod command;
mod relay;

pub use command::{Command, HELP_TEXT};
pub use relay::RelayBot;
