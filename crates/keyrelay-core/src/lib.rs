pub mod config;
pub mod error;
pub mod keywords;

pub use config::{Config, CursorPolicy, GoogleCredentials, RelaySettings, TelegramCredentials};
pub use error::ConfigError;
pub use keywords::{KeywordSet, sheet_name_for};
