use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("bot API request failed: {0}")]
    Request(#[from] teloxide::RequestError),
}
