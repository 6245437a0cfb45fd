//! Telegram client on teloxide: `getMe` on connect, a dispatcher polling in
//! the background, and `sendMessage` replies.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::Bot;
use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
use teloxide::requests::Requester;
use teloxide::types::{ChatId, Message};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::TelegramError;
use crate::update::Update;

/// Outbound side of the chat platform, as seen by the relay loop.
#[async_trait]
pub trait Replier: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;
}

#[async_trait]
impl<T: Replier + ?Sized> Replier for Arc<T> {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        (**self).send_text(chat_id, text).await
    }
}

/// Bot bound to one token.
pub struct TelegramBot {
    bot: Bot,
}

impl TelegramBot {
    /// Build the bot and verify the token with `getMe`.
    pub async fn connect(token: &str) -> Result<Self, TelegramError> {
        let bot = Bot::new(token);
        let me = bot.get_me().await?;
        info!(
            bot_id = me.user.id.0,
            username = me.user.username.as_deref().unwrap_or(""),
            "authorized on telegram"
        );
        Ok(Self { bot })
    }

    /// Start long polling in the background.
    ///
    /// Only `message` updates are forwarded, into a channel holding up to
    /// `buffer` entries. The dispatcher logs and retries polling errors on its
    /// own; the returned handle is aborted on shutdown.
    pub fn spawn_poller(&self, buffer: usize) -> (mpsc::Receiver<Update>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let bot = self.bot.clone();
        let handle = tokio::spawn(async move {
            let handler =
                teloxide::types::Update::filter_message().endpoint(move |message: Message| {
                    let tx = tx.clone();
                    async move {
                        if tx.send(Update::from_message(&message)).await.is_err() {
                            debug!("update receiver dropped");
                        }
                        Ok::<(), teloxide::RequestError>(())
                    }
                });
            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
            info!("update poller stopped");
        });
        (rx, handle)
    }
}

#[async_trait]
impl Replier for TelegramBot {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }
}
