//! Update dispatch: commands from the admin mutate the keyword list, plain
//! messages that contain a keyword are appended to the day's sheet.

use chrono::{Local, NaiveDate};
use keyrelay_core::{KeywordSet, sheet_name_for};
use keyrelay_sheets::{SheetClient, SheetsApi};
use keyrelay_telegram::{Replier, Update};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{Command, HELP_TEXT};

const EMPTY_KEYWORDS: &str = "Keyword list is empty.";

/// The relay loop and the state it owns: the keyword list and the sheet client.
///
/// Updates are handled one at a time, each to completion.
pub struct RelayBot<S, R> {
    sheets: SheetClient<S>,
    replier: R,
    keywords: KeywordSet,
    admin_id: i64,
}

impl<S: SheetsApi, R: Replier> RelayBot<S, R> {
    pub fn new(sheets: SheetClient<S>, replier: R, keywords: KeywordSet, admin_id: i64) -> Self {
        Self {
            sheets,
            replier,
            keywords,
            admin_id,
        }
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    pub fn sheets(&self) -> &SheetClient<S> {
        &self.sheets
    }

    pub fn is_admin(&self, sender_id: Option<i64>) -> bool {
        sender_id == Some(self.admin_id)
    }

    /// Drain `updates` until the sender side closes.
    pub async fn run(&mut self, mut updates: mpsc::Receiver<Update>) {
        info!(admin_id = self.admin_id, "relay loop started");
        while let Some(update) = updates.recv().await {
            self.handle_update(update).await;
        }
        info!("update stream closed, relay loop finished");
    }

    pub async fn handle_update(&mut self, update: Update) {
        self.handle_update_on(update, Local::now().date_naive()).await;
    }

    /// Handle one update as if it arrived on `today`.
    pub async fn handle_update_on(&mut self, update: Update, today: NaiveDate) {
        match update {
            Update::Command {
                name,
                args,
                sender_id,
                chat_id,
            } => {
                if !self.is_admin(sender_id) {
                    debug!(command = %name, ?sender_id, "ignoring command from non-admin");
                    return;
                }
                match Command::parse(&name, &args) {
                    Some(command) => self.handle_command(command, chat_id).await,
                    None => debug!(command = %name, "ignoring unknown command"),
                }
            }
            Update::Message { text, .. } => {
                self.relay(&text, today).await;
            }
        }
    }

    /// Append `text` to today's sheet if it contains a keyword. Returns the
    /// row written, or `None` if nothing was appended.
    async fn relay(&self, text: &str, today: NaiveDate) -> Option<u32> {
        if !self.keywords.matches(text) {
            return None;
        }

        let sheet = sheet_name_for(today);
        if let Err(e) = self.sheets.ensure_sheet(&sheet).await {
            warn!(sheet = %sheet, error = %e, "could not ensure sheet exists");
        }

        match self.sheets.append_row(&sheet, &[text.to_string()]).await {
            Ok(row) => {
                info!(sheet = %sheet, row, "relayed matching message");
                Some(row)
            }
            Err(e) => {
                error!(sheet = %sheet, error = %e, "error appending to sheet");
                None
            }
        }
    }

    async fn handle_command(&mut self, command: Command, chat_id: i64) {
        let reply = match command {
            Command::KeywordsList => {
                let listed = if self.keywords.is_empty() {
                    EMPTY_KEYWORDS.to_string()
                } else {
                    self.keywords.joined()
                };
                format!("Current keywords: {listed}")
            }
            Command::KeywordAdd(args) => {
                let added = self.keywords.add_tokens(&args);
                info!(added, total = self.keywords.len(), "keywords added");
                "Keywords added.".to_string()
            }
            Command::KeywordRemove(word) => {
                let removed = self.keywords.remove_first(&word);
                info!(keyword = %word, removed, "keyword remove");
                format!("Keyword removed: {word}")
            }
            Command::KeywordClean => {
                self.keywords.clear();
                info!("keywords cleared");
                "Keyword list cleared.".to_string()
            }
            Command::SheetLink => format!("Google Sheets link: {}", self.sheets.sheet_link()),
            Command::Help => HELP_TEXT.to_string(),
        };
        self.reply(chat_id, &reply).await;
    }

    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.replier.send_text(chat_id, text).await {
            warn!(chat_id, error = %e, "failed to send reply");
        }
    }
}
