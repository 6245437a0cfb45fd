/// Admin commands the bot understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    KeywordsList,
    KeywordAdd(String),
    KeywordRemove(String),
    KeywordClean,
    SheetLink,
    Help,
}

pub const HELP_TEXT: &str = "Available commands:\n\
/keywords_list - Show the current keywords.\n\
/keyword_add - Add keywords (space separated).\n\
/keyword_remove - Remove a keyword.\n\
/keyword_clean - Clear the keyword list.\n\
/sheet_link - Get the link to the Google Sheets spreadsheet.\n\
/help - Show this help.";

impl Command {
    /// `None` for names the bot does not handle.
    pub fn parse(name: &str, args: &str) -> Option<Self> {
        let command = match name {
            "keywords_list" => Self::KeywordsList,
            "keyword_add" => Self::KeywordAdd(args.to_string()),
            "keyword_remove" => Self::KeywordRemove(args.to_string()),
            "keyword_clean" => Self::KeywordClean,
            "sheet_link" => Self::SheetLink,
            "help" => Self::Help,
            _ => return None,
        };
        Some(command)
    }
}
