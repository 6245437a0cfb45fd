//! The runtime keyword list and the dated sheet name matched messages go to.

use chrono::NaiveDate;

/// Ordered, duplicate-tolerant keyword list. Lives for the process lifetime only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    words: Vec<String>,
}

impl KeywordSet {
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// True if any keyword occurs in `text`. Case-sensitive substring test.
    pub fn matches(&self, text: &str) -> bool {
        self.words.iter().any(|k| text.contains(k.as_str()))
    }

    /// Append every whitespace-separated token of `args`, returning how many were added.
    pub fn add_tokens(&mut self, args: &str) -> usize {
        let before = self.words.len();
        // Runs of spaces yield no empty keywords; a single-space split would
        // store "" and match every message.
        self.words.extend(args.split_whitespace().map(str::to_string));
        self.words.len() - before
    }

    /// Remove the first entry equal to `word`. Returns false if there was none.
    pub fn remove_first(&mut self, word: &str) -> bool {
        match self.words.iter().position(|k| k == word) {
            Some(i) => {
                self.words.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Comma-separated listing, e.g. `a, b, c`.
    pub fn joined(&self) -> String {
        self.words.join(", ")
    }
}

/// Sheet name for a calendar day: `YYYY-MM-DD`.
pub fn sheet_name_for(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
