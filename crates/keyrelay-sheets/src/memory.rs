//! In-memory [`SheetsApi`] backend for dry runs and tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::info;

use crate::{SheetsApi, SheetsError};

/// One recorded `append_values` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendRecord {
    pub range: String,
    pub values: Vec<String>,
}

/// Keeps sheet titles and appended rows in process memory.
///
/// Nothing is validated against real sheet occupancy, so it behaves like a
/// spreadsheet nobody else writes to.
#[derive(Default)]
pub struct MemorySheets {
    titles: Mutex<Vec<String>>,
    appends: Mutex<Vec<AppendRecord>>,
    fail_appends: AtomicBool,
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given sheets already present.
    pub fn with_titles(titles: &[&str]) -> Self {
        Self {
            titles: Mutex::new(titles.iter().map(|t| t.to_string()).collect()),
            ..Self::default()
        }
    }

    /// Make subsequent appends fail with a 503 until switched back.
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub fn titles(&self) -> Vec<String> {
        lock(&self.titles).clone()
    }

    pub fn appends(&self) -> Vec<AppendRecord> {
        lock(&self.appends).clone()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl SheetsApi for MemorySheets {
    async fn sheet_titles(&self, _spreadsheet_id: &str) -> Result<Vec<String>, SheetsError> {
        Ok(self.titles())
    }

    async fn add_sheet(&self, _spreadsheet_id: &str, title: &str) -> Result<(), SheetsError> {
        let mut titles = lock(&self.titles);
        if titles.iter().any(|t| t == title) {
            return Err(SheetsError::Api {
                status: 400,
                body: format!("A sheet with the name \"{title}\" already exists."),
            });
        }
        titles.push(title.to_string());
        Ok(())
    }

    async fn append_values(
        &self,
        _spreadsheet_id: &str,
        range: &str,
        values: &[String],
    ) -> Result<(), SheetsError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(SheetsError::Api {
                status: 503,
                body: "backend unavailable".into(),
            });
        }
        info!(range, ?values, "dry-run append");
        lock(&self.appends).push(AppendRecord {
            range: range.to_string(),
            values: values.to_vec(),
        });
        Ok(())
    }
}
