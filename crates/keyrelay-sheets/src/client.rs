//! Append client: one spreadsheet, a row cursor per process, and the
//! ensure-sheet / append-row / link operations the relay loop calls.

use std::sync::{Mutex, MutexGuard};

use keyrelay_core::CursorPolicy;
use tracing::{info, warn};

use crate::{SheetsApi, SheetsError};

/// Appends rows to dated sheets of a single spreadsheet.
///
/// The row cursor is the next row to write in the current sheet. It starts at
/// 1, resets to 1 when [`ensure_sheet`](Self::ensure_sheet) creates a sheet,
/// and is advanced by [`append_row`](Self::append_row) before the remote call
/// is made. Cursor updates are serialized by a mutex; the remote calls are not.
///
/// The cursor is not reconciled with the sheet's real contents. Another writer,
/// or a restart partway through a day, makes appends overwrite earlier rows.
pub struct SheetClient<A> {
    api: A,
    spreadsheet_id: String,
    policy: CursorPolicy,
    cursor: Mutex<u32>,
}

impl<A: SheetsApi> SheetClient<A> {
    pub fn new(api: A, spreadsheet_id: impl Into<String>, policy: CursorPolicy) -> Self {
        Self {
            api,
            spreadsheet_id: spreadsheet_id.into(),
            policy,
            cursor: Mutex::new(1),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Create the sheet `name` if the spreadsheet does not have it yet.
    ///
    /// Returns `true` if a sheet was created, in which case the cursor is back at 1.
    pub async fn ensure_sheet(&self, name: &str) -> Result<bool, SheetsError> {
        let titles = self.api.sheet_titles(&self.spreadsheet_id).await?;
        if titles.iter().any(|t| t == name) {
            return Ok(false);
        }

        self.api.add_sheet(&self.spreadsheet_id, name).await?;
        *self.lock_cursor() = 1;
        info!(sheet = name, "created sheet, row cursor reset");
        Ok(true)
    }

    /// Append `values` as one row of sheet `name` at the cursor row.
    ///
    /// Returns the row that was written.
    pub async fn append_row(&self, name: &str, values: &[String]) -> Result<u32, SheetsError> {
        let row = self.reserve_row();
        let range = a1_range(name, row);

        match self
            .api
            .append_values(&self.spreadsheet_id, &range, values)
            .await
        {
            Ok(()) => Ok(row),
            Err(e) => {
                if self.policy == CursorPolicy::Confirmed && self.release_row(row) {
                    warn!(sheet = name, row, "append failed, row handed back");
                }
                Err(e)
            }
        }
    }

    /// Browser link to the spreadsheet. No network call.
    pub fn sheet_link(&self) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/edit#gid=0",
            self.spreadsheet_id
        )
    }

    /// The row the next append will target.
    pub fn current_row(&self) -> u32 {
        *self.lock_cursor()
    }

    fn reserve_row(&self) -> u32 {
        let mut cursor = self.lock_cursor();
        let row = *cursor;
        *cursor += 1;
        row
    }

    /// Roll the cursor back to `row` unless a later row was reserved meanwhile.
    fn release_row(&self, row: u32) -> bool {
        let mut cursor = self.lock_cursor();
        if *cursor == row + 1 {
            *cursor = row;
            true
        } else {
            false
        }
    }

    // The cursor is a plain `u32` and stays valid after a panic; poison is ignored.
    fn lock_cursor(&self) -> MutexGuard<'_, u32> {
        self.cursor
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A1 reference to column A of `row` in `sheet`, quoting the sheet name when
/// it contains anything besides ASCII letters, digits, `-` and `_`.
pub fn a1_range(sheet: &str, row: u32) -> String {
    let plain = sheet
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if plain {
        format!("{sheet}!A{row}")
    } else {
        format!("'{}'!A{row}", sheet.replace('\'', "''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySheets;

    fn client(api: MemorySheets, policy: CursorPolicy) -> SheetClient<MemorySheets> {
        SheetClient::new(api, "sheet-xyz", policy)
    }

    fn row(text: &str) -> Vec<String> {
        vec![text.to_string()]
    }

    #[tokio::test]
    async fn new_sheet_starts_at_row_one_then_two() {
        let c = client(MemorySheets::new(), CursorPolicy::Optimistic);
        assert!(c.ensure_sheet("2026-10-14").await.unwrap());
        assert_eq!(c.append_row("2026-10-14", &row("first")).await.unwrap(), 1);
        assert_eq!(c.append_row("2026-10-14", &row("second")).await.unwrap(), 2);

        let appends = c.api().appends();
        assert_eq!(appends[0].range, "2026-10-14!A1");
        assert_eq!(appends[1].range, "2026-10-14!A2");
        assert_eq!(appends[1].values, row("second"));
    }

    #[tokio::test]
    async fn existing_sheet_is_not_recreated() {
        let c = client(
            MemorySheets::with_titles(&["2026-10-14"]),
            CursorPolicy::Optimistic,
        );
        c.append_row("2026-10-14", &row("a")).await.unwrap();
        assert!(!c.ensure_sheet("2026-10-14").await.unwrap());
        assert_eq!(c.current_row(), 2);
        assert_eq!(c.api().titles(), vec!["2026-10-14"]);
    }

    #[tokio::test]
    async fn creating_next_days_sheet_resets_cursor() {
        let c = client(MemorySheets::new(), CursorPolicy::Optimistic);
        c.ensure_sheet("2026-10-14").await.unwrap();
        c.append_row("2026-10-14", &row("a")).await.unwrap();
        c.append_row("2026-10-14", &row("b")).await.unwrap();
        assert_eq!(c.current_row(), 3);

        c.ensure_sheet("2026-10-15").await.unwrap();
        assert_eq!(c.current_row(), 1);
        assert_eq!(c.append_row("2026-10-15", &row("c")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn optimistic_failure_leaves_cursor_ahead() {
        let c = client(MemorySheets::new(), CursorPolicy::Optimistic);
        c.ensure_sheet("s").await.unwrap();
        c.api().set_fail_appends(true);
        assert!(c.append_row("s", &row("lost")).await.is_err());
        assert_eq!(c.current_row(), 2);

        c.api().set_fail_appends(false);
        assert_eq!(c.append_row("s", &row("next")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn confirmed_failure_hands_row_back() {
        let c = client(MemorySheets::new(), CursorPolicy::Confirmed);
        c.ensure_sheet("s").await.unwrap();
        c.api().set_fail_appends(true);
        let err = c.append_row("s", &row("lost")).await.unwrap_err();
        assert!(matches!(err, SheetsError::Api { status: 503, .. }));
        assert_eq!(c.current_row(), 1);

        c.api().set_fail_appends(false);
        assert_eq!(c.append_row("s", &row("retry")).await.unwrap(), 1);
    }

    #[test]
    fn release_row_skips_when_later_row_reserved() {
        let c = client(MemorySheets::new(), CursorPolicy::Confirmed);
        let first = c.reserve_row();
        let _second = c.reserve_row();
        assert!(!c.release_row(first));
        assert_eq!(c.current_row(), 3);
    }

    #[test]
    fn sheet_link_is_deterministic() {
        let c = client(MemorySheets::new(), CursorPolicy::Optimistic);
        assert_eq!(
            c.sheet_link(),
            "https://docs.google.com/spreadsheets/d/sheet-xyz/edit#gid=0"
        );
        assert_eq!(c.sheet_link(), c.sheet_link());
    }

    #[test]
    fn a1_range_quotes_when_needed() {
        assert_eq!(a1_range("2026-10-14", 3), "2026-10-14!A3");
        assert_eq!(a1_range("My Sheet", 1), "'My Sheet'!A1");
        assert_eq!(a1_range("Bob's", 2), "'Bob''s'!A2");
    }

    #[tokio::test]
    async fn poisoned_cursor_lock_still_counts_rows() {
        let c = client(MemorySheets::new(), CursorPolicy::Optimistic);
        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = c.cursor.lock().unwrap();
            panic!("writer died holding the cursor");
        }));
        assert!(poisoned.is_err());
        assert!(c.cursor.is_poisoned());

        assert_eq!(c.append_row("2026-10-14", &row("a")).await.unwrap(), 1);
        assert_eq!(c.append_row("2026-10-14", &row("b")).await.unwrap(), 2);
    }
}
