//! Spreadsheet side of the relay: Google Sheets HTTP transport, service-account
//! token exchange, and the row-cursor append client the bot drives.

mod api;
mod auth;
mod client;
mod error;
mod memory;
#[cfg(test)]
mod testing;

pub use api::{GoogleSheets, SheetsApi};
pub use auth::ServiceAccountAuth;
pub use client::{SheetClient, a1_range};
pub use error::SheetsError;
pub use memory::{AppendRecord, MemorySheets};
