//! Sheet sources.
//!
//! Defines the `SheetSource` trait and provides:
//! - `WorkbookSource`: a spreadsheet file read from disk or over HTTP(S)
//! - `MemorySource`: an in-memory grid, for tests and fixtures

pub mod workbook;

use async_trait::async_trait;

use crate::types::{PicksError, RawRow};

pub use workbook::{decode_sheet, Location, WorkbookSource};

/// Abstraction over wherever the picks sheet lives.
///
/// Implementors return the full cell grid of one named sheet, with row 0
/// and column 0 at cell A1. A missing sheet or unreadable document is an
/// error; bad individual rows are not (the normalizer deals with those).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Fetch and decode the named sheet.
    async fn load_sheet(&self, sheet_name: &str) -> Result<Vec<RawRow>, PicksError>;

    /// Human-readable location for logging.
    fn describe(&self) -> String;
}

/// A fixed grid held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sheet_name: String,
    rows: Vec<RawRow>,
}

impl MemorySource {
    pub fn new(sheet_name: &str, rows: Vec<RawRow>) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            rows,
        }
    }
}

#[async_trait]
impl SheetSource for MemorySource {
    async fn load_sheet(&self, sheet_name: &str) -> Result<Vec<RawRow>, PicksError> {
        if sheet_name != self.sheet_name {
            return Err(PicksError::SheetNotFound(sheet_name.to_string()));
        }
        Ok(self.rows.clone())
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.sheet_name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
