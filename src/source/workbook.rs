//! Spreadsheet workbook source.
//!
//! Reads an `.xlsx` / `.xls` / `.ods` document from a local path or an
//! HTTP(S) URL and decodes one sheet with `calamine`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use reqwest::Client;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use super::SheetSource;
use crate::types::{Cell, PicksError, RawRow};

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    Url(String),
}

impl Location {
    /// `http://` and `https://` are URLs; anything else is a file path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Location::Url(raw.to_string())
        } else {
            Location::File(PathBuf::from(raw))
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Url(url) => write!(f, "{url}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        // Date-formatted cells keep their serial; the normalizer decodes it.
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

/// Convert a calamine range to rows addressed from A1.
///
/// calamine trims the range to the used area, so a sheet whose first
/// used cell is B3 would otherwise come back shifted up and left.
pub fn range_to_rows(range: &Range<Data>) -> Vec<RawRow> {
    let Some((first_row, first_col)) = range.start() else {
        return Vec::new();
    };

    let mut rows: Vec<RawRow> = vec![Vec::new(); first_row as usize];
    rows.extend(range.rows().map(|cells| {
        let mut row = vec![Cell::Empty; first_col as usize];
        row.extend(cells.iter().map(to_cell));
        row
    }));
    rows
}

/// Decode one sheet of an in-memory workbook.
pub fn decode_sheet(bytes: Vec<u8>, sheet_name: &str) -> Result<Vec<RawRow>, PicksError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| PicksError::Workbook(e.to_string()))?;

    if !workbook.sheet_names().iter().any(|name| name == sheet_name) {
        return Err(PicksError::SheetNotFound(sheet_name.to_string()));
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| PicksError::Workbook(e.to_string()))?;

    let rows = range_to_rows(&range);
    debug!(sheet = sheet_name, rows = rows.len(), "Sheet decoded");
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Workbook read from a file or URL on every `load_sheet` call.
pub struct WorkbookSource {
    http: Client,
    location: Location,
}

impl WorkbookSource {
    pub fn new(location: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("PICKS/0.1.0 (ledger-loader)")
            .build()
            .context("Failed to build HTTP client for workbook source")?;

        Ok(Self {
            http,
            location: Location::parse(location),
        })
    }

    fn fetch_error(&self, message: impl ToString) -> PicksError {
        PicksError::Fetch {
            location: self.location.to_string(),
            message: message.to_string(),
        }
    }

    async fn fetch_bytes(&self) -> Result<Vec<u8>, PicksError> {
        match &self.location {
            Location::File(path) => tokio::fs::read(path).await.map_err(|e| self.fetch_error(e)),
            Location::Url(url) => {
                let resp = self
                    .http
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| self.fetch_error(e))?;

                if !resp.status().is_success() {
                    return Err(self.fetch_error(format!("HTTP {}", resp.status())));
                }

                let bytes = resp.bytes().await.map_err(|e| self.fetch_error(e))?;
                Ok(bytes.to_vec())
            }
        }
    }
}

#[async_trait]
impl SheetSource for WorkbookSource {
    async fn load_sheet(&self, sheet_name: &str) -> Result<Vec<RawRow>, PicksError> {
        let bytes = self.fetch_bytes().await?;
        info!(location = %self.location, bytes = bytes.len(), "Workbook fetched");
        decode_sheet(bytes, sheet_name)
    }

    fn describe(&self) -> String {
        self.location.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
