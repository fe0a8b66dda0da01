//! Spreadsheet normalizer.
//!
//! Turns the raw cell grid of the picks sheet into typed `BetRecord`s
//! plus the `GlobalStats` stored in the sheet's labeled summary rows.
//!
//! The sheet layout is loose: a header row, a body of one row per pick,
//! and three summary rows ("picks", "acierto", "yield") somewhere below
//! the body. The summary rows are found by keyword rather than position,
//! and the first "picks" row closes the body. Rows that cannot become a
//! record are returned as `RejectedRow`s with a reason instead of being
//! dropped silently.

pub mod dates;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

use crate::types::{
    cell_at, BetRecord, Cell, GlobalStats, NormalizedSheet, RawRow, RejectReason, RejectedRow,
};

// ---------------------------------------------------------------------------
// Sheet layout
// ---------------------------------------------------------------------------

pub const KEYWORD_COL: usize = 0;
pub const DATE_COL: usize = 1;
pub const STAKE_COL: usize = 2;
pub const ODDS_COL: usize = 3;
pub const PROFIT_COL: usize = 4;
pub const YIELD_COL: usize = 5;
pub const AMOUNT_COL: usize = 6;
pub const LABEL_COL: usize = 7;

/// Rows before the body (the column header).
pub const HEADER_ROWS: usize = 1;

/// Picks dated before this year are placeholder rows.
pub const DEFAULT_MIN_YEAR: i32 = 2024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SummaryKey {
    Picks,
    HitRate,
    Yield,
}

/// Summary keywords, checked in this order against the first cell.
const SUMMARY_KEYWORDS: &[(&str, SummaryKey)] = &[
    ("picks", SummaryKey::Picks),
    ("acierto", SummaryKey::HitRate),
    ("yield", SummaryKey::Yield),
];

// ---------------------------------------------------------------------------
// Summary scan
// ---------------------------------------------------------------------------

/// Result of scanning the grid for summary rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryScan {
    pub stats: GlobalStats,
    /// Exclusive end of the body: the first "picks" row, or the grid length.
    pub body_end: usize,
}

fn summary_key(cell: &Cell) -> Option<SummaryKey> {
    let label = cell.as_text()?.trim().to_lowercase();
    SUMMARY_KEYWORDS
        .iter()
        .find(|(keyword, _)| label.contains(keyword))
        .map(|(_, key)| *key)
}

/// Locate the summary rows anywhere in the grid.
///
/// Hit rate and yield are stored as fractions and come back scaled to
/// percentages. A keyword matched by several rows takes the last value.
pub fn scan_summary(rows: &[RawRow]) -> SummaryScan {
    let mut stats = GlobalStats::default();
    let mut body_end = rows.len();

    for (index, row) in rows.iter().enumerate() {
        let Some(key) = summary_key(cell_at(row, KEYWORD_COL)) else {
            continue;
        };
        let value = cell_at(row, 1).as_number().unwrap_or(0.0);
        match key {
            SummaryKey::Picks => {
                stats.picks = value;
                body_end = body_end.min(index);
            }
            SummaryKey::HitRate => stats.hit_rate_pct = value * 100.0,
            SummaryKey::Yield => stats.yield_pct = value * 100.0,
        }
    }

    SummaryScan { stats, body_end }
}

// ---------------------------------------------------------------------------
// Date resolution
// ---------------------------------------------------------------------------

/// Outcome of resolving one row's date cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedDate {
    Date(NaiveDate),
    /// Blank cell and nothing earlier to carry forward.
    Missing,
    Unparseable(String),
}

/// Resolve a date cell against the last successfully decoded date.
///
/// Returns the resolution and the carry-forward value for the next row.
/// Any successful decode replaces the carried date, even one that is
/// later rejected by the year floor; failed decodes leave it untouched.
pub fn resolve_date(
    cell: &Cell,
    carried: Option<NaiveDate>,
) -> (ResolvedDate, Option<NaiveDate>) {
    let decoded = match cell {
        Cell::Number(serial) => dates::from_serial(*serial).ok_or_else(|| serial.to_string()),
        Cell::Text(text) if !cell.is_blank() => dates::parse_text(text).ok_or_else(|| text.clone()),
        _ => {
            let resolved = carried.map_or(ResolvedDate::Missing, ResolvedDate::Date);
            return (resolved, carried);
        }
    };

    match decoded {
        Ok(date) => (ResolvedDate::Date(date), Some(date)),
        Err(raw) => (ResolvedDate::Unparseable(raw), carried),
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizerConfig {
    pub min_year: i32,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            min_year: DEFAULT_MIN_YEAR,
        }
    }
}

pub struct Normalizer {
    config: NormalizerConfig,
}

/// Label text, if the cell holds one. Empty text, zero, NaN and `false`
/// count as missing; whitespace is a label like any other text.
fn label_of(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Number(n) if *n == 0.0 || n.is_nan() => None,
        Cell::Bool(false) => None,
        other => other.as_text().filter(|s| !s.is_empty()),
    }
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalize a full sheet grid.
    ///
    /// Never fails: rows that cannot be used end up in `rejected`.
    pub fn normalize(&self, rows: &[RawRow]) -> NormalizedSheet {
        let SummaryScan { stats, body_end } = scan_summary(rows);
        let body: &[RawRow] = if body_end > HEADER_ROWS {
            &rows[HEADER_ROWS..body_end]
        } else {
            &[]
        };

        let (_, records, rejected) = body.iter().enumerate().fold(
            (None, Vec::new(), Vec::new()),
            |(carried, mut records, mut rejected), (offset, row)| {
                let row_index = HEADER_ROWS + offset;
                let (resolved, carried) = resolve_date(cell_at(row, DATE_COL), carried);

                match self.classify(row, resolved) {
                    Ok((date, label)) => {
                        let id = records.len();
                        records.push(build_record(id, row_index, date, label, row));
                    }
                    Err(reason) => {
                        debug!(row = row_index, %reason, "Row rejected");
                        rejected.push(RejectedRow {
                            row: row_index,
                            reason,
                        });
                    }
                }

                (carried, records, rejected)
            },
        );

        info!(
            rows = rows.len(),
            body_rows = body.len(),
            records = records.len(),
            rejected = rejected.len(),
            picks = stats.picks,
            hit_rate_pct = stats.hit_rate_pct,
            yield_pct = stats.yield_pct,
            "Sheet normalized"
        );

        NormalizedSheet {
            global_stats: stats,
            records,
            rejected,
        }
    }

    /// Decide whether a body row becomes a record.
    fn classify(
        &self,
        row: &[Cell],
        date: ResolvedDate,
    ) -> Result<(NaiveDate, String), RejectReason> {
        let label = label_of(cell_at(row, LABEL_COL)).ok_or(RejectReason::MissingLabel)?;

        let date = match date {
            ResolvedDate::Date(date) => date,
            ResolvedDate::Missing => return Err(RejectReason::MissingDate),
            ResolvedDate::Unparseable(raw) => return Err(RejectReason::UnparseableDate { raw }),
        };

        if date.year() < self.config.min_year {
            return Err(RejectReason::BeforeYearFloor { date });
        }

        Ok((date, label))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

fn build_record(
    id: usize,
    source_row: usize,
    date: NaiveDate,
    label: String,
    row: &[Cell],
) -> BetRecord {
    let profit = cell_at(row, PROFIT_COL).as_number();
    BetRecord {
        id,
        source_row,
        date,
        date_display: dates::format_dmy(date),
        stake: cell_at(row, STAKE_COL).as_number(),
        odds: cell_at(row, ODDS_COL).as_number(),
        profit,
        yield_ratio: cell_at(row, YIELD_COL).as_number(),
        amount: cell_at(row, AMOUNT_COL).as_number(),
        label,
        is_win: profit.is_some_and(|p| p > 0.0),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
