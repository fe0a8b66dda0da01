//! Shared types for the PICKS ledger.
//!
//! These types form the data model used across all modules: raw sheet
//! cells on the way in, normalized bet records in the middle, and the
//! derived views handed to the dashboard on the way out.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Raw sheet data
// ---------------------------------------------------------------------------

/// A single untyped spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

/// One sheet row. Cells past the end of the row read as `Cell::Empty`.
pub type RawRow = Vec<Cell>;

const EMPTY_CELL: Cell = Cell::Empty;

/// Cell at `col`, or `Empty` when the row is shorter.
pub fn cell_at(row: &[Cell], col: usize) -> &Cell {
    row.get(col).unwrap_or(&EMPTY_CELL)
}

impl Cell {
    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric value of the cell. Text holding a plain decimal number
    /// counts; anything else is `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Display text of the cell. Integral numbers render without a
    /// fractional part (`23`, not `23.0`).
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(format_number(*n)),
            Cell::Bool(b) => Some(b.to_string()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

// ---------------------------------------------------------------------------
// Normalized records
// ---------------------------------------------------------------------------

/// A single settled bet, normalized from one sheet row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetRecord {
    /// Position within the accepted record sequence.
    pub id: usize,
    /// Absolute sheet row the record was read from.
    pub source_row: usize,
    pub date: NaiveDate,
    /// `DD/MM/YYYY`
    pub date_display: String,
    pub stake: Option<f64>,
    pub odds: Option<f64>,
    pub profit: Option<f64>,
    /// Per-pick yield as a ratio (0.25 = 25%).
    pub yield_ratio: Option<f64>,
    pub amount: Option<f64>,
    /// Team or selection.
    pub label: String,
    pub is_win: bool,
}

impl fmt::Display for BetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (stake: {} | odds: {} | profit: {:+.2})",
            self.date_display,
            self.label,
            self.stake.map(|s| format!("{s}")).unwrap_or_else(|| "-".into()),
            self.odds.map(|o| format!("{o}")).unwrap_or_else(|| "-".into()),
            self.profit.unwrap_or(0.0),
        )
    }
}

impl BetRecord {
    /// ISO `YYYY-MM-DD` form of the date, used for range filtering.
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Helper to build a test record with sensible defaults.
    #[cfg(test)]
    pub fn sample(id: usize, date: NaiveDate, stake: f64, profit: f64) -> Self {
        BetRecord {
            id,
            source_row: id + 1,
            date,
            date_display: date.format("%d/%m/%Y").to_string(),
            stake: Some(stake),
            odds: Some(1.90),
            profit: Some(profit),
            yield_ratio: Some(if stake > 0.0 { profit / stake } else { 0.0 }),
            amount: None,
            label: format!("Team {id}"),
            is_win: profit > 0.0,
        }
    }
}

/// Summary statistics read from the keyword rows of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub picks: f64,
    pub hit_rate_pct: f64,
    pub yield_pct: f64,
}

impl fmt::Display for GlobalStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "picks: {} | hit rate: {:.2}% | yield: {:.2}%",
            self.picks, self.hit_rate_pct, self.yield_pct
        )
    }
}

/// Why a body row did not become a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    MissingLabel,
    /// Blank date cell and no earlier date to carry forward.
    MissingDate,
    UnparseableDate { raw: String },
    BeforeYearFloor { date: NaiveDate },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingLabel => write!(f, "missing label"),
            RejectReason::MissingDate => write!(f, "missing date"),
            RejectReason::UnparseableDate { raw } => write!(f, "unparseable date {raw:?}"),
            RejectReason::BeforeYearFloor { date } => write!(f, "date {date} before year floor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub row: usize,
    pub reason: RejectReason,
}

/// Output of the normalizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSheet {
    pub global_stats: GlobalStats,
    pub records: Vec<BetRecord>,
    pub rejected: Vec<RejectedRow>,
}

/// The handoff contract consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerData {
    pub global_stats: GlobalStats,
    pub table_data: Vec<BetRecord>,
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// Which record subset the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Weekly,
    Range,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Weekly => write!(f, "weekly"),
            ViewMode::Range => write!(f, "range"),
        }
    }
}

/// Records falling in one ISO week.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekBucket {
    /// e.g. `2024-W07`
    pub week_id: String,
    pub label: String,
    pub items: Vec<BetRecord>,
}

/// One point of the cumulative profit chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitPoint {
    pub date: String,
    pub profit: f64,
}

/// Statistics computed over the records currently in view.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsetStats {
    pub picks: usize,
    pub hit_rate_pct: f64,
    pub yield_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRef {
    pub week_id: String,
    pub label: String,
}

/// Everything the dashboard needs to render one state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub view_mode: ViewMode,
    pub start_date: String,
    pub end_date: String,
    pub week_index: usize,
    pub week_count: usize,
    pub current_week: Option<WeekRef>,
    pub stats: SubsetStats,
    pub chart: Vec<ProfitPoint>,
    /// Active records, newest first.
    pub table: Vec<BetRecord>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for PICKS.
#[derive(Debug, thiserror::Error)]
pub enum PicksError {
    #[error("Fetch error ({location}): {message}")]
    Fetch { location: String, message: String },

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Ledger already loaded or failed; load runs once")]
    AlreadyLoaded,

    #[error("Ledger not loaded")]
    NotLoaded,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
