//! Fixture sheets and a scripted sheet source for integration testing.
//!
//! `ScriptedSource` returns a fixed grid (or a forced error) and counts
//! how often it was asked, all in memory with no external dependencies.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use picks::source::SheetSource;
use picks::types::{Cell, PicksError, RawRow};

// 1900-system serials
pub const DEC_31_2023: f64 = 45291.0;
pub const JAN_01_2024: f64 = 45292.0;
pub const FEB_05_2024: f64 = 45327.0;
pub const FEB_08_2024: f64 = 45330.0;
pub const FEB_12_2024: f64 = 45334.0;

pub fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

pub fn num(x: f64) -> Cell {
    Cell::Number(x)
}

pub fn header() -> RawRow {
    vec![
        text("Tipo"),
        text("Fecha"),
        text("Stake"),
        text("Cuota"),
        text("Beneficio"),
        text("Yield"),
        Cell::Empty,
        text("Equipo / Jugada"),
    ]
}

/// A body row: date, stake, odds, profit, yield ratio, amount, label.
pub fn bet_row(date: Cell, stake: f64, odds: f64, profit: f64, label: &str) -> RawRow {
    vec![
        Cell::Empty,
        date,
        num(stake),
        num(odds),
        num(profit),
        num(profit / stake),
        num(0.0),
        text(label),
    ]
}

/// A realistic sheet: header, body with carry-forward dates, noise
/// rows, blank spacer, then the summary block.
pub fn season_sheet() -> Vec<RawRow> {
    vec![
        header(),
        bet_row(num(DEC_31_2023), 100.0, 1.80, 80.0, "Placeholder"),
        bet_row(num(FEB_05_2024), 100.0, 2.00, 10.0, "Lakers ML"),
        bet_row(Cell::Empty, 100.0, 1.95, -5.0, "Celtics -4.5"),
        bet_row(text("08/02/2024"), 100.0, 1.90, 20.0, "Jokic O25.5 pts"),
        vec![Cell::Empty, text("12/02/2024")],
        bet_row(Cell::Empty, 50.0, 2.10, -50.0, "Knicks ML"),
        bet_row(text("2024-02-13"), 50.0, 1.85, 42.5, "Heat +3"),
        Vec::new(),
        vec![text("PICKS"), num(4.0)],
        vec![text("% ACIERTO"), num(0.5)],
        vec![text("YIELD"), num(0.0583)],
        bet_row(num(FEB_12_2024), 100.0, 1.90, 90.0, "Below summary"),
    ]
}

/// In-memory source returning a scripted result.
pub struct ScriptedSource {
    rows: Vec<RawRow>,
    force_error: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self {
            rows,
            force_error: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent load fail with a fetch error.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SheetSource for ScriptedSource {
    async fn load_sheet(&self, sheet_name: &str) -> Result<Vec<RawRow>, PicksError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = self.force_error.lock().unwrap().clone() {
            return Err(PicksError::Fetch {
                location: "scripted".into(),
                message: msg,
            });
        }
        if sheet_name != "NBA" {
            return Err(PicksError::SheetNotFound(sheet_name.to_string()));
        }
        Ok(self.rows.clone())
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}
