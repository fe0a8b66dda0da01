//! Interactive dashboard session.
//!
//! Tracks the user's date bounds, view mode and week page on top of one
//! loaded snapshot. The filtered record set and its week buckets are
//! memoized on the date bounds and rebuilt only when those change.

use std::sync::Arc;
use tracing::debug;

use crate::aggregate::{compose_view, filter_by_date, group_by_week, ViewQuery};
use crate::store::Snapshot;
use crate::types::{BetRecord, DashboardView, ViewMode, WeekBucket};

/// Filter results cached for one pair of bounds.
struct FilterMemo {
    start: String,
    end: String,
    filtered: Vec<BetRecord>,
    weeks: Vec<WeekBucket>,
}

pub struct Session {
    snapshot: Arc<Snapshot>,
    view_mode: ViewMode,
    week_index: usize,
    memo: FilterMemo,
    /// Number of times the filtered set has been rebuilt.
    rebuilds: u64,
}

impl Session {
    /// Start a session spanning every record, in weekly mode on the most
    /// recent week.
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        let (start, end) = snapshot
            .date_span()
            .map(|(min, max)| {
                (
                    min.format("%Y-%m-%d").to_string(),
                    max.format("%Y-%m-%d").to_string(),
                )
            })
            .unwrap_or_default();

        let memo = Self::build_memo(&snapshot.records, start, end);
        Self {
            snapshot,
            view_mode: ViewMode::Weekly,
            week_index: 0,
            memo,
            rebuilds: 1,
        }
    }

    fn build_memo(records: &[BetRecord], start: String, end: String) -> FilterMemo {
        let filtered = filter_by_date(records, &start, &end);
        let weeks = group_by_week(&filtered);
        debug!(
            start = %start,
            end = %end,
            records = filtered.len(),
            weeks = weeks.len(),
            "Filter rebuilt"
        );
        FilterMemo {
            start,
            end,
            filtered,
            weeks,
        }
    }

    /// Change the date bounds and switch to range mode.
    ///
    /// When the bounds actually change the week page goes back to the
    /// most recent week of the new filtered set.
    pub fn set_date_range(&mut self, start: &str, end: &str) {
        self.view_mode = ViewMode::Range;
        self.apply_bounds(start, end);
    }

    /// Drop both bounds so every record is in play. The view mode is
    /// left as it is.
    pub fn clear_range(&mut self) {
        self.apply_bounds("", "");
    }

    fn apply_bounds(&mut self, start: &str, end: &str) {
        if self.memo.start == start && self.memo.end == end {
            return;
        }
        self.memo = Self::build_memo(&self.snapshot.records, start.to_string(), end.to_string());
        self.rebuilds += 1;
        self.week_index = 0;
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    /// Page to the previous (older) week, stopping at the oldest.
    pub fn older_week(&mut self) {
        self.select_week(self.week_index + 1);
    }

    /// Page to the next (more recent) week, stopping at the newest.
    pub fn newer_week(&mut self) {
        self.select_week(self.week_index.saturating_sub(1));
    }

    pub fn select_week(&mut self, index: usize) {
        self.week_index = index.min(self.memo.weeks.len().saturating_sub(1));
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn week_index(&self) -> usize {
        self.week_index
    }

    pub fn bounds(&self) -> (&str, &str) {
        (self.memo.start.as_str(), self.memo.end.as_str())
    }

    pub fn weeks(&self) -> &[WeekBucket] {
        &self.memo.weeks
    }

    pub fn filtered(&self) -> &[BetRecord] {
        &self.memo.filtered
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// The current dashboard view.
    pub fn view(&self) -> DashboardView {
        let query = ViewQuery {
            start: self.memo.start.clone(),
            end: self.memo.end.clone(),
            mode: self.view_mode,
            week: self.week_index,
        };
        compose_view(&self.memo.filtered, &self.memo.weeks, &query)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
