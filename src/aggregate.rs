//! Aggregation layer.
//!
//! Pure functions over the normalized record sequence: date-range
//! filtering, ISO-week bucketing, the cumulative profit series, and the
//! pick count / hit rate / yield of whatever subset is in view. Nothing
//! here holds state; `Session` layers memoization on top.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::normalizer::dates::iso_week_id;
use crate::types::{
    BetRecord, DashboardView, ProfitPoint, SubsetStats, ViewMode, WeekBucket, WeekRef,
};

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Inputs that determine one dashboard view.
///
/// Bounds are `YYYY-MM-DD` strings; an empty bound is unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ViewQuery {
    pub start: String,
    pub end: String,
    pub mode: ViewMode,
    pub week: usize,
}

// ---------------------------------------------------------------------------
// Filtering and grouping
// ---------------------------------------------------------------------------

/// Keep records whose ISO date falls within `[start, end]`.
///
/// Comparison is lexicographic on `YYYY-MM-DD`, which orders the same
/// way as the dates themselves. Source order is preserved.
pub fn filter_by_date(records: &[BetRecord], start: &str, end: &str) -> Vec<BetRecord> {
    records
        .iter()
        .filter(|r| {
            let date = r.iso_date();
            (start.is_empty() || date.as_str() >= start) && (end.is_empty() || date.as_str() <= end)
        })
        .cloned()
        .collect()
}

/// Display label of the ISO week containing `date`. The year shown is
/// the calendar year of `date`, so a late-December date in week 01 reads
/// `Semana 01 (2024)`.
pub fn week_label(date: NaiveDate) -> String {
    format!("Semana {:02} ({})", date.iso_week().week(), date.year())
}

/// Group records by ISO week, most recent week first.
///
/// Records keep their input order inside each bucket. The bucket label
/// comes from the first record that lands in it.
pub fn group_by_week(records: &[BetRecord]) -> Vec<WeekBucket> {
    let mut groups: BTreeMap<String, WeekBucket> = BTreeMap::new();

    for record in records {
        let week_id = iso_week_id(record.date);
        groups
            .entry(week_id.clone())
            .or_insert_with(|| WeekBucket {
                week_id,
                label: week_label(record.date),
                items: Vec::new(),
            })
            .items
            .push(record.clone());
    }

    groups.into_values().rev().collect()
}

/// The records currently in view.
///
/// Weekly mode shows the selected week; when that week does not exist
/// (no records, index out of range) it falls back to the filtered set,
/// which is what range mode always shows.
pub fn active_subset<'a>(
    filtered: &'a [BetRecord],
    weeks: &'a [WeekBucket],
    mode: ViewMode,
    week_index: usize,
) -> &'a [BetRecord] {
    match (mode, weeks.get(week_index)) {
        (ViewMode::Weekly, Some(week)) => &week.items,
        _ => filtered,
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Round half away from zero to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Running profit total, one point per record in date order.
///
/// The sort is stable, so same-day records keep their input order.
/// Missing profit counts as zero.
pub fn cumulative_profit(items: &[BetRecord]) -> Vec<ProfitPoint> {
    let mut sorted: Vec<&BetRecord> = items.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let mut running = 0.0_f64;
    sorted
        .into_iter()
        .map(|r| {
            running += r.profit.unwrap_or(0.0);
            ProfitPoint {
                date: r.date_display.clone(),
                profit: round2(running),
            }
        })
        .collect()
}

/// Pick count, hit rate and yield over a subset.
///
/// Hit rate = wins / picks; yield = total profit / total stake, both as
/// percentages. Missing stake or profit counts as zero; an empty subset
/// or a non-positive total stake yields 0 rather than NaN.
pub fn subset_stats(items: &[BetRecord]) -> SubsetStats {
    let picks = items.len();
    if picks == 0 {
        return SubsetStats::default();
    }

    let wins = items.iter().filter(|r| r.is_win).count();
    let total_stake: f64 = items.iter().map(|r| r.stake.unwrap_or(0.0)).sum();
    let total_profit: f64 = items.iter().map(|r| r.profit.unwrap_or(0.0)).sum();

    SubsetStats {
        picks,
        hit_rate_pct: wins as f64 / picks as f64 * 100.0,
        yield_pct: if total_stake > 0.0 {
            total_profit / total_stake * 100.0
        } else {
            0.0
        },
    }
}

// ---------------------------------------------------------------------------
// View composition
// ---------------------------------------------------------------------------

/// Assemble a view from an already filtered and grouped record set.
pub fn compose_view(
    filtered: &[BetRecord],
    weeks: &[WeekBucket],
    query: &ViewQuery,
) -> DashboardView {
    let active = active_subset(filtered, weeks, query.mode, query.week);

    DashboardView {
        view_mode: query.mode,
        start_date: query.start.clone(),
        end_date: query.end.clone(),
        week_index: query.week,
        week_count: weeks.len(),
        current_week: weeks.get(query.week).map(|w| WeekRef {
            week_id: w.week_id.clone(),
            label: w.label.clone(),
        }),
        stats: subset_stats(active),
        chart: cumulative_profit(active),
        table: active.iter().rev().cloned().collect(),
    }
}

/// Compute a view from scratch.
pub fn build_view(records: &[BetRecord], query: &ViewQuery) -> DashboardView {
    let filtered = filter_by_date(records, &query.start, &query.end);
    let weeks = group_by_week(&filtered);
    compose_view(&filtered, &weeks, query)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
