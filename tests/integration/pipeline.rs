use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

use picks::aggregate::{build_view, filter_by_date, group_by_week, round2, subset_stats, ViewQuery};
use picks::normalizer::Normalizer;
use picks::session::Session;
use picks::source::{SheetSource, WorkbookSource};
use picks::store::{LoadState, Store};
use picks::types::{Cell, PicksError, RejectReason, ViewMode};

use crate::fixtures::*;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[tokio::test]
async fn test_season_sheet_end_to_end() {
    let store = Store::new();
    let source = ScriptedSource::new(season_sheet());
    let snapshot = store.load(&source, "NBA", &Normalizer::default()).await.unwrap();

    let labels: Vec<&str> = snapshot.records.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Lakers ML", "Celtics -4.5", "Jokic O25.5 pts", "Knicks ML", "Heat +3"]
    );

    let dates: Vec<NaiveDate> = snapshot.records.iter().map(|r| r.date).collect();
    assert_eq!(
        dates,
        vec![d(2024, 2, 5), d(2024, 2, 5), d(2024, 2, 8), d(2024, 2, 12), d(2024, 2, 13)]
    );

    let ids: Vec<usize> = snapshot.records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);

    assert_eq!(snapshot.global_stats.picks, 4.0);
    assert!((snapshot.global_stats.hit_rate_pct - 50.0).abs() < 1e-9);
    assert!((snapshot.global_stats.yield_pct - 5.83).abs() < 1e-9);
}

#[tokio::test]
async fn test_rejections_are_reported() {
    let store = Store::new();
    let source = ScriptedSource::new(season_sheet());
    let snapshot = store.load(&source, "NBA", &Normalizer::default()).await.unwrap();

    let rows: Vec<usize> = snapshot.rejected.iter().map(|r| r.row).collect();
    assert_eq!(rows, vec![1, 5, 8]);
    assert_eq!(
        snapshot.rejected[0].reason,
        RejectReason::BeforeYearFloor { date: d(2023, 12, 31) }
    );
    assert_eq!(snapshot.rejected[1].reason, RejectReason::MissingLabel);
    // The row below the summary block is outside the body entirely
    assert!(snapshot.records.iter().all(|r| r.label != "Below summary"));
}

#[tokio::test]
async fn test_load_failure_leaves_no_data() {
    let store = Store::new();
    let source = ScriptedSource::new(season_sheet());
    source.set_error("connection refused");

    let err = store.load(&source, "NBA", &Normalizer::default()).await.unwrap_err();
    assert!(matches!(err, PicksError::Fetch { .. }));
    assert!(matches!(store.state().await, LoadState::Failed(_)));
    assert!(store.snapshot().await.is_err());

    // Terminal: no retry reaches the source
    let again = store.load(&source, "NBA", &Normalizer::default()).await;
    assert!(matches!(again, Err(PicksError::AlreadyLoaded)));
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_missing_sheet_fails_load() {
    let store = Store::new();
    let source = ScriptedSource::new(season_sheet());
    let err = store.load(&source, "NFL", &Normalizer::default()).await.unwrap_err();
    assert!(matches!(err, PicksError::SheetNotFound(_)));
}

#[test]
fn test_year_floor_boundary() {
    let rows = vec![
        header(),
        bet_row(num(DEC_31_2023), 10.0, 2.0, 1.0, "Old"),
        bet_row(num(JAN_01_2024), 10.0, 2.0, 1.0, "New"),
    ];
    let out = Normalizer::default().normalize(&rows);
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].label, "New");
    assert_eq!(out.records[0].date_display, "01/01/2024");
}

#[test]
fn test_carry_forward_three_rows() {
    let rows = vec![
        header(),
        bet_row(num(FEB_08_2024), 10.0, 2.0, 1.0, "A"),
        bet_row(Cell::Empty, 10.0, 2.0, 1.0, "B"),
        bet_row(Cell::Empty, 10.0, 2.0, 1.0, "C"),
    ];
    let out = Normalizer::default().normalize(&rows);
    assert_eq!(out.records.len(), 3);
    assert!(out.records.iter().all(|r| r.date == d(2024, 2, 8)));
}

#[test]
fn test_normalizer_idempotent() {
    let normalizer = Normalizer::default();
    let a = normalizer.normalize(&season_sheet());
    let b = normalizer.normalize(&season_sheet());
    assert_eq!(
        serde_json::to_vec(&a.records).unwrap(),
        serde_json::to_vec(&b.records).unwrap()
    );
    assert_eq!(a.global_stats, b.global_stats);
}

#[test]
fn test_unbounded_filter_returns_everything() {
    let out = Normalizer::default().normalize(&season_sheet());
    assert_eq!(filter_by_date(&out.records, "", ""), out.records);
}

#[test]
fn test_aggregate_yield_and_hit_rate() {
    let rows = vec![
        header(),
        bet_row(num(FEB_05_2024), 100.0, 2.0, 10.0, "A"),
        bet_row(num(FEB_08_2024), 100.0, 2.0, -5.0, "B"),
        bet_row(num(FEB_12_2024), 100.0, 2.0, 20.0, "C"),
    ];
    let out = Normalizer::default().normalize(&rows);
    let stats = subset_stats(&out.records);
    assert_eq!(stats.picks, 3);
    assert_eq!(round2(stats.yield_pct), 8.33);
    assert_eq!(round2(stats.hit_rate_pct), 66.67);
}

#[test]
fn test_week_grouping_boundary() {
    let rows = vec![
        header(),
        bet_row(num(FEB_05_2024), 10.0, 2.0, 1.0, "Mon"),
        bet_row(num(FEB_08_2024), 10.0, 2.0, 1.0, "Thu"),
        bet_row(num(FEB_12_2024), 10.0, 2.0, 1.0, "Next Mon"),
    ];
    let out = Normalizer::default().normalize(&rows);
    let weeks = group_by_week(&out.records);
    assert_eq!(weeks.len(), 2);
    assert_eq!(weeks[0].week_id, "2024-W07");
    assert_eq!(weeks[0].items[0].label, "Next Mon");
    assert_eq!(weeks[1].week_id, "2024-W06");
    assert_eq!(weeks[1].items.len(), 2);
}

#[tokio::test]
async fn test_session_over_loaded_snapshot() {
    let store = Store::new();
    let source = ScriptedSource::new(season_sheet());
    let snapshot = store.load(&source, "NBA", &Normalizer::default()).await.unwrap();

    let mut session = Session::new(Arc::clone(&snapshot));
    assert_eq!(session.bounds(), ("2024-02-05", "2024-02-13"));

    let weekly = session.view();
    assert_eq!(weekly.current_week.as_ref().unwrap().week_id, "2024-W07");
    assert_eq!(weekly.stats.picks, 2);
    assert_eq!(weekly.stats.hit_rate_pct, 50.0);
    assert_eq!(round2(weekly.stats.yield_pct), -7.5);
    let profits: Vec<f64> = weekly.chart.iter().map(|p| p.profit).collect();
    assert_eq!(profits, vec![-50.0, -7.5]);

    session.set_view_mode(ViewMode::Range);
    let range = session.view();
    assert_eq!(range.stats.picks, 5);
    assert!((range.stats.hit_rate_pct - 60.0).abs() < 1e-9);
    assert!((range.stats.yield_pct - 4.375).abs() < 1e-9);
    assert_eq!(range.chart.last().unwrap().profit, 17.5);
    assert_eq!(range.table[0].label, "Heat +3");

    session.older_week();
    session.set_date_range("2024-02-06", "2024-02-12");
    assert_eq!(session.week_index(), 0);
    let narrowed = session.view();
    let labels: Vec<&str> = narrowed.table.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["Knicks ML", "Jokic O25.5 pts"]);
}

#[test]
fn test_stateless_view_matches_session() {
    let out = Normalizer::default().normalize(&season_sheet());
    let snapshot = Arc::new(picks::store::Snapshot::from_sheet("NBA", out.clone()));
    let session = Session::new(snapshot);

    let query = ViewQuery {
        start: "2024-02-05".into(),
        end: "2024-02-13".into(),
        mode: ViewMode::Weekly,
        week: 0,
    };
    assert_eq!(build_view(&out.records, &query), session.view());
}

fn fixture_workbook() -> WorkbookSource {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/nba_sample.xlsx");
    WorkbookSource::new(path, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_workbook_file_end_to_end() {
    let store = Store::new();
    let snapshot = store
        .load(&fixture_workbook(), "NBA", &Normalizer::default())
        .await
        .unwrap();

    let labels: Vec<&str> = snapshot.records.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["Lakers ML", "Celtics -4.5", "Jokic O25.5 pts"]);

    let dates: Vec<NaiveDate> = snapshot.records.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![d(2024, 2, 5), d(2024, 2, 5), d(2024, 2, 8)]);
    assert!(snapshot.rejected.is_empty());

    assert_eq!(snapshot.global_stats.picks, 3.0);
    assert!((snapshot.global_stats.hit_rate_pct - 66.67).abs() < 1e-9);
    assert!((snapshot.global_stats.yield_pct - 20.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_workbook_missing_sheet_fails_load() {
    let store = Store::new();
    let err = store
        .load(&fixture_workbook(), "NHL", &Normalizer::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PicksError::SheetNotFound(_)));
    assert!(matches!(store.state().await, LoadState::Failed(_)));
}

#[tokio::test]
async fn test_workbook_describes_location() {
    assert!(fixture_workbook().describe().ends_with("nba_sample.xlsx"));
}
