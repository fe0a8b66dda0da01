//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.
//! Data endpoints answer 503 until the ledger has loaded.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::aggregate::{build_view, filter_by_date, group_by_week, ViewQuery};
use crate::store::{LoadState, Snapshot, Store};
use crate::types::{DashboardView, LedgerData, RejectedRow};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub store: Store,
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            store: Store::new(),
        }
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub records: usize,
    pub rejected: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RangeQuery {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekSummary {
    pub week_id: String,
    pub label: String,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn loaded(state: &AppState) -> Result<Arc<Snapshot>, StatusCode> {
    state
        .store
        .snapshot()
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let load_state = state.store.state().await;
    let name = load_state.name().to_string();

    let resp = match load_state {
        LoadState::NotLoaded => StatusResponse {
            state: name,
            error: None,
            records: 0,
            rejected: 0,
            loaded_at: None,
        },
        LoadState::Failed(msg) => StatusResponse {
            state: name,
            error: Some(msg),
            records: 0,
            rejected: 0,
            loaded_at: None,
        },
        LoadState::Loaded(snapshot) => StatusResponse {
            state: name,
            error: None,
            records: snapshot.records.len(),
            rejected: snapshot.rejected.len(),
            loaded_at: Some(snapshot.loaded_at.to_rfc3339()),
        },
    };

    Json(resp)
}

/// GET /api/data
pub async fn get_data(State(state): State<AppState>) -> Result<Json<LedgerData>, StatusCode> {
    let snapshot = loaded(&state).await?;
    Ok(Json(snapshot.ledger_data()))
}

/// GET /api/view?start=&end=&mode=&week=
pub async fn get_view(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<DashboardView>, StatusCode> {
    let snapshot = loaded(&state).await?;
    Ok(Json(build_view(&snapshot.records, &query)))
}

/// GET /api/weeks?start=&end=
pub async fn get_weeks(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<WeekSummary>>, StatusCode> {
    let snapshot = loaded(&state).await?;
    let filtered = filter_by_date(&snapshot.records, &range.start, &range.end);
    let weeks = group_by_week(&filtered)
        .into_iter()
        .map(|w| WeekSummary {
            count: w.items.len(),
            week_id: w.week_id,
            label: w.label,
        })
        .collect();
    Ok(Json(weeks))
}

/// GET /api/rejected
pub async fn get_rejected(
    State(state): State<AppState>,
) -> Result<Json<Vec<RejectedRow>>, StatusCode> {
    let snapshot = loaded(&state).await?;
    Ok(Json(snapshot.rejected.clone()))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
