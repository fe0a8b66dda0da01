//! Load-once ledger store.
//!
//! The sheet is fetched and normalized exactly once into an immutable
//! `Snapshot`. `LoadState` moves from `NotLoaded` to either `Loaded` or
//! `Failed` and never leaves those states.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::normalizer::Normalizer;
use crate::source::SheetSource;
use crate::types::{BetRecord, GlobalStats, LedgerData, NormalizedSheet, PicksError, RejectedRow};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable result of one successful load.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub id: Uuid,
    pub loaded_at: DateTime<Utc>,
    pub sheet_name: String,
    pub global_stats: GlobalStats,
    pub records: Vec<BetRecord>,
    pub rejected: Vec<RejectedRow>,
}

impl Snapshot {
    pub fn from_sheet(sheet_name: &str, sheet: NormalizedSheet) -> Self {
        Self {
            id: Uuid::new_v4(),
            loaded_at: Utc::now(),
            sheet_name: sheet_name.to_string(),
            global_stats: sheet.global_stats,
            records: sheet.records,
            rejected: sheet.rejected,
        }
    }

    /// Earliest and latest record dates, if there are any records.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    /// The `{ globalStats, tableData }` handoff.
    pub fn ledger_data(&self) -> LedgerData {
        LedgerData {
            global_stats: self.global_stats,
            table_data: self.records.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Load state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum LoadState {
    NotLoaded,
    Loaded(Arc<Snapshot>),
    Failed(String),
}

impl LoadState {
    pub fn name(&self) -> &'static str {
        match self {
            LoadState::NotLoaded => "not_loaded",
            LoadState::Loaded(_) => "loaded",
            LoadState::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadState::NotLoaded)
    }
}

/// Holds the load state shared by the binary and the dashboard.
pub struct Store {
    state: RwLock<LoadState>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LoadState::NotLoaded),
        }
    }

    pub async fn state(&self) -> LoadState {
        self.state.read().await.clone()
    }

    /// The loaded snapshot, or `NotLoaded` while loading or after failure.
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>, PicksError> {
        match &*self.state.read().await {
            LoadState::Loaded(snapshot) => Ok(Arc::clone(snapshot)),
            _ => Err(PicksError::NotLoaded),
        }
    }

    /// Run the single load attempt.
    ///
    /// The write lock is held for the whole load, so concurrent callers
    /// wait and then get `AlreadyLoaded`.
    pub async fn load(
        &self,
        source: &dyn SheetSource,
        sheet_name: &str,
        normalizer: &Normalizer,
    ) -> Result<Arc<Snapshot>, PicksError> {
        let mut state = self.state.write().await;
        if state.is_terminal() {
            warn!(state = state.name(), "Load requested after terminal state");
            return Err(PicksError::AlreadyLoaded);
        }

        info!(source = %source.describe(), sheet = sheet_name, "Loading ledger");

        let rows = match source.load_sheet(sheet_name).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "Ledger load failed");
                *state = LoadState::Failed(e.to_string());
                return Err(e);
            }
        };

        let snapshot = Arc::new(Snapshot::from_sheet(sheet_name, normalizer.normalize(&rows)));
        info!(
            snapshot_id = %snapshot.id,
            records = snapshot.records.len(),
            rejected = snapshot.rejected.len(),
            "Ledger loaded"
        );

        *state = LoadState::Loaded(Arc::clone(&snapshot));
        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
