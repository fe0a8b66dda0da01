//! Snapshot export.
//!
//! Writes the `{ globalStats, tableData }` handoff to a JSON file so a
//! static front end can read it without the workbook.

use anyhow::{Context, Result};
use tracing::debug;

use crate::types::LedgerData;

/// Save ledger data as pretty JSON.
pub fn save_snapshot(data: &LedgerData, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .context("Failed to serialise ledger data")?;

    std::fs::write(path, &json)
        .context(format!("Failed to write snapshot to {path}"))?;

    debug!(path, records = data.table_data.len(), "Snapshot saved");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
