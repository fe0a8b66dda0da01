//! PICKS — NBA betting ledger normalizer and performance dashboard
//!
//! Entry point. Loads configuration, initialises structured logging,
//! loads and normalizes the picks workbook once, logs a summary of the
//! most recent week, optionally exports the snapshot, and serves the
//! dashboard API.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use picks::config;
use picks::dashboard::{self, routes::DashboardState};
use picks::normalizer::Normalizer;
use picks::session::Session;
use picks::source::WorkbookSource;
use picks::storage;
use picks::store::Snapshot;

const BANNER: &str = r#"
  ____ ___ ____ _  ______
 |  _ \_ _/ ___| |/ / ___|
 | |_) | | |   | ' /\___ \
 |  __/| | |___| . \ ___) |
 |_|  |___\____|_|\_\____/

  NBA picks ledger
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = config::AppConfig::path_from_env();
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging();

    println!("{BANNER}");
    info!(
        config = %config_path,
        location = %cfg.source.location,
        sheet = %cfg.source.sheet_name,
        min_year = cfg.normalizer.min_year,
        "PICKS starting up"
    );

    let source = WorkbookSource::new(
        &cfg.source.location,
        Duration::from_secs(cfg.source.timeout_secs),
    )?;
    let normalizer = Normalizer::new(cfg.normalizer_config());
    let state = Arc::new(DashboardState::new());

    match state.store.load(&source, &cfg.source.sheet_name, &normalizer).await {
        Ok(snapshot) => {
            log_summary(&snapshot);

            if let Some(path) = cfg.output.snapshot_path.as_deref() {
                if let Err(e) = storage::save_snapshot(&snapshot.ledger_data(), path) {
                    error!(error = %e, path, "Failed to export snapshot");
                } else {
                    info!(path, "Snapshot exported");
                }
            }
        }
        Err(e) => {
            if !cfg.dashboard.enabled {
                return Err(e.into());
            }
            warn!(error = %e, "Serving dashboard with failed load state");
        }
    }

    if cfg.dashboard.enabled {
        dashboard::serve(state, cfg.dashboard.port).await?;
    }

    info!("PICKS shut down cleanly.");
    Ok(())
}

/// Log the sheet totals and the most recent week.
fn log_summary(snapshot: &Arc<Snapshot>) {
    info!(
        records = snapshot.records.len(),
        rejected = snapshot.rejected.len(),
        global = %snapshot.global_stats,
        "Ledger ready"
    );

    for rejected in &snapshot.rejected {
        warn!(row = rejected.row, reason = %rejected.reason, "Row skipped");
    }

    let view = Session::new(Arc::clone(snapshot)).view();
    if let Some(week) = &view.current_week {
        info!(
            week = %week.label,
            picks = view.stats.picks,
            hit_rate = format!("{:.2}%", view.stats.hit_rate_pct),
            yield_pct = format!("{:.2}%", view.stats.yield_pct),
            profit = view.chart.last().map(|p| p.profit).unwrap_or(0.0),
            "Latest week"
        );
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("picks=info"));

    let json_logging = std::env::var("PICKS_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
