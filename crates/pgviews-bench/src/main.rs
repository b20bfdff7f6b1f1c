//! Benchmark entry point for the pgviews data layer.
//!
//! Compares the category sales sources (live join, plain view,
//! materialized view) on one connection: refreshes the materialized view
//! when it is measured, optionally captures `EXPLAIN ANALYZE` plans, then times each source for
//! every configured window and reports latency and totals.
//!
//! ```text
//! env --> BenchConfig --> Repository::connect --> bench::run --> log / JSON report
//! ```
//!
//! On Ctrl-C the in-flight benchmark future is dropped and the statement it
//! left running on the server is cancelled from a side session before the
//! benchmark session is closed.

mod bench;
mod config;
mod error;
mod stats;

use pgviews_db::{PostgresConfig, Repository};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::BenchConfig;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, connection, or any measured query fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("pgviews-bench starting");

    let config = BenchConfig::from_env()?;
    info!(
        category = %config.category,
        windows = ?config.windows,
        sources = ?config.sources,
        iterations = config.iterations,
        run_migrations = config.run_migrations,
        plan_dir = ?config.plan_dir,
        "configuration loaded"
    );

    let pg_config = PostgresConfig::new(&config.database_url).with_application_name("pgviews-bench");
    let mut repo = Repository::connect(&pg_config).await?;

    if config.run_migrations {
        repo.run_migrations().await?;
    }

    let canceller = repo.cancel_handle();
    let outcome = tokio::select! {
        result = bench::run(&mut repo, &config) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let Some(result) = outcome else {
        match canceller.cancel().await {
            Ok(delivered) => warn!(delivered, "interrupted, benchmark cancelled"),
            Err(e) => warn!(error = %e, "interrupted, statement cancel failed"),
        }
        repo.close().await?;
        return Ok(());
    };
    repo.close().await?;
    let report = result?;

    let inconsistent = report.windows.iter().filter(|w| !w.consistent).count();
    info!(
        windows = report.windows.len(),
        inconsistent,
        refresh_us = ?report.refresh_us,
        "benchmark complete"
    );

    if let Some(path) = &config.report_path {
        let body = serde_json::to_vec_pretty(&report)?;
        tokio::fs::write(path, body).await?;
        info!(path = %path.display(), "report written");
    } else {
        info!(report = %serde_json::to_string(&report)?, "report");
    }

    Ok(())
}
