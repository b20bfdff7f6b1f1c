//! Configuration for the benchmark harness.
//!
//! All configuration is loaded from environment variables. Lookup goes
//! through a closure so tests can supply values without touching the
//! process environment.

use std::path::PathBuf;

use pgviews_db::SalesSource;

use crate::error::BenchError;

/// Default category to aggregate.
const DEFAULT_CATEGORY: &str = "Electronics";

/// Default trailing windows, in days.
const DEFAULT_WINDOWS: &str = "30,60,90";

/// Default timed executions per source and window.
const DEFAULT_ITERATIONS: &str = "100";

/// Complete benchmark configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    /// `PostgreSQL` connection URL.
    pub database_url: String,
    /// Category whose sales are aggregated.
    pub category: String,
    /// Trailing windows to measure, in days, in the order given.
    pub windows: Vec<i32>,
    /// Sources to measure, in the order given.
    pub sources: Vec<SalesSource>,
    /// Timed executions per source and window.
    pub iterations: u32,
    /// Apply bundled migrations before measuring.
    pub run_migrations: bool,
    /// Directory query plans are written to. Plans are skipped when unset.
    pub plan_dir: Option<PathBuf>,
    /// File the JSON report is written to. Only logged when unset.
    pub report_path: Option<PathBuf>,
}

impl BenchConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `DATABASE_URL` -- `PostgreSQL` connection string
    ///
    /// Optional variables:
    /// - `BENCH_CATEGORY` -- category to aggregate (default `Electronics`)
    /// - `BENCH_WINDOWS` -- comma-separated day counts (default `30,60,90`)
    /// - `BENCH_SOURCES` -- comma-separated sources (default all three)
    /// - `BENCH_ITERATIONS` -- timed runs per source and window (default 100)
    /// - `BENCH_RUN_MIGRATIONS` -- apply migrations first (default `false`)
    /// - `BENCH_PLAN_DIR` -- write `EXPLAIN ANALYZE` plans here
    /// - `BENCH_REPORT_PATH` -- write the JSON report here
    pub fn from_env() -> Result<Self, BenchError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BenchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| BenchError::Config("missing required env var DATABASE_URL".to_owned()))?;

        let category = lookup("BENCH_CATEGORY").unwrap_or_else(|| DEFAULT_CATEGORY.to_owned());

        let windows = parse_windows(
            &lookup("BENCH_WINDOWS").unwrap_or_else(|| DEFAULT_WINDOWS.to_owned()),
        )?;

        let sources = match lookup("BENCH_SOURCES") {
            Some(raw) => parse_sources(&raw)?,
            None => SalesSource::ALL.to_vec(),
        };

        let iterations: u32 = lookup("BENCH_ITERATIONS")
            .unwrap_or_else(|| DEFAULT_ITERATIONS.to_owned())
            .trim()
            .parse()
            .map_err(|e| BenchError::Config(format!("invalid BENCH_ITERATIONS: {e}")))?;
        if iterations == 0 {
            return Err(BenchError::Config(
                "BENCH_ITERATIONS must be at least 1".to_owned(),
            ));
        }

        let run_migrations: bool = lookup("BENCH_RUN_MIGRATIONS")
            .unwrap_or_else(|| "false".to_owned())
            .trim()
            .parse()
            .map_err(|e| BenchError::Config(format!("invalid BENCH_RUN_MIGRATIONS: {e}")))?;

        let plan_dir = lookup("BENCH_PLAN_DIR")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);
        let report_path = lookup("BENCH_REPORT_PATH")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            database_url,
            category,
            windows,
            sources,
            iterations,
            run_migrations,
            plan_dir,
            report_path,
        })
    }
}

/// Parse a comma-separated list of day counts.
///
/// Negative and zero values are accepted and passed to the store as is.
fn parse_windows(raw: &str) -> Result<Vec<i32>, BenchError> {
    let windows = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>()
                .map_err(|e| BenchError::Config(format!("invalid BENCH_WINDOWS entry {part:?}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if windows.is_empty() {
        return Err(BenchError::Config(
            "BENCH_WINDOWS must name at least one window".to_owned(),
        ));
    }

    Ok(windows)
}

/// Parse a comma-separated list of source names.
///
/// Accepts the names [`SalesSource`] parses, aliases included. Duplicates
/// are dropped, keeping the first occurrence.
fn parse_sources(raw: &str) -> Result<Vec<SalesSource>, BenchError> {
    let mut sources: Vec<SalesSource> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        let source: SalesSource = part
            .parse()
            .map_err(|e| BenchError::Config(format!("invalid BENCH_SOURCES entry: {e}")))?;
        if !sources.contains(&source) {
            sources.push(source);
        }
    }

    if sources.is_empty() {
        return Err(BenchError::Config(
            "BENCH_SOURCES must name at least one source".to_owned(),
        ));
    }

    Ok(sources)
}
