//! The comparison loop.
//!
//! For every configured window, each configured [`SalesSource`] is executed
//! once to warm the statement cache and then timed `iterations` times. When
//! a source that can go stale is measured, the materialized view is
//! refreshed once up front so every source starts from the same data.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use pgviews_db::{Repository, SalesSource};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::BenchConfig;
use crate::error::BenchError;
use crate::stats::LatencyStats;

/// Measurements for one source over one window.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    /// Which source was measured.
    pub source: SalesSource,
    /// Units sold as returned by the source.
    pub total_sold: i64,
    /// Latency over the timed executions.
    pub latency: LatencyStats,
}

/// Measurements for every source over one window.
#[derive(Debug, Clone, Serialize)]
pub struct WindowReport {
    /// Trailing window in days.
    pub days_in_past: i32,
    /// One entry per source, in configured order.
    pub sources: Vec<SourceReport>,
    /// Whether all sources returned the same total.
    pub consistent: bool,
}

/// The full result of a benchmark run.
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    /// Category that was aggregated.
    pub category: String,
    /// Timed executions per source and window.
    pub iterations: u32,
    /// Time taken by the initial materialized view refresh, if one ran.
    pub refresh_us: Option<u64>,
    /// Per-window results, in configured order.
    pub windows: Vec<WindowReport>,
}

impl BenchReport {
    /// Sources whose total dropped when the window widened.
    ///
    /// Only windows measured in ascending order are compared.
    pub fn monotonicity_violations(&self) -> Vec<(SalesSource, i32)> {
        let mut last: BTreeMap<&'static str, (i32, i64)> = BTreeMap::new();
        let mut violations = Vec::new();

        for window in &self.windows {
            for report in &window.sources {
                let key = report.source.name();
                if let Some(&(prev_days, prev_total)) = last.get(key) {
                    if window.days_in_past > prev_days && report.total_sold < prev_total {
                        violations.push((report.source, window.days_in_past));
                    }
                }
                last.insert(key, (window.days_in_past, report.total_sold));
            }
        }

        violations
    }
}

/// Run the comparison described by `config` on `repo`.
pub async fn run(repo: &mut Repository, config: &BenchConfig) -> Result<BenchReport, BenchError> {
    let refresh_us = if needs_refresh(&config.sources) {
        let started = Instant::now();
        repo.refresh_category_sales_materialized_view().await?;
        Some(u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX))
    } else {
        None
    };

    if let Some(dir) = &config.plan_dir {
        capture_plans(repo, config, dir).await?;
    }

    let mut windows = Vec::with_capacity(config.windows.len());
    for &days in &config.windows {
        windows.push(measure_window(repo, config, days).await?);
    }

    let report = BenchReport {
        category: config.category.clone(),
        iterations: config.iterations,
        refresh_us,
        windows,
    };

    for (source, days) in report.monotonicity_violations() {
        warn!(%source, days, "Total decreased as the window widened");
    }

    Ok(report)
}

/// Whether any of `sources` only reflects base tables as of a refresh.
fn needs_refresh(sources: &[SalesSource]) -> bool {
    sources.iter().any(|source| !source.is_always_current())
}

async fn capture_plans(
    repo: &mut Repository,
    config: &BenchConfig,
    dir: &std::path::Path,
) -> Result<(), BenchError> {
    let Some(&days) = config.windows.first() else {
        return Ok(());
    };

    tokio::fs::create_dir_all(dir).await?;
    for &source in &config.sources {
        let path = dir.join(source.plan_file_name());
        repo.capture_query_plan(source, &config.category, days, &path)
            .await?;
    }

    Ok(())
}

async fn measure_window(
    repo: &mut Repository,
    config: &BenchConfig,
    days: i32,
) -> Result<WindowReport, BenchError> {
    let mut sources = Vec::with_capacity(config.sources.len());

    for &source in &config.sources {
        let sales = repo.category_sales(source, &config.category, days).await?;

        let mut samples: Vec<Duration> = Vec::with_capacity(
            usize::try_from(config.iterations).unwrap_or_default(),
        );
        for _ in 0..config.iterations {
            let start = Instant::now();
            repo.category_sales(source, &config.category, days).await?;
            samples.push(start.elapsed());
        }

        let latency = LatencyStats::from_samples(&samples).ok_or_else(|| {
            BenchError::Config("BENCH_ITERATIONS must be at least 1".to_owned())
        })?;

        info!(
            %source,
            days,
            total_sold = sales.total_sold,
            mean_us = latency.mean_us,
            p95_us = latency.p95_us,
            "Measured source"
        );

        sources.push(SourceReport {
            source,
            total_sold: sales.total_sold,
            latency,
        });
    }

    let consistent = sources
        .windows(2)
        .all(|pair| matches!(pair, [a, b] if a.total_sold == b.total_sold));
    if !consistent {
        if needs_refresh(&config.sources) {
            warn!(
                days,
                category = %config.category,
                "Sources disagree; the materialized view may be stale"
            );
        } else {
            warn!(
                days,
                category = %config.category,
                "Sources that are always current disagree"
            );
        }
    }

    Ok(WindowReport {
        days_in_past: days,
        sources,
        consistent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> LatencyStats {
        LatencyStats {
            samples: 1,
            min_us: 1,
            p50_us: 1,
            p95_us: 1,
            max_us: 1,
            mean_us: 1,
            total_us: 1,
        }
    }

    fn window(days: i32, totals: [i64; 3]) -> WindowReport {
        let sources = SalesSource::ALL
            .into_iter()
            .zip(totals)
            .map(|(source, total_sold)| SourceReport {
                source,
                total_sold,
                latency: stats(),
            })
            .collect();
        WindowReport {
            days_in_past: days,
            sources,
            consistent: totals.iter().all(|t| Some(t) == totals.first()),
        }
    }

    #[test]
    fn widening_windows_without_drops_is_clean() {
        let report = BenchReport {
            category: "Electronics".to_owned(),
            iterations: 1,
            refresh_us: Some(0),
            windows: vec![window(30, [3, 3, 3]), window(60, [7, 7, 7]), window(90, [7, 7, 7])],
        };
        assert!(report.monotonicity_violations().is_empty());
    }

    #[test]
    fn drop_in_wider_window_is_reported() {
        let report = BenchReport {
            category: "Electronics".to_owned(),
            iterations: 1,
            refresh_us: Some(0),
            windows: vec![window(30, [3, 3, 3]), window(60, [7, 7, 2])],
        };
        assert_eq!(
            report.monotonicity_violations(),
            vec![(SalesSource::MaterializedView, 60)]
        );
    }

    #[test]
    fn narrower_later_window_is_not_compared() {
        let report = BenchReport {
            category: "Electronics".to_owned(),
            iterations: 1,
            refresh_us: Some(0),
            windows: vec![window(90, [12, 12, 12]), window(30, [3, 3, 3])],
        };
        assert!(report.monotonicity_violations().is_empty());
    }

    #[test]
    fn refresh_only_when_a_stale_source_is_measured() {
        assert!(needs_refresh(&SalesSource::ALL));
        assert!(needs_refresh(&[SalesSource::MaterializedView]));
        assert!(!needs_refresh(&[SalesSource::LiveJoin, SalesSource::View]));
        assert!(!needs_refresh(&[]));
    }

    #[test]
    fn report_serializes_source_names() {
        let json = serde_json::to_value(window(30, [3, 3, 3])).ok();
        let first = json
            .as_ref()
            .and_then(|v| v.get("sources"))
            .and_then(|s| s.get(0))
            .and_then(|s| s.get("source"))
            .and_then(serde_json::Value::as_str);
        assert_eq!(first, Some("live_join"));
    }
}
