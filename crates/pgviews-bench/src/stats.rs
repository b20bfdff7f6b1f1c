//! Latency summaries over a set of timed executions.

use std::time::Duration;

use serde::Serialize;

/// Summary of a batch of latency samples, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatencyStats {
    /// Number of samples.
    pub samples: u32,
    /// Fastest sample.
    pub min_us: u64,
    /// Median sample.
    pub p50_us: u64,
    /// 95th percentile sample.
    pub p95_us: u64,
    /// Slowest sample.
    pub max_us: u64,
    /// Arithmetic mean.
    pub mean_us: u64,
    /// Sum of all samples.
    pub total_us: u64,
}

impl LatencyStats {
    /// Summarize `samples`. Returns `None` when there are none.
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();

        let min = *sorted.first()?;
        let max = *sorted.last()?;
        let count = u32::try_from(sorted.len()).unwrap_or(u32::MAX);
        let total = sorted
            .iter()
            .try_fold(Duration::ZERO, |acc, d| acc.checked_add(*d))
            .unwrap_or(Duration::MAX);
        let mean = total.checked_div(count).unwrap_or(Duration::ZERO);

        Some(Self {
            samples: count,
            min_us: micros(min),
            p50_us: micros(percentile(&sorted, 50)),
            p95_us: micros(percentile(&sorted, 95)),
            max_us: micros(max),
            mean_us: micros(mean),
            total_us: micros(total),
        })
    }
}

/// Nearest-rank percentile of an ascending slice.
fn percentile(sorted: &[Duration], pct: usize) -> Duration {
    let rank = sorted
        .len()
        .saturating_sub(1)
        .saturating_mul(pct.min(100))
        .checked_div(100)
        .unwrap_or(0);
    sorted.get(rank).copied().unwrap_or(Duration::ZERO)
}

fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn ms(values: &[u64]) -> Vec<Duration> {
        values.iter().map(|v| Duration::from_millis(*v)).collect()
    }

    #[test]
    fn empty_batch_has_no_stats() {
        assert!(LatencyStats::from_samples(&[]).is_none());
    }

    #[test]
    fn single_sample_fills_every_field() {
        let stats = LatencyStats::from_samples(&ms(&[4]));
        assert_eq!(
            stats,
            Some(LatencyStats {
                samples: 1,
                min_us: 4_000,
                p50_us: 4_000,
                p95_us: 4_000,
                max_us: 4_000,
                mean_us: 4_000,
                total_us: 4_000,
            })
        );
    }

    #[test]
    fn unordered_samples_are_summarized() {
        let samples = ms(&[9, 1, 5, 3, 7, 2, 8, 4, 6, 10]);
        let Some(stats) = LatencyStats::from_samples(&samples) else {
            panic!("non-empty batch");
        };
        assert_eq!(stats.samples, 10);
        assert_eq!(stats.min_us, 1_000);
        assert_eq!(stats.max_us, 10_000);
        assert_eq!(stats.total_us, 55_000);
        assert_eq!(stats.mean_us, 5_500);
        assert_eq!(stats.p50_us, 5_000);
        assert_eq!(stats.p95_us, 9_000);
    }
}
