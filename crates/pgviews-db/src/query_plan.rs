//! Query plan capture for comparing the sales sources.
//!
//! Runs `EXPLAIN (FORMAT JSON, ANALYZE, BUFFERS)` over a source's statement
//! with real parameters. `ANALYZE` executes the statement, so the plan
//! carries actual row counts and timings alongside the estimates.

use std::path::Path;

use crate::error::DbError;
use crate::repository::Repository;
use crate::sales_source::SalesSource;

/// Prefix turning a statement into a JSON-formatted, executed plan.
const EXPLAIN_PREFIX: &str = "EXPLAIN (FORMAT JSON, ANALYZE, BUFFERS) ";

/// Build the `EXPLAIN` statement for a source.
pub fn explain_sql(source: SalesSource) -> String {
    format!("{EXPLAIN_PREFIX}{}", source.sql())
}

impl Repository {
    /// Return the executed plan of `source` for the given parameters.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Read`] if the `EXPLAIN` statement fails.
    pub async fn explain(
        &mut self,
        source: SalesSource,
        category: &str,
        days_in_past: i32,
    ) -> Result<serde_json::Value, DbError> {
        let sql = explain_sql(source);
        let row: (serde_json::Value,) = sqlx::query_as(&sql)
            .bind(category)
            .bind(days_in_past)
            .fetch_one(self.connection().conn())
            .await
            .map_err(DbError::Read)?;

        Ok(row.0)
    }

    /// Capture the executed plan of `source` and write it as JSON to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Read`] if the `EXPLAIN` fails and [`DbError::Io`]
    /// if the file cannot be written.
    pub async fn capture_query_plan(
        &mut self,
        source: SalesSource,
        category: &str,
        days_in_past: i32,
        path: &Path,
    ) -> Result<(), DbError> {
        let plan = self.explain(source, category, days_in_past).await?;
        let body = serde_json::to_vec_pretty(&plan)?;
        tokio::fs::write(path, body).await?;

        tracing::info!(
            source = source.name(),
            path = %path.display(),
            execution_ms = execution_time_ms(&plan).unwrap_or_default(),
            "Captured query plan"
        );

        Ok(())
    }
}

/// Pull the top-level `Execution Time` (milliseconds) out of a JSON plan.
pub fn execution_time_ms(plan: &serde_json::Value) -> Option<f64> {
    plan.get(0)?.get("Execution Time")?.as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explain_wraps_source_statement() {
        let sql = explain_sql(SalesSource::View);
        assert!(sql.starts_with("EXPLAIN (FORMAT JSON, ANALYZE, BUFFERS) SELECT"));
        assert!(sql.ends_with(SalesSource::View.sql()));
    }

    #[test]
    fn execution_time_read_from_plan() {
        let plan = serde_json::json!([{
            "Plan": {"Node Type": "Aggregate"},
            "Planning Time": 0.12,
            "Execution Time": 3.5
        }]);
        assert_eq!(execution_time_ms(&plan).map(|ms| ms > 3.4 && ms < 3.6), Some(true));
    }

    #[test]
    fn execution_time_missing_is_none() {
        assert!(execution_time_ms(&serde_json::json!([])).is_none());
        assert!(execution_time_ms(&serde_json::json!({"Plan": {}})).is_none());
    }
}
