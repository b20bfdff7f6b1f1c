//! Category sales aggregates and the materialized view refresh.
//!
//! All three reads share one contract: units sold for `category` whose
//! order date falls on or after the UTC calendar day `days_in_past` days
//! before today (UTC). The live
//! join and the plain view always agree. The materialized view agrees with
//! them right after [`Repository::refresh_category_sales_materialized_view`]
//! and may drift afterwards.
//!
//! `days_in_past` is not validated. Zero restricts the window to today and
//! later; a negative count moves the lower bound into the future.
//!
//! A window without orders produces no aggregate row. That case is reported
//! as a zero total, not as an error.

use std::time::Instant;

use pgviews_types::CategorySales;

use crate::error::DbError;
use crate::repository::Repository;
use crate::sales_source::{MATERIALIZED_VIEW_NAME, REFRESH_SQL, SalesSource};

impl Repository {
    /// Units sold for `category` over the trailing window, read from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Read`] if the query fails or the row cannot be decoded.
    pub async fn category_sales(
        &mut self,
        source: SalesSource,
        category: &str,
        days_in_past: i32,
    ) -> Result<CategorySales, DbError> {
        let row = sqlx::query_as::<_, CategorySalesRow>(source.sql())
            .bind(category)
            .bind(days_in_past)
            .fetch_optional(self.connection().conn())
            .await
            .map_err(DbError::Read)?;

        let sales = row.map_or_else(|| CategorySales::empty(category), CategorySales::from);

        tracing::debug!(
            source = source.name(),
            category,
            days_in_past,
            total_sold = sales.total_sold,
            "Computed category sales"
        );

        Ok(sales)
    }

    /// Category sales computed by joining `orders` and `products` directly.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Read`] on query or decode failure.
    pub async fn get_category_sales(
        &mut self,
        category: &str,
        days_in_past: i32,
    ) -> Result<CategorySales, DbError> {
        self.category_sales(SalesSource::LiveJoin, category, days_in_past)
            .await
    }

    /// Category sales re-aggregated from the plain daily view.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Read`] on query or decode failure.
    pub async fn get_category_sales_from_view(
        &mut self,
        category: &str,
        days_in_past: i32,
    ) -> Result<CategorySales, DbError> {
        self.category_sales(SalesSource::View, category, days_in_past)
            .await
    }

    /// Category sales re-aggregated from the materialized daily view.
    ///
    /// Reflects base-table contents as of the last refresh only.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Read`] on query or decode failure, including when
    /// the materialized view has never been populated.
    pub async fn get_category_sales_from_materialized_view(
        &mut self,
        category: &str,
        days_in_past: i32,
    ) -> Result<CategorySales, DbError> {
        self.category_sales(SalesSource::MaterializedView, category, days_in_past)
            .await
    }

    /// Rebuild the materialized aggregate from current base-table contents.
    ///
    /// Blocks until the rebuild commits. There is no incremental mode: the
    /// whole view is recomputed each time.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Refresh`] if the rebuild fails. The previous
    /// contents stay queryable in that case.
    pub async fn refresh_category_sales_materialized_view(&mut self) -> Result<(), DbError> {
        let started = Instant::now();

        sqlx::query(REFRESH_SQL)
            .execute(self.connection().conn())
            .await
            .map_err(|e| {
                let err = DbError::Refresh(e);
                tracing::warn!(
                    view = MATERIALIZED_VIEW_NAME,
                    kind = err.kind(),
                    error = %err,
                    "Materialized view refresh failed"
                );
                err
            })?;

        tracing::info!(
            view = MATERIALIZED_VIEW_NAME,
            elapsed_ms = started.elapsed().as_millis(),
            "Refreshed materialized view"
        );

        Ok(())
    }
}

/// The single aggregate row returned by a category sales statement.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategorySalesRow {
    /// Category label.
    pub category: String,
    /// Summed quantity. `NULL` only if every summed quantity is `NULL`.
    pub total_sold: Option<i64>,
}

impl From<CategorySalesRow> for CategorySales {
    fn from(row: CategorySalesRow) -> Self {
        Self {
            category: row.category,
            total_sold: row.total_sold.unwrap_or(0),
        }
    }
}
