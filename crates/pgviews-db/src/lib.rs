//! `PostgreSQL` data layer comparing three ways to aggregate category sales.
//!
//! The same number, units sold per category over a trailing window, can be
//! read from a live join, a plain view, or a materialized view. All three
//! sit side by side so their latency and plans can be compared.
//!
//! ```text
//! Repository (one PostgresConnection, &mut self per call)
//!     |-- create_product / get_products_by_category   products table
//!     |-- category_sales(SalesSource::LiveJoin)       orders JOIN products
//!     |-- category_sales(SalesSource::View)           category_sales_view
//!     |-- category_sales(SalesSource::MaterializedView)
//!     |                                               category_sales_materialized_view
//!     +-- refresh_category_sales_materialized_view    REFRESH MATERIALIZED VIEW
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- Session configuration and the single connection handle
//! - [`repository`] -- The repository handle and product operations
//! - [`category_sales`] -- The three aggregate reads and the refresh
//! - [`sales_source`] -- Strategy selection and the statements behind it
//! - [`query_plan`] -- `EXPLAIN ANALYZE` capture per strategy
//! - [`error`] -- Shared error types

pub mod category_sales;
pub mod error;
pub mod postgres;
pub mod query_plan;
pub mod repository;
pub mod sales_source;

// Re-export primary types for convenience.
pub use category_sales::CategorySalesRow;
pub use error::DbError;
pub use postgres::{CancelHandle, PostgresConfig, PostgresConnection};
pub use query_plan::{execution_time_ms, explain_sql};
pub use repository::{ProductRow, Repository};
pub use sales_source::{MATERIALIZED_VIEW_NAME, SalesSource};
