//! The three interchangeable sources of a category sales aggregate.
//!
//! Each source answers the same question with the same parameters:
//! `$1` is the category, `$2` the trailing window in days. They differ
//! only in what the statement reads from:
//!
//! ```text
//! LiveJoin          orders JOIN products             always current
//! View              category_sales_view              always current
//! MaterializedView  category_sales_materialized_view current as of last refresh
//! ```
//!
//! The window starts at midnight UTC of the day `$2` days before the current
//! UTC date. The views bucket orders by their UTC day as well, so every
//! source draws the same boundary whatever the session `TimeZone` is. The
//! day count is bound as an integer rather than formatted into interval
//! text.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DbError;

/// Ad-hoc join over the base tables.
const LIVE_JOIN_SQL: &str = r"SELECT p.category, SUM(o.quantity)::BIGINT AS total_sold
FROM orders o
JOIN products p ON o.product_id = p.id
WHERE p.category = $1
  AND o.order_date >= ((now() AT TIME ZONE 'UTC')::date - $2::INTEGER)::timestamp AT TIME ZONE 'UTC'
GROUP BY p.category";

/// Daily pre-aggregation through the plain view, re-summed.
const VIEW_SQL: &str = r"SELECT category, SUM(daily_total_sold)::BIGINT AS total_sold
FROM category_sales_view
WHERE category = $1 AND order_date >= (now() AT TIME ZONE 'UTC')::date - $2::INTEGER
GROUP BY category";

/// Daily pre-aggregation through the materialized view, re-summed.
const MATERIALIZED_VIEW_SQL: &str = r"SELECT category, SUM(daily_total_sold)::BIGINT AS total_sold
FROM category_sales_materialized_view
WHERE category = $1 AND order_date >= (now() AT TIME ZONE 'UTC')::date - $2::INTEGER
GROUP BY category";

/// Name of the materialized aggregate rebuilt by a refresh.
pub const MATERIALIZED_VIEW_NAME: &str = "category_sales_materialized_view";

/// Full rebuild of the materialized aggregate.
pub(crate) const REFRESH_SQL: &str = "REFRESH MATERIALIZED VIEW category_sales_materialized_view";

/// Where a category sales aggregate is computed from.
///
/// Uses enum dispatch instead of a trait object: the repository methods
/// are async and a `dyn` async trait would need boxed futures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesSource {
    /// Join `orders` and `products` on every call.
    LiveJoin,
    /// Read the plain `category_sales_view`.
    View,
    /// Read `category_sales_materialized_view`; stale until refreshed.
    MaterializedView,
}

impl SalesSource {
    /// All sources, in the order they are usually compared.
    pub const ALL: [Self; 3] = [Self::LiveJoin, Self::View, Self::MaterializedView];

    /// The parameterized aggregate statement for this source.
    pub const fn sql(self) -> &'static str {
        match self {
            Self::LiveJoin => LIVE_JOIN_SQL,
            Self::View => VIEW_SQL,
            Self::MaterializedView => MATERIALIZED_VIEW_SQL,
        }
    }

    /// Short label used in logs, plan file names and reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::LiveJoin => "live_join",
            Self::View => "view",
            Self::MaterializedView => "materialized_view",
        }
    }

    /// Whether results reflect base-table changes without a refresh.
    pub const fn is_always_current(self) -> bool {
        !matches!(self, Self::MaterializedView)
    }

    /// File name a captured query plan for this source is written to.
    pub fn plan_file_name(self) -> String {
        format!("query_plan_{}.json", self.name())
    }
}

impl fmt::Display for SalesSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SalesSource {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live_join" | "join" => Ok(Self::LiveJoin),
            "view" => Ok(Self::View),
            "materialized_view" | "mview" => Ok(Self::MaterializedView),
            other => Err(DbError::Config(format!("unknown sales source: {other}"))),
        }
    }
}
