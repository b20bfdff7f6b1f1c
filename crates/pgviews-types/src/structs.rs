//! Entity records read from and written to the store.
//!
//! `Product` is the only entity the repository writes. `Order` rows are
//! populated by an external process and are modelled here so callers and
//! test fixtures share one definition. `CategorySales` is derived and
//! never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{OrderId, ProductId};

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// A catalogue product.
///
/// The identity is assigned by the store on insert and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned identity.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Category the product is aggregated under. Matched case-sensitively.
    pub category: String,
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// A single order line for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Store-assigned identity.
    pub id: OrderId,
    /// The product ordered.
    pub product_id: ProductId,
    /// Units ordered. Never negative.
    pub quantity: i32,
    /// When the order was placed.
    pub order_date: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// CategorySales
// ---------------------------------------------------------------------------

/// Units sold for one category over a trailing window of days.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategorySales {
    /// The category the total belongs to.
    pub category: String,
    /// Sum of `Order::quantity` inside the window.
    pub total_sold: i64,
}

impl CategorySales {
    /// The aggregate for a category with no orders in the window.
    pub fn empty(category: &str) -> Self {
        Self {
            category: category.to_owned(),
            total_sold: 0,
        }
    }
}
