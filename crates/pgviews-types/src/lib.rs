//! Shared type definitions for the pgviews data layer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for store-assigned identities
//! - [`structs`] -- `Product`, `Order` and the derived `CategorySales`

pub mod ids;
pub mod structs;

pub use ids::{OrderId, ProductId};
pub use structs::{CategorySales, Order, Product};
