//! The repository handle and its product operations.
//!
//! A [`Repository`] owns one [`PostgresConnection`] for its whole lifetime.
//! Every operation takes `&mut self`: one session serves one caller at a
//! time, and independent repositories may run side by side.
//!
//! Category sales reads live in [`crate::category_sales`], query plan
//! capture in [`crate::query_plan`].

use pgviews_types::{Product, ProductId};

use crate::error::DbError;
use crate::postgres::{CancelHandle, PostgresConfig, PostgresConnection};

/// Data access for products and category sales aggregates.
pub struct Repository {
    db: PostgresConnection,
}

impl Repository {
    /// Open a session and wrap it in a repository.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] if the session cannot be established.
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DbError> {
        let db = PostgresConnection::connect(config).await?;
        Ok(Self { db })
    }

    /// Open a session from a bare connection URL with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection fails.
    pub async fn connect_url(url: &str) -> Result<Self, DbError> {
        Self::connect(&PostgresConfig::new(url)).await
    }

    /// Handle that cancels the statement this repository is running.
    ///
    /// Take it before starting an operation; the operation holds `&mut self`.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.db.cancel_handle()
    }

    /// Apply the bundled schema migrations on this session.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Migration`] if any migration fails.
    pub async fn run_migrations(&mut self) -> Result<(), DbError> {
        self.db.run_migrations().await
    }

    /// Return the underlying session handle.
    pub const fn connection(&mut self) -> &mut PostgresConnection {
        &mut self.db
    }

    /// Close the session gracefully.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] if the terminate message cannot be sent.
    pub async fn close(self) -> Result<(), DbError> {
        self.db.close().await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Insert a product and return it with its store-assigned identity.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Write`] if the insert violates a constraint or the
    /// session is unavailable.
    pub async fn create_product(&mut self, name: &str, category: &str) -> Result<Product, DbError> {
        let row: (i32,) = sqlx::query_as(
            r"INSERT INTO products (name, category)
              VALUES ($1, $2)
              RETURNING id",
        )
        .bind(name)
        .bind(category)
        .fetch_one(self.db.conn())
        .await
        .map_err(DbError::Write)?;

        let product = Product {
            id: ProductId(row.0),
            name: name.to_owned(),
            category: category.to_owned(),
        };

        tracing::debug!(product_id = %product.id, category, "Created product");

        Ok(product)
    }

    /// Return every product whose category equals `category` exactly.
    ///
    /// Matching is case-sensitive with no pattern expansion. An unknown
    /// category yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Read`] on query or decode failure.
    pub async fn get_products_by_category(
        &mut self,
        category: &str,
    ) -> Result<Vec<Product>, DbError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"SELECT id, name, category
              FROM products
              WHERE category = $1
              ORDER BY id",
        )
        .bind(category)
        .fetch_all(self.db.conn())
        .await
        .map_err(DbError::Read)?;

        tracing::debug!(category, count = rows.len(), "Loaded products by category");

        Ok(rows.into_iter().map(Product::from).collect())
    }
}

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    /// `SERIAL` identity.
    pub id: i32,
    /// Product name.
    pub name: String,
    /// Category label.
    pub category: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId(row.id),
            name: row.name,
            category: row.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_row_maps_to_entity() {
        let row = ProductRow {
            id: 9,
            name: "Headphones".to_owned(),
            category: "Electronics".to_owned(),
        };
        let product = Product::from(row);
        assert_eq!(product.id, ProductId(9));
        assert!(product.id.is_assigned());
        assert_eq!(product.name, "Headphones");
        assert_eq!(product.category, "Electronics");
    }
}
