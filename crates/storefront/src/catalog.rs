//! Product catalog lookup used by the cart.
//!
//! The cart only needs a handful of fields to create a line item, looked up
//! by product ID. [`CatalogClient`] reads them straight from `PostgreSQL` on
//! every lookup, so a deleted or repriced product is seen by the next add.
//! Lookups only happen when a new line item is created.

use std::future::Future;

use sqlx::PgPool;
use tracing::{debug, instrument};

use ecommerce_core::{CatalogProduct, ProductId};

use crate::db::{ProductRepository, RepositoryError};

/// Source of product data for new cart line items.
pub trait ProductCatalog {
    /// Look up a product by ID.
    ///
    /// A missing product is `Ok(None)`, not an error.
    fn find_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<CatalogProduct>, RepositoryError>> + Send;
}

/// `PostgreSQL`-backed catalog.
///
/// Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct CatalogClient {
    pool: PgPool,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ProductCatalog for CatalogClient {
    #[instrument(skip(self))]
    async fn find_product(&self, id: ProductId) -> Result<Option<CatalogProduct>, RepositoryError> {
        let product = ProductRepository::new(&self.pool).get_by_id(id).await?;
        if product.is_none() {
            debug!(product_id = %id, "Product not in catalog");
        }
        Ok(product.as_ref().map(CatalogProduct::from))
    }
}
