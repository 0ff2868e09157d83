//! Product repository for database operations.

use sqlx::PgPool;
use tracing::instrument;

use ecommerce_core::{ProductId, Slug};

use super::{RepositoryError, map_write_error};
use crate::models::{Product, ProductFilter, ProductInput};

const PRODUCT_COLUMNS: &str = "id, category_id, brand_id, name, slug, images, description, \
     price, is_active, in_stock, is_featured, on_sale, created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE ($1::INTEGER IS NULL OR category_id = $1) \
               AND ($2 = FALSE OR is_featured) \
               AND ($3 = FALSE OR is_active) \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(filter.category_id)
        .bind(filter.featured_only)
        .bind(filter.active_only)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get a product by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Get a product by slug, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, slug), fields(slug = %slug))]
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if the input fails validation.
    /// Returns `RepositoryError::Conflict` if the slug already exists or the
    /// category/brand does not.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        input.validate()?;

        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products ( \
                 category_id, brand_id, name, slug, images, description, \
                 price, is_active, in_stock, is_featured, on_sale \
             ) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(input.category_id)
        .bind(input.brand_id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.images)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.is_active)
        .bind(input.in_stock)
        .bind(input.is_featured)
        .bind(input.on_sale)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "product"))?;

        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Replace every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Invalid` if the input fails validation.
    /// Returns `RepositoryError::Conflict` on slug or reference violations.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        input.validate()?;

        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET \
                 category_id = $2, brand_id = $3, name = $4, slug = $5, images = $6, \
                 description = $7, price = $8, is_active = $9, in_stock = $10, \
                 is_featured = $11, on_sale = $12, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(input.category_id)
        .bind(input.brand_id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.images)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.is_active)
        .bind(input.in_stock)
        .bind(input.is_featured)
        .bind(input.on_sale)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, "product"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// Carts that already hold the product keep their line item; the cart
    /// is a client-side snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_write_error(e, "product"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }
}
