//! Category repository for database operations.

use sqlx::PgPool;
use tracing::instrument;

use ecommerce_core::{CategoryId, Slug};

use super::{RepositoryError, map_write_error};
use crate::models::{Category, CategoryInput};

const CATEGORY_COLUMNS: &str = "id, name, slug, image, is_active, created_at, updated_at";

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, active_only: bool) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories \
             WHERE ($1 = FALSE OR is_active) \
             ORDER BY name"
        ))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(category)
    }

    /// Get a category by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, slug), fields(slug = %slug))]
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(category)
    }

    /// Create a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if the input fails validation.
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        input.validate()?;

        let category = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (name, slug, image, is_active) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.image)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "category"))?;

        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    /// Replace every editable field of a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Invalid` if the input fails validation.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        input.validate()?;

        sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories \
             SET name = $2, slug = $3, image = $4, is_active = $5, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.image)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, "category"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a category.
    ///
    /// Categories that still have products cannot be deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Conflict` if products still reference it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_write_error(e, "category"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }
}
