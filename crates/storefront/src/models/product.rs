//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ecommerce_core::{BrandId, CatalogProduct, CategoryId, CurrencyCode, Price, ProductId, Slug};

use super::{ValidationError, validate_name};

/// A catalog product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    pub category_id: CategoryId,
    pub brand_id: Option<BrandId>,
    /// Display name.
    pub name: String,
    /// URL slug (unique).
    pub slug: Slug,
    /// Ordered image paths; the first is the primary image.
    pub images: Vec<String>,
    /// Markdown description.
    pub description: Option<String>,
    /// Unit price in the store currency.
    pub price: Decimal,
    pub is_active: bool,
    pub in_stock: bool,
    pub is_featured: bool,
    pub on_sale: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Maximum number of images per product.
    pub const MAX_IMAGES: usize = 5;
}

impl From<&Product> for CatalogProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            images: product.images.clone(),
        }
    }
}

/// Fields for creating or replacing a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub category_id: CategoryId,
    #[serde(default)]
    pub brand_id: Option<BrandId>,
    pub name: String,
    pub slug: Slug,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub on_sale: bool,
}

const fn default_true() -> bool {
    true
}

impl ProductInput {
    /// Check the input before it is written.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is empty or too long, the price
    /// is negative, or there are more than [`Product::MAX_IMAGES`] images.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        Price::checked(self.price, CurrencyCode::default())?;
        if self.images.len() > Product::MAX_IMAGES {
            return Err(ValidationError::TooManyImages {
                max: Product::MAX_IMAGES,
            });
        }
        if self.images.iter().any(|i| i.trim().is_empty()) {
            return Err(ValidationError::EmptyImagePath);
        }
        Ok(())
    }
}

/// Listing filter for [`crate::db::ProductRepository::list`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub featured_only: bool,
    pub active_only: bool,
}

impl ProductFilter {
    /// Active products only, as shown on the storefront.
    #[must_use]
    pub const fn storefront() -> Self {
        Self {
            category_id: None,
            featured_only: false,
            active_only: true,
        }
    }
}
