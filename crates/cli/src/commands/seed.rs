//! Seed the catalog from a YAML file.
//!
//! The file lists categories, each with its products. Seeding is idempotent:
//! rows are matched by slug and updated in place, so the same file can be
//! applied repeatedly.
//!
//! ```yaml
//! categories:
//!   - name: Lighting
//!     slug: lighting
//!     products:
//!       - name: Desk Lamp
//!         slug: desk-lamp
//!         price: "1299.00"
//!         images: [products/desk-lamp.jpg]
//! ```

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{error, info};

use ecommerce_core::{BrandId, CategoryId, Slug};
use ecommerce_storefront::db::{CategoryRepository, ProductRepository, RepositoryError};
use ecommerce_storefront::models::{CategoryInput, ProductInput};

/// Errors from loading or applying a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error("{what} {slug}: {source}")]
    Repository {
        what: &'static str,
        slug: Slug,
        source: RepositoryError,
    },
}

/// Top-level seed document.
#[derive(Debug, Deserialize)]
pub struct SeedCatalog {
    pub categories: Vec<SeedCategory>,
}

/// A category and the products filed under it.
#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    pub slug: Slug,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// A product; its category comes from the enclosing entry.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub slug: Slug,
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub brand_id: Option<BrandId>,
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

impl SeedCategory {
    fn to_input(&self) -> CategoryInput {
        CategoryInput {
            name: self.name.clone(),
            slug: self.slug.clone(),
            image: self.image.clone(),
            is_active: self.is_active,
        }
    }
}

impl SeedProduct {
    fn to_input(&self, category_id: CategoryId) -> ProductInput {
        ProductInput {
            category_id,
            brand_id: self.brand_id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            images: self.images.clone(),
            description: self.description.clone(),
            price: self.price,
            is_active: self.is_active,
            in_stock: self.in_stock,
            is_featured: self.is_featured,
            on_sale: self.on_sale,
        }
    }
}

/// Counts of rows written by a seed run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories_created: usize,
    pub categories_updated: usize,
    pub products_created: usize,
    pub products_updated: usize,
}

impl SeedCatalog {
    /// Parse a seed document.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` if the document is malformed.
    pub fn parse(content: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Check the whole document before touching the database.
    ///
    /// Returns one message per problem; an empty list means the file is good.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut category_slugs = HashSet::new();
        let mut product_slugs = HashSet::new();

        for category in &self.categories {
            if !category_slugs.insert(&category.slug) {
                errors.push(format!("category {}: duplicate slug", category.slug));
            }
            if let Err(e) = category.to_input().validate() {
                errors.push(format!("category {}: {e}", category.slug));
            }

            for product in &category.products {
                if !product_slugs.insert(&product.slug) {
                    errors.push(format!("product {}: duplicate slug", product.slug));
                }
                // The real category ID is only known after insert; validation
                // does not look at it.
                if let Err(e) = product.to_input(CategoryId::new(0)).validate() {
                    errors.push(format!("product {}: {e}", product.slug));
                }
            }
        }

        errors
    }

    /// Create or update every category and product, matching on slug.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Repository` naming the first row that failed.
    pub async fn apply(&self, pool: &PgPool) -> Result<SeedReport, SeedError> {
        let categories = CategoryRepository::new(pool);
        let products = ProductRepository::new(pool);
        let mut report = SeedReport::default();

        for seed in &self.categories {
            let wrap = |source| SeedError::Repository {
                what: "category",
                slug: seed.slug.clone(),
                source,
            };
            let input = seed.to_input();

            let category = match categories.get_by_slug(&seed.slug).await.map_err(wrap)? {
                Some(existing) => {
                    report.categories_updated += 1;
                    categories.update(existing.id, &input).await.map_err(wrap)?
                }
                None => {
                    report.categories_created += 1;
                    categories.create(&input).await.map_err(wrap)?
                }
            };

            for seed in &seed.products {
                let wrap = |source| SeedError::Repository {
                    what: "product",
                    slug: seed.slug.clone(),
                    source,
                };
                let input = seed.to_input(category.id);

                match products.get_by_slug(&seed.slug).await.map_err(wrap)? {
                    Some(existing) => {
                        products.update(existing.id, &input).await.map_err(wrap)?;
                        report.products_updated += 1;
                    }
                    None => {
                        products.create(&input).await.map_err(wrap)?;
                        report.products_created += 1;
                    }
                }
            }
        }

        Ok(report)
    }
}

/// Seed the catalog from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML seed file
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if
/// any database write fails.
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog seed");

    // Read and validate before connecting to the database
    let content = tokio::fs::read_to_string(path).await.map_err(SeedError::from)?;
    let seed = SeedCatalog::parse(&content)?;

    let errors = seed.validate();
    if !errors.is_empty() {
        error!("Seed validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors.len()).into());
    }

    info!(categories = seed.categories.len(), "Seed file validated");

    let pool = super::connect().await?;
    let report = seed.apply(&pool).await?;

    info!("Seeding complete!");
    info!(
        "  Categories: {} created, {} updated",
        report.categories_created, report.categories_updated
    );
    info!(
        "  Products: {} created, {} updated",
        report.products_created, report.products_updated
    );

    Ok(())
}
