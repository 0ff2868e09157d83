//! Catalog inspection and cleanup commands.

use tracing::info;

use ecommerce_core::Slug;
use ecommerce_storefront::db::{CategoryRepository, ProductRepository};
use ecommerce_storefront::models::ProductFilter;

/// Log every category and product, including inactive ones.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    let categories = CategoryRepository::new(&pool).list(false).await?;
    let products = ProductRepository::new(&pool)
        .list(ProductFilter::default())
        .await?;

    info!("Catalog");
    info!("=======");
    for category in &categories {
        let status = if category.is_active { "" } else { " (inactive)" };
        info!("{} [{}]{status}", category.name, category.slug);

        for product in products.iter().filter(|p| p.category_id == category.id) {
            let status = if product.is_active { "" } else { " (inactive)" };
            info!("  {} [{}] {}{status}", product.name, product.slug, product.price);
        }
    }
    info!(
        "{} categories, {} products",
        categories.len(),
        products.len()
    );

    Ok(())
}

/// Delete a product by slug.
///
/// # Errors
///
/// Returns an error if the slug is malformed, the product does not exist, or
/// the database is unreachable.
pub async fn delete_product(slug: &str) -> Result<(), Box<dyn std::error::Error>> {
    let slug = Slug::parse(slug)?;
    let pool = super::connect().await?;
    let repo = ProductRepository::new(&pool);

    let product = repo
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| format!("Product not found: {slug}"))?;
    repo.delete(product.id).await?;

    info!("Deleted product {slug}");
    Ok(())
}

/// Delete a category by slug. Fails while products still reference it.
///
/// # Errors
///
/// Returns an error if the slug is malformed, the category does not exist or
/// still has products, or the database is unreachable.
pub async fn delete_category(slug: &str) -> Result<(), Box<dyn std::error::Error>> {
    let slug = Slug::parse(slug)?;
    let pool = super::connect().await?;
    let repo = CategoryRepository::new(&pool);

    let category = repo
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| format!("Category not found: {slug}"))?;
    repo.delete(category.id).await?;

    info!("Deleted category {slug}");
    Ok(())
}
