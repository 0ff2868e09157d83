//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use ecommerce_core::{CurrencyCode, Price, Slug};

use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::models::{Product, ProductFilter};
use crate::state::AppState;

/// Product with a formatted price.
#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub display_price: String,
}

impl ProductView {
    /// Wrap a product, formatting its price in `currency`.
    #[must_use]
    pub fn new(product: Product, currency: CurrencyCode) -> Self {
        Self {
            display_price: Price::new(product.price, currency).display(),
            product,
        }
    }
}

/// Product listing filters.
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    /// Category slug.
    pub category: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

/// Parse a slug from the URL; a malformed slug can never match a row.
pub(crate) fn parse_slug(raw: &str, what: &str) -> Result<Slug> {
    Slug::parse(raw).map_err(|_| AppError::NotFound(format!("{what} {raw}")))
}

/// List active products.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProductView>>> {
    let mut filter = ProductFilter::storefront();
    filter.featured_only = query.featured;

    if let Some(raw) = query.category.as_deref() {
        let slug = parse_slug(raw, "category")?;
        let category = CategoryRepository::new(state.pool())
            .get_by_slug(&slug)
            .await?
            .filter(|c| c.is_active)
            .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;
        filter.category_id = Some(category.id);
    }

    let currency = state.config().currency;
    let products = ProductRepository::new(state.pool())
        .list(filter)
        .await?
        .into_iter()
        .map(|p| ProductView::new(p, currency))
        .collect();

    Ok(Json(products))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductView>> {
    let slug = parse_slug(&slug, "product")?;

    let product = ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    Ok(Json(ProductView::new(product, state.config().currency)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    use ecommerce_core::{CategoryId, ProductId};

    use super::*;
    use crate::routes::router;
    use crate::routes::test_support::{get, state};

    #[test]
    fn test_product_view_flattens_product() {
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(3),
            category_id: CategoryId::new(1),
            brand_id: None,
            name: "Desk Lamp".to_owned(),
            slug: Slug::parse("desk-lamp").unwrap(),
            images: vec!["products/lamp.jpg".to_owned()],
            description: None,
            price: Decimal::new(129_900, 2),
            is_active: true,
            in_stock: true,
            is_featured: true,
            on_sale: false,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(ProductView::new(product, CurrencyCode::USD)).unwrap();
        assert_eq!(json["slug"], "desk-lamp");
        assert_eq!(json["price"], "1299.00");
        assert_eq!(json["display_price"], "$1299.00");
    }

    #[test]
    fn test_parse_slug_maps_to_not_found() {
        assert!(parse_slug("desk-lamp", "product").is_ok());
        assert!(matches!(
            parse_slug("Desk Lamp", "product"),
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_slug_is_not_found_without_database() {
        let response = router(state())
            .oneshot(get("/products/Not_A_Slug"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = router(state())
            .oneshot(get("/products?category=Bad_Category"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
