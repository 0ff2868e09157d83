//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use super::products::{ProductView, parse_slug};
use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::models::{Category, ProductFilter};
use crate::state::AppState;

/// Category with its active products.
#[derive(Debug, Serialize)]
pub struct CategoryView {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<ProductView>,
}

/// List active categories.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list(true).await?;
    Ok(Json(categories))
}

/// Category detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryView>> {
    let slug = parse_slug(&slug, "category")?;

    let category = CategoryRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;

    let filter = ProductFilter {
        category_id: Some(category.id),
        ..ProductFilter::storefront()
    };
    let currency = state.config().currency;
    let products = ProductRepository::new(state.pool())
        .list(filter)
        .await?
        .into_iter()
        .map(|p| ProductView::new(p, currency))
        .collect();

    Ok(Json(CategoryView { category, products }))
}
