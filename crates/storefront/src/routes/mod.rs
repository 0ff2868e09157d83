//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Catalog
//! GET  /products               - Active products (?category=slug, ?featured=true)
//! GET  /products/{slug}        - Product detail
//! GET  /categories             - Active categories
//! GET  /categories/{slug}      - Category detail with its products
//!
//! # Cart (cookie-backed, HTMX friendly)
//! GET  /cart                   - Cart contents and grand total
//! GET  /cart/count             - Line item count
//! POST /cart/add               - Add to cart (triggers cart-updated)
//! POST /cart/increase          - Add one unit (returns cart)
//! POST /cart/decrease          - Remove one unit, never below 1 (returns cart)
//! POST /cart/remove            - Remove line item (returns cart)
//! POST /cart/clear             - Empty the cart
//! ```

pub mod cart;
pub mod categories;
pub mod products;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::catalog::ProductCatalog;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{slug}", get(categories::show))
}

/// Create the cart routes router over any product catalog.
pub fn cart_routes<C>() -> Router<AppState<C>>
where
    C: ProductCatalog + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(cart::show::<C>))
        .route("/count", get(cart::count::<C>))
        .route("/add", post(cart::add::<C>))
        .route("/increase", post(cart::increase::<C>))
        .route("/decrease", post(cart::decrease::<C>))
        .route("/remove", post(cart::remove::<C>))
        .route("/clear", post(cart::clear::<C>))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
}

/// Build the full application: routes, request IDs and request tracing.
///
/// Sentry layers are added by the binary on top of this.
pub fn router(state: AppState) -> Router {
    routes()
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
