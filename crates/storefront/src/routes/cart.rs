//! Cart route handlers.
//!
//! The cart lives entirely in the signed `cart_items` cookie; nothing is
//! stored server-side. Every mutation answers with the updated cart (or
//! count), the changed cookie and an `HX-Trigger: cart-updated` header so
//! badges elsewhere on the page refresh.

use std::num::NonZeroU32;

use axum::{
    Form, Json,
    extract::State,
    response::{AppendHeaders, IntoResponse},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use ecommerce_core::{CartItem, CurrencyCode, Price, ProductId};

use crate::cart::{CartCookies, CartStore, calculate_grand_total};
use crate::catalog::ProductCatalog;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

const CART_UPDATED: [(&str, &str); 1] = [("HX-Trigger", "cart-updated")];

/// Cart line item with display strings.
#[derive(Debug, Serialize)]
pub struct CartItemView {
    #[serde(flatten)]
    pub item: CartItem,
    pub display_unit_amount: String,
    pub display_total_amount: String,
}

/// Cart display data.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub grand_total: Decimal,
    pub display_grand_total: String,
    pub item_count: usize,
}

impl CartView {
    fn new(items: Vec<CartItem>, currency: CurrencyCode) -> Self {
        let grand_total = calculate_grand_total(&items);

        Self {
            item_count: items.len(),
            display_grand_total: Price::new(grand_total, currency).display(),
            grand_total,
            items: items
                .into_iter()
                .map(|item| CartItemView {
                    display_unit_amount: Price::new(item.unit_amount, currency).display(),
                    display_total_amount: Price::new(item.total_amount, currency).display(),
                    item,
                })
                .collect(),
        }
    }
}

/// Line item count.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: usize,
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Form data naming a cart line.
#[derive(Debug, Deserialize)]
pub struct CartLineForm {
    pub product_id: ProductId,
}

/// Display the cart.
#[instrument(skip(state, cookies))]
pub async fn show<C: ProductCatalog + Send + Sync>(
    State(state): State<AppState<C>>,
    mut cookies: CartCookies,
) -> Json<CartView> {
    let items = CartStore::new(&mut cookies, state.catalog()).items();
    Json(CartView::new(items, state.config().currency))
}

/// Cart count badge.
#[instrument(skip(state, cookies))]
pub async fn count<C: ProductCatalog + Send + Sync>(
    State(state): State<AppState<C>>,
    mut cookies: CartCookies,
) -> Json<CartCount> {
    let count = CartStore::new(&mut cookies, state.catalog()).count();
    Json(CartCount { count })
}

/// Add a product to the cart.
///
/// Without `quantity` this adds one unit; with it the line's quantity is set.
/// Unknown products are ignored and the count is returned unchanged.
#[instrument(skip(state, cookies))]
pub async fn add<C: ProductCatalog + Send + Sync>(
    State(state): State<AppState<C>>,
    mut cookies: CartCookies,
    Form(form): Form<AddToCartForm>,
) -> Result<impl IntoResponse> {
    let mut store = CartStore::new(&mut cookies, state.catalog());

    let count = match form.quantity {
        None => store.add_item(form.product_id).await?,
        Some(quantity) => {
            let quantity = NonZeroU32::new(quantity)
                .ok_or_else(|| AppError::BadRequest("quantity must be at least 1".to_string()))?;
            store
                .add_item_with_quantity(form.product_id, quantity)
                .await?
        }
    };

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", &form.product_id.to_string())]),
    );

    Ok((cookies, AppendHeaders(CART_UPDATED), Json(CartCount { count })))
}

/// Add one unit to a cart line.
#[instrument(skip(state, cookies))]
pub async fn increase<C: ProductCatalog + Send + Sync>(
    State(state): State<AppState<C>>,
    mut cookies: CartCookies,
    Form(form): Form<CartLineForm>,
) -> Result<impl IntoResponse> {
    let items =
        CartStore::new(&mut cookies, state.catalog()).increase_quantity(form.product_id)?;
    let cart = CartView::new(items, state.config().currency);

    Ok((cookies, AppendHeaders(CART_UPDATED), Json(cart)))
}

/// Remove one unit from a cart line, keeping at least one.
#[instrument(skip(state, cookies))]
pub async fn decrease<C: ProductCatalog + Send + Sync>(
    State(state): State<AppState<C>>,
    mut cookies: CartCookies,
    Form(form): Form<CartLineForm>,
) -> Result<impl IntoResponse> {
    let items =
        CartStore::new(&mut cookies, state.catalog()).decrease_quantity(form.product_id)?;
    let cart = CartView::new(items, state.config().currency);

    Ok((cookies, AppendHeaders(CART_UPDATED), Json(cart)))
}

/// Remove a line from the cart.
#[instrument(skip(state, cookies))]
pub async fn remove<C: ProductCatalog + Send + Sync>(
    State(state): State<AppState<C>>,
    mut cookies: CartCookies,
    Form(form): Form<CartLineForm>,
) -> Result<impl IntoResponse> {
    let items =
        CartStore::new(&mut cookies, state.catalog()).remove_item(form.product_id)?;
    let cart = CartView::new(items, state.config().currency);

    add_breadcrumb(
        "cart",
        "Removed from cart",
        Some(&[("product_id", &form.product_id.to_string())]),
    );

    Ok((cookies, AppendHeaders(CART_UPDATED), Json(cart)))
}

/// Empty the cart.
#[instrument(skip(state, cookies))]
pub async fn clear<C: ProductCatalog + Send + Sync>(
    State(state): State<AppState<C>>,
    mut cookies: CartCookies,
) -> impl IntoResponse {
    CartStore::new(&mut cookies, state.catalog()).clear();
    let cart = CartView::new(Vec::new(), state.config().currency);

    (cookies, AppendHeaders(CART_UPDATED), Json(cart))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
    use axum::http::{Request, Response, StatusCode};
    use tower::ServiceExt;

    use ecommerce_core::CatalogProduct;

    use super::*;
    use crate::routes::cart_routes;
    use crate::routes::test_support::{MemoryCatalog, body_json, get, state_with};

    fn product(id: i32, price: i64) -> CatalogProduct {
        CatalogProduct {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Decimal::from(price),
            images: vec![format!("products/{id}.jpg")],
        }
    }

    /// A browser: keeps the cart cookie between requests.
    struct Client {
        app: Router,
        state: AppState<MemoryCatalog>,
        cookie: Option<String>,
    }

    impl Client {
        fn new(products: &[(i32, i64)]) -> Self {
            let state = state_with(MemoryCatalog::default());
            for &(id, price) in products {
                state.catalog().insert(product(id, price));
            }

            Self {
                app: Router::new()
                    .nest("/cart", cart_routes())
                    .with_state(state.clone()),
                state,
                cookie: None,
            }
        }

        async fn send(&mut self, mut request: Request<Body>) -> Response<Body> {
            if let Some(cookie) = &self.cookie {
                request
                    .headers_mut()
                    .insert(COOKIE, cookie.parse().unwrap());
            }

            let response = self.app.clone().oneshot(request).await.unwrap();

            if let Some(set_cookie) = response.headers().get(SET_COOKIE) {
                let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
                self.cookie = Some(pair.to_owned());
            }
            response
        }

        async fn post(&mut self, uri: &str, form: &str) -> Response<Body> {
            let request = Request::builder()
                .method("POST")
                .uri(uri)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_owned()))
                .unwrap();
            self.send(request).await
        }

        async fn cart(&mut self) -> serde_json::Value {
            let response = self.send(get("/cart")).await;
            assert_eq!(response.status(), StatusCode::OK);
            body_json(response).await
        }
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let mut client = Client::new(&[]);

        let cart = client.cart().await;
        assert_eq!(cart["items"], serde_json::json!([]));
        assert_eq!(cart["grand_total"], "0");
        assert_eq!(cart["display_grand_total"], "₱0.00");
        assert_eq!(cart["item_count"], 0);
    }

    #[tokio::test]
    async fn test_add_sets_cookie_and_triggers_update() {
        let mut client = Client::new(&[(1, 100)]);

        let response = client.post("/cart/add", "product_id=1").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["HX-Trigger"], "cart-updated");

        let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("cart_items="));
        assert!(set_cookie.contains("HttpOnly"));

        assert_eq!(body_json(response).await["count"], 1);
    }

    #[tokio::test]
    async fn test_cart_walkthrough() {
        let mut client = Client::new(&[(1, 100)]);

        client.post("/cart/add", "product_id=1").await;
        let cart = client.cart().await;
        assert_eq!(cart["items"][0]["product_id"], 1);
        assert_eq!(cart["items"][0]["quantity"], 1);
        assert_eq!(cart["items"][0]["total_amount"], "100");
        assert_eq!(cart["items"][0]["image"], "products/1.jpg");

        let response = client.post("/cart/add", "product_id=1").await;
        assert_eq!(body_json(response).await["count"], 1);
        let cart = client.cart().await;
        assert_eq!(cart["items"][0]["quantity"], 2);
        assert_eq!(cart["grand_total"], "200");
        assert_eq!(cart["display_grand_total"], "₱200.00");

        let response = client.post("/cart/decrease", "product_id=1").await;
        let cart = body_json(response).await;
        assert_eq!(cart["items"][0]["quantity"], 1);
        assert_eq!(cart["items"][0]["total_amount"], "100");

        let response = client.post("/cart/remove", "product_id=1").await;
        let cart = body_json(response).await;
        assert_eq!(cart["items"], serde_json::json!([]));
        assert_eq!(client.cart().await["item_count"], 0);
    }

    #[tokio::test]
    async fn test_add_with_quantity_and_increase() {
        let mut client = Client::new(&[(1, 100), (2, 25)]);

        client.post("/cart/add", "product_id=2").await;
        client.post("/cart/add", "product_id=2&quantity=4").await;
        let response = client.post("/cart/increase", "product_id=2").await;

        let cart = body_json(response).await;
        assert_eq!(cart["items"][0]["quantity"], 5);
        assert_eq!(cart["items"][0]["total_amount"], "125");
        assert_eq!(cart["items"][0]["display_unit_amount"], "₱25.00");
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let mut client = Client::new(&[(1, 100)]);

        let response = client.post("/cart/add", "product_id=1&quantity=0").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!response.headers().contains_key(SET_COOKIE));
    }

    #[tokio::test]
    async fn test_count_tracks_line_items() {
        let mut client = Client::new(&[(1, 100), (2, 25)]);

        client.post("/cart/add", "product_id=1").await;
        client.post("/cart/add", "product_id=2").await;
        client.post("/cart/add", "product_id=2").await;

        let response = client.send(get("/cart/count")).await;
        assert_eq!(body_json(response).await["count"], 2);
    }

    #[tokio::test]
    async fn test_clear_expires_cookie() {
        let mut client = Client::new(&[(1, 100)]);

        client.post("/cart/add", "product_id=1").await;
        let response = client.post("/cart/clear", "").await;
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
        assert_eq!(body_json(response).await["item_count"], 0);
        assert_eq!(client.cart().await["items"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_tampered_cookie_is_an_empty_cart() {
        let mut client = Client::new(&[(1, 100)]);

        client.post("/cart/add", "product_id=1").await;
        let cookie = client.cookie.clone().unwrap();
        client.cookie = Some(cookie.replace("%22100%22", "%221%22"));

        assert_eq!(client.cart().await["items"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_deleted_product_is_not_added() {
        let mut client = Client::new(&[(1, 100), (2, 25)]);

        client.post("/cart/add", "product_id=1").await;
        client.state.catalog().delete(ProductId::new(1));
        client.post("/cart/remove", "product_id=1").await;

        let response = client.post("/cart/add", "product_id=1").await;
        assert_eq!(body_json(response).await["count"], 0);
        let response = client.post("/cart/add", "product_id=1&quantity=3").await;
        assert_eq!(body_json(response).await["count"], 0);
        assert_eq!(client.cart().await["items"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_new_line_uses_current_price() {
        let mut client = Client::new(&[(1, 100)]);

        client.post("/cart/add", "product_id=1").await;
        client.post("/cart/remove", "product_id=1").await;
        client.state.catalog().insert(product(1, 80));
        client.post("/cart/add", "product_id=1").await;

        let cart = client.cart().await;
        assert_eq!(cart["items"][0]["unit_amount"], "80");
        assert_eq!(cart["grand_total"], "80");
    }

    #[tokio::test]
    async fn test_missing_product_id_is_rejected() {
        let mut client = Client::new(&[]);

        let response = client.post("/cart/remove", "").await;
        assert!(response.status().is_client_error());
    }
}
