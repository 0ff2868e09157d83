//! Cookie-backed shopping cart.
//!
//! [`CartStore`] runs every cart operation as read → mutate → write: it loads
//! the whole cart from a [`CartStorage`], changes it in memory and writes the
//! whole cart back. Products are looked up in a [`ProductCatalog`] only when a
//! new line item has to be created.
//!
//! Nothing here fails because of a missing product or an unreadable cart:
//! unknown products are skipped and unreadable blobs read as an empty cart.
//! The only errors are a failing catalog backend and blob encoding.

pub mod cookie;

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, instrument};

use ecommerce_core::cart::grand_total;
use ecommerce_core::{Cart, CartItem, CartStorage, ProductId};

use crate::catalog::ProductCatalog;
use crate::db::RepositoryError;

pub use cookie::{CART_COOKIE_MAX_AGE_MINUTES, CART_COOKIE_NAME, CartCookies};

/// Errors surfaced by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product catalog could not be queried.
    #[error("catalog lookup failed: {0}")]
    Catalog(#[from] RepositoryError),

    /// The cart could not be encoded for storage.
    #[error("cart encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Cart operations over a request-scoped storage slot.
pub struct CartStore<'a, S, C> {
    storage: &'a mut S,
    catalog: &'a C,
}

impl<'a, S, C> CartStore<'a, S, C>
where
    S: CartStorage + Send,
    C: ProductCatalog + Sync,
{
    /// Create a cart store over `storage`, hydrating new items from `catalog`.
    pub const fn new(storage: &'a mut S, catalog: &'a C) -> Self {
        Self { storage, catalog }
    }

    /// Current cart contents.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        Cart::load(&*self.storage).into_items()
    }

    /// Number of line items in the cart.
    #[must_use]
    pub fn count(&self) -> usize {
        Cart::load(&*self.storage).len()
    }

    fn persist(&mut self, cart: &Cart) -> Result<(), CartError> {
        cart.save(&mut *self.storage)?;
        Ok(())
    }

    /// Build a line item for a product that is not yet in the cart.
    async fn hydrate(&self, product_id: ProductId) -> Result<Option<CartItem>, CartError> {
        let Some(product) = self.catalog.find_product(product_id).await? else {
            debug!(product_id = %product_id, "Product not found, skipping add");
            return Ok(None);
        };

        let item = CartItem::from_product(&product);
        if item.is_none() {
            debug!(product_id = %product_id, "Product has no images, skipping add");
        }
        Ok(item)
    }

    /// Add one unit of a product.
    ///
    /// Increments the existing line if there is one; otherwise looks the
    /// product up and appends a single-unit line. Unknown products leave the
    /// cart unchanged.
    ///
    /// Returns the number of line items afterwards.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Catalog` if the product lookup fails.
    #[instrument(skip(self))]
    pub async fn add_item(&mut self, product_id: ProductId) -> Result<usize, CartError> {
        let mut cart = Cart::load(&*self.storage);

        if !cart.increase(product_id)
            && let Some(item) = self.hydrate(product_id).await?
        {
            cart.push(item);
        }

        self.persist(&cart)?;
        Ok(cart.len())
    }

    /// Add a product with an explicit quantity.
    ///
    /// An existing line gets its quantity replaced (not incremented) and its
    /// total recomputed. A new line gets `quantity` units but its total is
    /// left at the unit price; callers that display totals should use
    /// [`CartItem::line_total`] for such lines.
    ///
    /// Returns the number of line items afterwards.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Catalog` if the product lookup fails.
    #[instrument(skip(self))]
    pub async fn add_item_with_quantity(
        &mut self,
        product_id: ProductId,
        quantity: NonZeroU32,
    ) -> Result<usize, CartError> {
        let mut cart = Cart::load(&*self.storage);

        if !cart.set_quantity(product_id, quantity)
            && let Some(mut item) = self.hydrate(product_id).await?
        {
            // total_amount intentionally stays at the unit price here.
            item.quantity = quantity.get();
            cart.push(item);
        }

        self.persist(&cart)?;
        Ok(cart.len())
    }

    /// Delete every line for a product. Returns the remaining items.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Encode` if the cart cannot be written back.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, product_id: ProductId) -> Result<Vec<CartItem>, CartError> {
        let mut cart = Cart::load(&*self.storage);
        cart.remove(product_id);
        self.persist(&cart)?;
        Ok(cart.into_items())
    }

    /// Add one unit to an existing line. Returns the updated items.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Encode` if the cart cannot be written back.
    #[instrument(skip(self))]
    pub fn increase_quantity(&mut self, product_id: ProductId) -> Result<Vec<CartItem>, CartError> {
        let mut cart = Cart::load(&*self.storage);
        cart.increase(product_id);
        self.persist(&cart)?;
        Ok(cart.into_items())
    }

    /// Remove one unit from an existing line, never going below 1.
    /// Returns the updated items.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Encode` if the cart cannot be written back.
    #[instrument(skip(self))]
    pub fn decrease_quantity(&mut self, product_id: ProductId) -> Result<Vec<CartItem>, CartError> {
        let mut cart = Cart::load(&*self.storage);
        cart.decrease(product_id);
        self.persist(&cart)?;
        Ok(cart.into_items())
    }

    /// Erase the stored cart.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        self.storage.forget();
    }
}

/// Sum of `total_amount` across `items`.
#[must_use]
pub fn calculate_grand_total(items: &[CartItem]) -> Decimal {
    grand_total(items)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ecommerce_core::{CatalogProduct, MemoryCartStorage};

    use super::*;

    /// In-memory catalog that counts lookups.
    #[derive(Default)]
    struct FakeCatalog {
        products: HashMap<ProductId, CatalogProduct>,
        lookups: AtomicUsize,
        fail: bool,
    }

    impl FakeCatalog {
        fn with(products: &[(i32, i64)]) -> Self {
            Self {
                products: products
                    .iter()
                    .map(|&(id, price)| {
                        let id = ProductId::new(id);
                        let product = CatalogProduct {
                            id,
                            name: format!("Product {id}"),
                            price: Decimal::from(price),
                            images: vec![format!("products/{id}.jpg")],
                        };
                        (id, product)
                    })
                    .collect(),
                ..Self::default()
            }
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    impl ProductCatalog for FakeCatalog {
        async fn find_product(
            &self,
            id: ProductId,
        ) -> Result<Option<CatalogProduct>, RepositoryError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RepositoryError::NotFound);
            }
            Ok(self.products.get(&id).cloned())
        }
    }

    const P1: ProductId = ProductId::new(1);
    const P2: ProductId = ProductId::new(2);

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn assert_totals_consistent(items: &[CartItem]) {
        for item in items {
            assert_eq!(item.total_amount, item.line_total(), "{item:?}");
        }
    }

    #[tokio::test]
    async fn test_walkthrough_add_add_decrease_remove() {
        let catalog = FakeCatalog::with(&[(1, 100)]);
        let mut storage = MemoryCartStorage::default();
        let mut store = CartStore::new(&mut storage, &catalog);

        assert_eq!(store.add_item(P1).await.unwrap(), 1);
        let items = store.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[0].total_amount, Decimal::from(100));

        assert_eq!(store.add_item(P1).await.unwrap(), 1);
        let items = store.items();
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].total_amount, Decimal::from(200));

        let items = store.decrease_quantity(P1).unwrap();
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[0].total_amount, Decimal::from(100));

        let items = store.remove_item(P1).unwrap();
        assert!(items.is_empty());
        assert!(store.items().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_adds_keep_one_line_per_product() {
        let catalog = FakeCatalog::with(&[(1, 100), (2, 30)]);
        let mut storage = MemoryCartStorage::default();
        let mut store = CartStore::new(&mut storage, &catalog);

        for expected_qty in 1..=5 {
            assert_eq!(store.add_item(P1).await.unwrap(), 1);
            assert_eq!(store.items()[0].quantity, expected_qty);
        }
        assert_eq!(store.add_item(P2).await.unwrap(), 2);
        assert_eq!(store.add_item(P2).await.unwrap(), 2);

        let items = store.items();
        assert_totals_consistent(&items);
        assert_eq!(
            calculate_grand_total(&items),
            Decimal::from(560)
        );
    }

    #[tokio::test]
    async fn test_existing_item_skips_catalog_lookup() {
        let catalog = FakeCatalog::with(&[(1, 100)]);
        let mut storage = MemoryCartStorage::default();
        let mut store = CartStore::new(&mut storage, &catalog);

        store.add_item(P1).await.unwrap();
        store.add_item(P1).await.unwrap();
        store.add_item_with_quantity(P1, qty(4)).await.unwrap();

        assert_eq!(catalog.lookups(), 1);
    }

    #[tokio::test]
    async fn test_every_new_line_asks_the_catalog() {
        let mut catalog = FakeCatalog::with(&[(1, 100)]);
        let mut storage = MemoryCartStorage::default();

        let mut store = CartStore::new(&mut storage, &catalog);
        store.add_item(P1).await.unwrap();
        store.remove_item(P1).unwrap();

        catalog.products.remove(&P1);
        let mut store = CartStore::new(&mut storage, &catalog);
        assert_eq!(store.add_item(P1).await.unwrap(), 0);
        assert_eq!(store.add_item_with_quantity(P1, qty(2)).await.unwrap(), 0);
        assert!(store.items().is_empty());
        assert_eq!(catalog.lookups(), 3);
    }

    #[tokio::test]
    async fn test_unknown_product_is_noop() {
        let catalog = FakeCatalog::with(&[(1, 100)]);
        let mut storage = MemoryCartStorage::default();
        let mut store = CartStore::new(&mut storage, &catalog);

        store.add_item(P1).await.unwrap();
        assert_eq!(store.add_item(ProductId::new(99)).await.unwrap(), 1);
        assert_eq!(
            store
                .add_item_with_quantity(ProductId::new(99), qty(3))
                .await
                .unwrap(),
            1
        );
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn test_product_without_images_is_skipped() {
        let mut catalog = FakeCatalog::with(&[(1, 100)]);
        catalog.products.get_mut(&P1).unwrap().images.clear();
        let mut storage = MemoryCartStorage::default();
        let mut store = CartStore::new(&mut storage, &catalog);

        assert_eq!(store.add_item(P1).await.unwrap(), 0);
        assert!(store.items().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_failure_is_reported_and_cart_untouched() {
        let mut catalog = FakeCatalog::with(&[(1, 100)]);
        catalog.fail = true;
        let mut storage = MemoryCartStorage::default();
        let mut store = CartStore::new(&mut storage, &catalog);

        let err = store.add_item(P1).await.unwrap_err();
        assert!(matches!(err, CartError::Catalog(_)));
        assert!(storage.blob().is_none());
    }

    #[tokio::test]
    async fn test_add_with_quantity_replaces_existing_quantity() {
        let catalog = FakeCatalog::with(&[(1, 100)]);
        let mut storage = MemoryCartStorage::default();
        let mut store = CartStore::new(&mut storage, &catalog);

        store.add_item(P1).await.unwrap();
        store.add_item(P1).await.unwrap();
        store.add_item_with_quantity(P1, qty(7)).await.unwrap();

        let items = store.items();
        assert_eq!(items[0].quantity, 7);
        assert_eq!(items[0].total_amount, Decimal::from(700));

        store.add_item_with_quantity(P1, qty(2)).await.unwrap();
        assert_eq!(store.items()[0].quantity, 2);
        assert_eq!(store.items()[0].total_amount, Decimal::from(200));
    }

    #[tokio::test]
    async fn test_add_with_quantity_new_line_keeps_unit_price_total() {
        let catalog = FakeCatalog::with(&[(1, 100)]);
        let mut storage = MemoryCartStorage::default();
        let mut store = CartStore::new(&mut storage, &catalog);

        assert_eq!(store.add_item_with_quantity(P1, qty(3)).await.unwrap(), 1);

        let item = &store.items()[0];
        assert_eq!(item.quantity, 3);
        assert_eq!(item.unit_amount, Decimal::from(100));
        assert_eq!(item.total_amount, Decimal::from(100));
        assert_eq!(item.line_total(), Decimal::from(300));

        // The next quantity change brings the total back in line.
        let items = store.increase_quantity(P1).unwrap();
        assert_eq!(items[0].quantity, 4);
        assert_eq!(items[0].total_amount, Decimal::from(400));
    }

    #[tokio::test]
    async fn test_decrease_never_goes_below_one() {
        let catalog = FakeCatalog::with(&[(1, 100)]);
        let mut storage = MemoryCartStorage::default();
        let mut store = CartStore::new(&mut storage, &catalog);

        store.add_item(P1).await.unwrap();
        for _ in 0..4 {
            let items = store.decrease_quantity(P1).unwrap();
            assert_eq!(items[0].quantity, 1);
            assert_eq!(items[0].total_amount, Decimal::from(100));
        }
    }

    #[tokio::test]
    async fn test_increase_and_decrease_on_missing_product_are_noops() {
        let catalog = FakeCatalog::with(&[(1, 100)]);
        let mut storage = MemoryCartStorage::default();
        let mut store = CartStore::new(&mut storage, &catalog);

        store.add_item(P1).await.unwrap();
        let before = store.items();
        assert_eq!(store.increase_quantity(P2).unwrap(), before);
        assert_eq!(store.decrease_quantity(P2).unwrap(), before);
        assert_eq!(catalog.lookups(), 1);
    }

    #[tokio::test]
    async fn test_remove_excludes_item_from_grand_total() {
        let catalog = FakeCatalog::with(&[(1, 100), (2, 45)]);
        let mut storage = MemoryCartStorage::default();
        let mut store = CartStore::new(&mut storage, &catalog);

        store.add_item(P1).await.unwrap();
        store.add_item(P2).await.unwrap();
        store.increase_quantity(P2).unwrap();

        let items = store.remove_item(P1).unwrap();
        assert_eq!(
            calculate_grand_total(&items),
            Decimal::from(90)
        );
        assert!(items.iter().all(|i| i.product_id != P1));
    }

    #[tokio::test]
    async fn test_clear_erases_storage() {
        let catalog = FakeCatalog::with(&[(1, 100)]);
        let mut storage = MemoryCartStorage::default();
        {
            let mut store = CartStore::new(&mut storage, &catalog);
            store.add_item(P1).await.unwrap();
            store.clear();
        }
        assert!(storage.blob().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_blob_reads_as_empty_and_is_overwritten() {
        let catalog = FakeCatalog::with(&[(1, 100)]);
        let mut storage = MemoryCartStorage::with_blob("{{not json");
        let mut store = CartStore::new(&mut storage, &catalog);

        assert!(store.items().is_empty());
        assert_eq!(store.add_item(P1).await.unwrap(), 1);
        assert_eq!(store.items().len(), 1);
    }

    #[tokio::test]
    async fn test_state_survives_a_new_store_over_the_same_storage() {
        let catalog = FakeCatalog::with(&[(1, 100), (2, 50)]);
        let mut storage = MemoryCartStorage::default();

        let written = {
            let mut store = CartStore::new(&mut storage, &catalog);
            store.add_item(P2).await.unwrap();
            store.add_item(P1).await.unwrap();
            store.increase_quantity(P2).unwrap()
        };

        let store = CartStore::new(&mut storage, &catalog);
        assert_eq!(store.items(), written);
    }
}
