//! Shopping cart value and line items.
//!
//! A [`Cart`] is an ordered list of [`CartItem`]s, at most one per product.
//! Insertion order is the order in which products were first added and is
//! never changed by later updates.
//!
//! The cart has no server-side home. It is serialized to a JSON array (the
//! "blob") and handed to a [`CartStorage`], which in the storefront is a
//! signed browser cookie. Reading a missing or unreadable blob yields an
//! empty cart rather than an error.
//!
//! ```
//! use ecommerce_core::{Cart, CartItem, CatalogProduct, ProductId};
//! use rust_decimal::Decimal;
//!
//! let product = CatalogProduct {
//!     id: ProductId::new(1),
//!     name: "Desk Lamp".to_owned(),
//!     price: Decimal::from(100),
//!     images: vec!["products/lamp.jpg".to_owned()],
//! };
//!
//! let mut cart = Cart::new();
//! cart.push(CartItem::from_product(&product).unwrap());
//! cart.increase(product.id);
//!
//! assert_eq!(cart.len(), 1);
//! assert_eq!(cart.grand_total(), Decimal::from(200));
//! ```

mod storage;

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

pub use storage::{CartStorage, MemoryCartStorage};

/// The product fields a cart needs to create a new line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    /// Ordered image paths; the first one is the cart thumbnail.
    pub images: Vec<String>,
}

/// One product's quantity and subtotal within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    /// First image of the product at the time it was added.
    pub image: String,
    pub quantity: u32,
    pub unit_amount: Decimal,
    pub total_amount: Decimal,
}

impl CartItem {
    /// Build a single-unit line item from a catalog product.
    ///
    /// Returns `None` if the product has no images.
    #[must_use]
    pub fn from_product(product: &CatalogProduct) -> Option<Self> {
        let image = product.images.first()?;

        Some(Self {
            product_id: product.id,
            name: product.name.clone(),
            image: image.clone(),
            quantity: 1,
            unit_amount: product.price,
            total_amount: product.price,
        })
    }

    /// `quantity * unit_amount`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_amount
    }

    fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.total_amount = self.line_total();
    }
}

/// An ordered collection of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Wrap an existing list of line items.
    #[must_use]
    pub const fn from_items(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    /// Decode a persisted blob.
    ///
    /// Anything that is not a JSON array of line items (including `null`
    /// and the empty string) decodes to an empty cart.
    #[must_use]
    pub fn from_blob(blob: &str) -> Self {
        serde_json::from_str(blob).unwrap_or_default()
    }

    /// Encode the cart as a JSON array of line items.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    /// Read the cart from storage, falling back to an empty cart.
    #[must_use]
    pub fn load(storage: &impl CartStorage) -> Self {
        storage
            .load()
            .map(|blob| Self::from_blob(&blob))
            .unwrap_or_default()
    }

    /// Overwrite the stored blob with this cart.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails; storage is left untouched.
    pub fn save(&self, storage: &mut impl CartStorage) -> Result<(), serde_json::Error> {
        storage.store(self.to_blob()?);
        Ok(())
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Number of line items (not units).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the first line item for `product_id`.
    #[must_use]
    pub fn position(&self, product_id: ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product_id == product_id)
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.position(product_id).is_some()
    }

    fn first_mut(&mut self, product_id: ProductId) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| item.product_id == product_id)
    }

    /// Append a new line item.
    ///
    /// Callers check [`Cart::contains`] first; a second line for the same
    /// product is never appended.
    pub fn push(&mut self, item: CartItem) {
        if self.contains(item.product_id) {
            return;
        }
        self.items.push(item);
    }

    /// Add one unit to the first line for `product_id`.
    ///
    /// Returns `false` if the product is not in the cart.
    pub fn increase(&mut self, product_id: ProductId) -> bool {
        match self.first_mut(product_id) {
            Some(item) => {
                item.set_quantity(item.quantity.saturating_add(1));
                true
            }
            None => false,
        }
    }

    /// Remove one unit from the first line for `product_id`.
    ///
    /// The quantity never drops below 1; use [`Cart::remove`] to delete a
    /// line. Returns `true` if the quantity changed.
    pub fn decrease(&mut self, product_id: ProductId) -> bool {
        match self.first_mut(product_id) {
            Some(item) if item.quantity > 1 => {
                item.set_quantity(item.quantity - 1);
                true
            }
            _ => false,
        }
    }

    /// Replace the quantity of the first line for `product_id`.
    ///
    /// Returns `false` if the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: NonZeroU32) -> bool {
        match self.first_mut(product_id) {
            Some(item) => {
                item.set_quantity(quantity.get());
                true
            }
            None => false,
        }
    }

    /// Delete every line for `product_id`.
    pub fn remove(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.product_id != product_id);
    }

    /// Sum of `total_amount` across the cart.
    #[must_use]
    pub fn grand_total(&self) -> Decimal {
        grand_total(&self.items)
    }
}

/// Sum of `total_amount` across `items`.
#[must_use]
pub fn grand_total(items: &[CartItem]) -> Decimal {
    items.iter().map(|item| item.total_amount).sum()
}
