//! Ecommerce Core - Shared types and cart logic.
//!
//! This crate provides common types used across all ecommerce components:
//! - `storefront` - Public-facing catalog and cart service
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure list logic - no I/O,
//! no database access, no HTTP. Persisting a cart is delegated to a
//! [`cart::CartStorage`] implementation supplied by the caller.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and slugs
//! - [`cart`] - The cart value, its line items and the persisted blob format

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartItem, CartStorage, CatalogProduct, MemoryCartStorage};
pub use types::*;
