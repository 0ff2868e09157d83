//! E-commerce storefront library.
//!
//! Catalog browsing backed by `PostgreSQL` and a shopping cart that lives
//! in a signed browser cookie. The binary in `main.rs` wires these modules
//! into an axum server; the CLI reuses the repositories and migrations.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
