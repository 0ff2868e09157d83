//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use tower_sessions::cookie::Key;

use crate::cart::cookie::derive_key;
use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration. The cart
/// routes are generic over the product catalog `C`; the server always uses
/// the `PostgreSQL`-backed [`CatalogClient`].
pub struct AppState<C = CatalogClient> {
    inner: Arc<AppStateInner<C>>,
}

struct AppStateInner<C> {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: C,
    cart_key: Key,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let catalog = CatalogClient::new(pool.clone());
        Self::with_catalog(config, pool, catalog)
    }
}

impl<C> AppState<C> {
    /// Create application state with a specific product catalog.
    #[must_use]
    pub fn with_catalog(config: StorefrontConfig, pool: PgPool, catalog: C) -> Self {
        let cart_key = derive_key(&config.cart_secret);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                cart_key,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &C {
        &self.inner.catalog
    }

    /// Get the key used to sign the cart cookie.
    #[must_use]
    pub fn cart_key(&self) -> &Key {
        &self.inner.cart_key
    }
}
