//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! ecommerce-cli migrate
//! ```
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded in the
//! storefront library, so this binary does not need the source tree at
//! runtime.

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn storefront() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running storefront migrations...");
    ecommerce_storefront::db::run_migrations(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
