//! E-commerce CLI - Database migrations and catalog management.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! ecommerce-cli migrate
//!
//! # Create or update categories and products from a YAML file
//! ecommerce-cli seed crates/cli/fixtures/catalog.yaml
//!
//! # Inspect and clean up the catalog
//! ecommerce-cli catalog list
//! ecommerce-cli catalog delete-product desk-lamp
//! ecommerce-cli catalog delete-category lighting
//! ```
//!
//! All commands read `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ecommerce-cli")]
#[command(author, version, about = "E-commerce storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Create or update the catalog from a YAML file
    Seed {
        /// Path to the seed file
        file: String,
    },
    /// Inspect or clean up the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List categories and their products
    List,
    /// Delete a product
    DeleteProduct {
        /// Product slug
        slug: String,
    },
    /// Delete a category that has no products
    DeleteCategory {
        /// Category slug
        slug: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { file } => commands::seed::catalog(&file).await?,
        Commands::Catalog { action } => match action {
            CatalogAction::List => commands::catalog::list().await?,
            CatalogAction::DeleteProduct { slug } => {
                commands::catalog::delete_product(&slug).await?;
            }
            CatalogAction::DeleteCategory { slug } => {
                commands::catalog::delete_category(&slug).await?;
            }
        },
    }
    Ok(())
}
