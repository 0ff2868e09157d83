//! Domain models for the storefront catalog.
//!
//! Categories and products are stored in `PostgreSQL` and managed through the
//! repositories in [`crate::db`]. Cart types live in `ecommerce_core::cart`;
//! the cart never touches the database.

pub mod category;
pub mod product;

pub use category::{Category, CategoryInput};
pub use product::{Product, ProductFilter, ProductInput};

use ecommerce_core::PriceError;

/// Maximum length of a name column (`VARCHAR(255)`).
pub const MAX_NAME_LENGTH: usize = 255;

/// Validation failures for catalog input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name cannot be empty")]
    EmptyName,
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error(transparent)]
    Price(#[from] PriceError),
    #[error("a product can have at most {max} images")]
    TooManyImages { max: usize },
    #[error("image path cannot be empty")]
    EmptyImagePath,
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong {
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}
