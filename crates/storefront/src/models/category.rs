//! Category domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ecommerce_core::{CategoryId, Slug};

use super::{ValidationError, validate_name};

/// A product category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// URL slug (unique).
    pub slug: Slug,
    /// Banner image path.
    pub image: Option<String>,
    /// Hidden from the storefront when false.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating or replacing a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub slug: Slug,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

impl CategoryInput {
    /// Check the input before it is written.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is empty or too long, or the
    /// image path is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        if self.image.as_deref().is_some_and(|i| i.trim().is_empty()) {
            return Err(ValidationError::EmptyImagePath);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(name: &str) -> CategoryInput {
        CategoryInput {
            name: name.to_owned(),
            slug: Slug::parse("laptops").unwrap(),
            image: None,
            is_active: true,
        }
    }

    #[test]
    fn test_validate_accepts_plain_input() {
        assert!(input("Laptops").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        assert_eq!(input("   ").validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_validate_rejects_long_name() {
        let name = "x".repeat(256);
        assert!(matches!(
            input(&name).validate(),
            Err(ValidationError::NameTooLong { max: 255 })
        ));
    }

    #[test]
    fn test_deserialize_defaults_to_active() {
        let input: CategoryInput =
            serde_json::from_str(r#"{"name":"Phones","slug":"phones"}"#).unwrap();
        assert!(input.is_active);
        assert!(input.image.is_none());
    }
}
