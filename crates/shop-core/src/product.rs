//! # Product Types
//!
//! Catalog product types for the storefront.
//! A seed catalog can be loaded from `config/catalog.toml`.

use crate::error::{ShopError, ShopResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product in the catalog.
///
/// Immutable from the core's point of view once referenced by an order line;
/// owner-side CRUD happens outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier
    pub id: String,

    /// Display title
    pub title: String,

    /// Unit price in decimal currency units (must be > 0)
    pub price: Decimal,

    /// Short description
    pub description: String,

    /// Optional image reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Owning user id
    pub owner_id: String,
}

impl Product {
    /// Create a new product
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        price: Decimal,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            description: String::new(),
            image_url: None,
            owner_id: owner_id.into(),
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: set image reference
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Validate the data-model invariants (price > 0, non-empty id/title)
    pub fn validate(&self) -> ShopResult<()> {
        if self.id.is_empty() || self.title.is_empty() {
            return Err(ShopError::Configuration(format!(
                "Product with empty id or title: {:?}",
                self.id
            )));
        }
        if self.price <= Decimal::ZERO {
            return Err(ShopError::Configuration(format!(
                "Product {} has non-positive price {}",
                self.id, self.price
            )));
        }
        Ok(())
    }
}

/// Seed catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub products: Vec<Product>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// Add a product to the catalog
    pub fn add(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Find a product by id
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Validate every product in the catalog
    pub fn validate(&self) -> ShopResult<()> {
        for product in &self.products {
            product.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_product_builder() {
        let product = Product::new(
            "book-1",
            "A Book",
            Decimal::from_str("12.99").unwrap(),
            "user-1",
        )
        .with_description("A very good book")
        .with_image("images/book-1.png");

        assert_eq!(product.id, "book-1");
        assert_eq!(product.description, "A very good book");
        assert_eq!(product.image_url.as_deref(), Some("images/book-1.png"));
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_price() {
        let free = Product::new("free", "Freebie", Decimal::ZERO, "user-1");
        assert!(matches!(
            free.validate(),
            Err(ShopError::Configuration(_))
        ));

        let negative = Product::new("neg", "Refund?", Decimal::from(-1), "user-1");
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_catalog_from_toml() {
        let toml_str = r#"
            [[products]]
            id = "book-1"
            title = "A Book"
            price = "12.99"
            description = "A very good book"
            owner_id = "user-1"

            [[products]]
            id = "mug-1"
            title = "A Mug"
            price = "5.00"
            description = ""
            image_url = "images/mug.png"
            owner_id = "user-1"
        "#;

        let catalog = Catalog::from_toml(toml_str).unwrap();
        assert_eq!(catalog.products.len(), 2);
        assert!(catalog.validate().is_ok());

        let book = catalog.get("book-1").unwrap();
        assert_eq!(book.price, Decimal::from_str("12.99").unwrap());
        assert!(catalog.get("missing").is_none());
    }
}
