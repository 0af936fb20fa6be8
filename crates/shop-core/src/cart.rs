//! # Cart Types and Engine
//!
//! The cart lives in two stages:
//!
//! - [`Cart`] is the unresolved form persisted per user: product ids,
//!   quantities, and a cached title/price for display.
//! - [`PopulatedCart`] is the resolved form used by checkout and order
//!   creation: full product values plus quantities, produced only by
//!   [`CartEngine::populate`].
//!
//! Keeping the two stages as distinct types means nothing downstream can
//! operate on a cart that was never populated.

use crate::error::{ShopError, ShopResult};
use crate::product::Product;
use crate::store::{CartStore, ProductStore};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// A line item in an unresolved cart.
///
/// `title` and `unit_price` are display caches refreshed on every add;
/// authoritative pricing always comes from populating the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Product id (reference, not ownership)
    pub product_id: String,

    /// Quantity, always >= 1
    pub quantity: u32,

    /// Cached product title
    pub title: String,

    /// Cached unit price
    pub unit_price: Decimal,
}

/// A user's cart: at most one line item per product id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Owning user id
    pub user_id: String,

    /// Line items, keyed by product id (one line per product)
    pub items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart for a user
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            items: Vec::new(),
        }
    }

    /// Add one unit of a product: increments the existing line and refreshes
    /// its cached title/price, or appends a new line with quantity 1.
    pub fn upsert(&mut self, product: &Product) {
        match self.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(line) => {
                line.quantity += 1;
                line.title = product.title.clone();
                line.unit_price = product.price;
            }
            None => self.items.push(CartLineItem {
                product_id: product.id.clone(),
                quantity: 1,
                title: product.title.clone(),
                unit_price: product.price,
            }),
        }
    }

    /// Remove the whole line for a product. Returns false if no line matched;
    /// removal is all-or-nothing per line, there is no quantity decrement.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    /// Reset the line-item collection to empty
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Look up the line for a product
    pub fn line(&self, product_id: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// A cart line resolved to the current full product record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulatedLineItem {
    pub product: Product,
    pub quantity: u32,
}

impl PopulatedLineItem {
    /// quantity x current unit price
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// A fully resolved cart, ready for checkout or order creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulatedCart {
    pub user_id: String,
    pub items: Vec<PopulatedLineItem>,
}

impl PopulatedCart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of quantity x price over all lines
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|i| i.line_total()).sum()
    }
}

/// Owns the add/update/remove/clear logic over a user's line items.
///
/// Every mutation is a read-modify-write of the whole persisted cart
/// document; concurrent mutations of the same cart resolve last-write-wins.
pub struct CartEngine {
    carts: Arc<dyn CartStore>,
    products: Arc<dyn ProductStore>,
}

impl CartEngine {
    pub fn new(carts: Arc<dyn CartStore>, products: Arc<dyn ProductStore>) -> Self {
        Self { carts, products }
    }

    /// Load the user's cart, or start an empty one.
    /// A cart is emptied after a successful order, never destroyed.
    pub async fn cart_for(&self, user_id: &str) -> ShopResult<Cart> {
        Ok(self
            .carts
            .cart_for_user(user_id)
            .await?
            .unwrap_or_else(|| Cart::empty(user_id)))
    }

    /// Add one unit of a product to the user's cart and persist it
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_to_cart(&self, user_id: &str, product_id: &str) -> ShopResult<Cart> {
        let product = self
            .products
            .find_product(product_id)
            .await?
            .ok_or_else(|| ShopError::ProductNotFound {
                product_id: product_id.to_string(),
            })?;

        let mut cart = self.cart_for(user_id).await?;
        cart.upsert(&product);
        self.carts.put_cart(&cart).await?;

        debug!(item_count = cart.item_count(), "added product to cart");
        Ok(cart)
    }

    /// Remove a product's line from the user's cart.
    /// A no-op (not an error) if the product is not in the cart.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_from_cart(&self, user_id: &str, product_id: &str) -> ShopResult<Cart> {
        let mut cart = self.cart_for(user_id).await?;
        let removed = cart.remove(product_id);
        self.carts.put_cart(&cart).await?;

        debug!(removed, "removed product line from cart");
        Ok(cart)
    }

    /// Empty the user's cart and persist it. Idempotent.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear_cart(&self, user_id: &str) -> ShopResult<Cart> {
        let mut cart = self.cart_for(user_id).await?;
        cart.clear();
        self.carts.put_cart(&cart).await?;
        Ok(cart)
    }

    /// Resolve each line's product id to the current full product record.
    ///
    /// Fails with [`ShopError::DanglingReference`] if any referenced product
    /// no longer exists — a line is never silently dropped.
    pub async fn populate(&self, cart: &Cart) -> ShopResult<PopulatedCart> {
        let mut items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let product = self
                .products
                .find_product(&line.product_id)
                .await?
                .ok_or_else(|| ShopError::DanglingReference {
                    product_id: line.product_id.clone(),
                })?;
            items.push(PopulatedLineItem {
                product,
                quantity: line.quantity,
            });
        }
        Ok(PopulatedCart {
            user_id: cart.user_id.clone(),
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::str::FromStr;

    fn product(id: &str, price: &str) -> Product {
        Product::new(id, format!("Product {id}"), Decimal::from_str(price).unwrap(), "seller-1")
    }

    #[test]
    fn test_upsert_keeps_one_line_per_product() {
        let mut cart = Cart::empty("user-1");
        let book = product("book-1", "9.99");

        cart.upsert(&book);
        cart.upsert(&book);
        cart.upsert(&book);

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.line("book-1").unwrap().quantity, 3);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_upsert_refreshes_cached_price_and_title() {
        let mut cart = Cart::empty("user-1");
        cart.upsert(&product("book-1", "9.99"));

        let mut repriced = product("book-1", "12.50");
        repriced.title = "Product book-1 (2nd ed)".to_string();
        cart.upsert(&repriced);

        let line = cart.line("book-1").unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price, Decimal::from_str("12.50").unwrap());
        assert_eq!(line.title, "Product book-1 (2nd ed)");
    }

    #[test]
    fn test_remove_is_all_or_nothing_and_tolerates_absent() {
        let mut cart = Cart::empty("user-1");
        cart.upsert(&product("book-1", "9.99"));
        cart.upsert(&product("book-1", "9.99"));

        assert!(cart.remove("book-1"));
        assert!(cart.is_empty());
        assert!(!cart.remove("book-1"));
    }

    #[tokio::test]
    async fn test_add_to_cart_persists() {
        let store = Arc::new(MemoryStore::new());
        store.put_product(product("book-1", "9.99")).await;
        let engine = CartEngine::new(store.clone(), store.clone());

        engine.add_to_cart("user-1", "book-1").await.unwrap();
        let cart = engine.add_to_cart("user-1", "book-1").await.unwrap();

        assert_eq!(cart.line("book-1").unwrap().quantity, 2);
        let reloaded = engine.cart_for("user-1").await.unwrap();
        assert_eq!(reloaded, cart);
    }

    #[tokio::test]
    async fn test_add_unknown_product_fails() {
        let store = Arc::new(MemoryStore::new());
        let engine = CartEngine::new(store.clone(), store);

        let err = engine.add_to_cart("user-1", "ghost").await.unwrap_err();
        assert!(matches!(err, ShopError::ProductNotFound { .. }));
    }

    #[tokio::test]
    async fn test_clear_then_populate_is_empty() {
        let store = Arc::new(MemoryStore::new());
        store.put_product(product("book-1", "9.99")).await;
        let engine = CartEngine::new(store.clone(), store.clone());

        engine.add_to_cart("user-1", "book-1").await.unwrap();
        let cart = engine.clear_cart("user-1").await.unwrap();
        let populated = engine.populate(&cart).await.unwrap();

        assert!(populated.is_empty());
        assert_eq!(populated.total(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_populate_fails_on_dangling_reference() {
        let store = Arc::new(MemoryStore::new());
        store.put_product(product("book-1", "9.99")).await;
        let engine = CartEngine::new(store.clone(), store.clone());

        let cart = engine.add_to_cart("user-1", "book-1").await.unwrap();
        store.remove_product("book-1").await;

        let err = engine.populate(&cart).await.unwrap_err();
        assert!(matches!(
            err,
            ShopError::DanglingReference { product_id } if product_id == "book-1"
        ));
    }

    #[tokio::test]
    async fn test_populated_totals() {
        let store = Arc::new(MemoryStore::new());
        store.put_product(product("book-1", "9.99")).await;
        store.put_product(product("mug-1", "5.00")).await;
        let engine = CartEngine::new(store.clone(), store.clone());

        engine.add_to_cart("user-1", "book-1").await.unwrap();
        engine.add_to_cart("user-1", "book-1").await.unwrap();
        let cart = engine.add_to_cart("user-1", "mug-1").await.unwrap();

        let populated = engine.populate(&cart).await.unwrap();
        assert_eq!(populated.total(), Decimal::from_str("24.98").unwrap());
        assert_eq!(populated.item_count(), 3);
    }
}
