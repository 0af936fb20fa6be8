//! # Persistence Seams
//!
//! Async storage traits consumed by the engines, plus [`MemoryStore`], an
//! in-process implementation with read-your-writes consistency used by tests
//! and demos. Each store operation is atomic with respect to its own read;
//! whole-document writes resolve last-write-wins.

use crate::cart::Cart;
use crate::error::ShopResult;
use crate::order::Order;
use crate::pagination::{Page, PageRequest};
use crate::product::{Catalog, Product};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Read-only product lookup
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Find a product by id
    async fn find_product(&self, product_id: &str) -> ShopResult<Option<Product>>;

    /// One page of the catalog, with the total count
    async fn list_products(&self, request: PageRequest) -> ShopResult<Page<Product>>;
}

/// Durable cart storage, keyed by owning user
#[async_trait]
pub trait CartStore: Send + Sync {
    /// The user's cart, if one has ever been written
    async fn cart_for_user(&self, user_id: &str) -> ShopResult<Option<Cart>>;

    /// Persist the whole cart document
    async fn put_cart(&self, cart: &Cart) -> ShopResult<()>;
}

/// Durable, append-only order storage.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert an order, idempotent by confirmation id: if an order with the
    /// same `confirmation_id` is already stored, the insert is a no-op and
    /// the previously stored order is returned.
    async fn insert_order(&self, order: &Order) -> ShopResult<Order>;

    /// Find an order by id
    async fn find_order(&self, order_id: &str) -> ShopResult<Option<Order>>;

    /// All orders whose buyer reference matches the user, in stored order
    async fn orders_for_user(&self, user_id: &str) -> ShopResult<Vec<Order>>;
}

#[derive(Default)]
struct MemoryInner {
    products: Vec<Product>,
    carts: HashMap<String, Cart>,
    orders: Vec<Order>,
}

/// In-memory store backing all three persistence traits
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product
    pub async fn put_product(&self, product: Product) {
        let mut inner = self.inner.write().await;
        match inner.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => inner.products.push(product),
        }
    }

    /// Remove a product (simulates owner-side deletion)
    pub async fn remove_product(&self, product_id: &str) {
        self.inner
            .write()
            .await
            .products
            .retain(|p| p.id != product_id);
    }

    /// Seed the product table from a catalog
    pub async fn seed_catalog(&self, catalog: Catalog) -> ShopResult<()> {
        catalog.validate()?;
        for product in catalog.products {
            self.put_product(product).await;
        }
        Ok(())
    }

    /// Number of stored orders, across all users
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn find_product(&self, product_id: &str) -> ShopResult<Option<Product>> {
        let inner = self.inner.read().await;
        Ok(inner.products.iter().find(|p| p.id == product_id).cloned())
    }

    async fn list_products(&self, request: PageRequest) -> ShopResult<Page<Product>> {
        let inner = self.inner.read().await;
        Ok(Page::from_items(inner.products.clone(), request))
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn cart_for_user(&self, user_id: &str) -> ShopResult<Option<Cart>> {
        Ok(self.inner.read().await.carts.get(user_id).cloned())
    }

    async fn put_cart(&self, cart: &Cart) -> ShopResult<()> {
        self.inner
            .write()
            .await
            .carts
            .insert(cart.user_id.clone(), cart.clone());
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, order: &Order) -> ShopResult<Order> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner
            .orders
            .iter()
            .find(|o| o.confirmation_id == order.confirmation_id)
        {
            return Ok(existing.clone());
        }
        inner.orders.push(order.clone());
        Ok(order.clone())
    }

    async fn find_order(&self, order_id: &str) -> ShopResult<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner.orders.iter().find(|o| o.id == order_id).cloned())
    }

    async fn orders_for_user(&self, user_id: &str) -> ShopResult<Vec<Order>> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .iter()
            .filter(|o| o.buyer.user_id == user_id)
            .cloned()
            .collect())
    }
}
