//! # Order Types and Ledger
//!
//! An order is an immutable snapshot of a populated cart at confirmation
//! time. Line items copy the product fields they need instead of holding a
//! reference, which decouples historical orders from later catalog changes.

use crate::cart::{CartEngine, PopulatedCart};
use crate::error::{ShopError, ShopResult};
use crate::pagination::{Page, PageRequest};
use crate::product::Product;
use crate::store::OrderStore;
use crate::user::User;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// A value snapshot of one ordered product. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    /// Product title at order time
    pub title: String,

    /// Unit price at order time
    pub unit_price: Decimal,

    /// Product description at order time
    pub description: String,

    /// Quantity ordered
    pub quantity: u32,
}

impl OrderLineItem {
    /// quantity x snapshot price
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Project a product into an order line, copying exactly the fields the
/// order data model declares.
pub fn to_order_line(product: &Product, quantity: u32) -> OrderLineItem {
    OrderLineItem {
        title: product.title.clone(),
        unit_price: product.price,
        description: product.description.clone(),
        quantity,
    }
}

/// Buyer snapshot: email at order time plus a weak back-reference for
/// lookup. Deleting the user does not cascade to past orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    pub email: String,
    pub user_id: String,
}

/// An immutable order record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order id (generated)
    pub id: String,

    /// Buyer snapshot
    pub buyer: Buyer,

    /// Ordered sequence of line-item snapshots
    pub line_items: Vec<OrderLineItem>,

    /// Checkout confirmation identity (session id); one order per confirmation
    pub confirmation_id: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order with a generated id
    pub fn new(
        buyer: Buyer,
        line_items: Vec<OrderLineItem>,
        confirmation_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            buyer,
            line_items,
            confirmation_id: confirmation_id.into(),
            created_at: Utc::now(),
        }
    }

    /// Order total, always recomputed from the stored snapshot
    pub fn total(&self) -> Decimal {
        self.line_items.iter().map(|i| i.line_total()).sum()
    }

    /// Total number of units across all lines
    pub fn item_count(&self) -> u32 {
        self.line_items.iter().map(|i| i.quantity).sum()
    }
}

/// Creates immutable orders from confirmed checkouts and serves a user's
/// order history.
pub struct OrderLedger {
    orders: Arc<dyn OrderStore>,
    cart_engine: Arc<CartEngine>,
}

impl OrderLedger {
    pub fn new(orders: Arc<dyn OrderStore>, cart_engine: Arc<CartEngine>) -> Self {
        Self {
            orders,
            cart_engine,
        }
    }

    /// Freeze a populated cart into an order, then clear the user's cart.
    ///
    /// The two effects form one logical transaction from the caller's view:
    /// the cart is only cleared after the order write succeeds, and a
    /// clearing failure leaves the order standing (clearing is idempotent,
    /// so a retry cannot lose the order).
    ///
    /// Idempotent under duplicate confirmations: the store inserts at most
    /// one order per `confirmation_id` and returns the stored record.
    #[instrument(skip(self, user, cart), fields(user_id = %user.id, confirmation_id = %confirmation_id))]
    pub async fn create_order(
        &self,
        user: &User,
        cart: &PopulatedCart,
        confirmation_id: &str,
    ) -> ShopResult<Order> {
        if cart.is_empty() {
            return Err(ShopError::EmptyCart);
        }

        let line_items = cart
            .items
            .iter()
            .map(|item| to_order_line(&item.product, item.quantity))
            .collect();

        let order = Order::new(
            Buyer {
                email: user.email.clone(),
                user_id: user.id.clone(),
            },
            line_items,
            confirmation_id,
        );

        let stored = self.orders.insert_order(&order).await?;
        if stored.id != order.id {
            info!(order_id = %stored.id, "duplicate confirmation, returning stored order");
        } else {
            info!(order_id = %stored.id, total = %stored.total(), "order created");
        }

        if let Err(err) = self.cart_engine.clear_cart(&user.id).await {
            warn!(order_id = %stored.id, error = %err, "cart clear failed after order write");
        }

        Ok(stored)
    }

    /// All of a user's orders, newest first
    pub async fn list_orders(&self, user_id: &str) -> ShopResult<Vec<Order>> {
        let mut orders = self.orders.orders_for_user(user_id).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    /// One page of a user's order history
    pub async fn list_orders_page(
        &self,
        user_id: &str,
        request: PageRequest,
    ) -> ShopResult<Page<Order>> {
        Ok(Page::from_items(self.list_orders(user_id).await?, request))
    }

    /// Fetch one order, enforcing that the requester is the buyer
    pub async fn get_order(&self, order_id: &str, requesting_user_id: &str) -> ShopResult<Order> {
        let order = self
            .orders
            .find_order(order_id)
            .await?
            .ok_or_else(|| ShopError::OrderNotFound {
                order_id: order_id.to_string(),
            })?;

        if order.buyer.user_id != requesting_user_id {
            return Err(ShopError::Forbidden {
                order_id: order_id.to_string(),
            });
        }

        Ok(order)
    }
}
