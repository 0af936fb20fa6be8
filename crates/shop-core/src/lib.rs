//! # shop-core
//!
//! Core types and engines for the storefront-rs pipeline:
//!
//! - `CartEngine` for add/update/remove/clear over a user's line items,
//!   with the unresolved/resolved cart split (`Cart` vs `PopulatedCart`)
//! - `CheckoutOrchestrator` for populate -> total -> payment-session
//! - `OrderLedger` for immutable order snapshots and order history
//! - `InvoiceRenderer` for deterministic PDF invoices
//! - `PaymentGateway` trait for payment providers (see `shop-stripe`)
//! - Persistence traits plus `MemoryStore` for tests and demos
//! - `ShopError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{CartEngine, CheckoutOrchestrator, CheckoutUrls, OrderLedger, User};
//!
//! let engine = Arc::new(CartEngine::new(store.clone(), store.clone()));
//! let checkout = CheckoutOrchestrator::new(engine.clone(), gateway, CheckoutUrls::new(base_url));
//! let ledger = OrderLedger::new(store.clone(), engine.clone());
//!
//! engine.add_to_cart(&user.id, "book-1").await?;
//! let preview = checkout.begin_checkout(&user).await?;
//! // ...redirect the customer to preview.checkout_url; on confirmation:
//! let populated = engine.populate(&engine.cart_for(&user.id).await?).await?;
//! let order = ledger.create_order(&user, &populated, &confirmation.session_id).await?;
//! ```

pub mod cart;
pub mod checkout;
pub mod error;
pub mod gateway;
pub mod invoice;
pub mod money;
pub mod order;
pub mod pagination;
pub mod product;
pub mod store;
pub mod user;

// Re-exports for convenience
pub use cart::{Cart, CartEngine, CartLineItem, PopulatedCart, PopulatedLineItem};
pub use checkout::{CheckoutOrchestrator, CheckoutPreview};
pub use error::{ShopError, ShopResult};
pub use gateway::{
    BoxedPaymentGateway, CheckoutUrls, PaymentGateway, PaymentSession, SessionLineItem,
    SessionRequest,
};
pub use invoice::InvoiceRenderer;
pub use money::{display_amount, Currency};
pub use order::{to_order_line, Buyer, Order, OrderLedger, OrderLineItem};
pub use pagination::{Page, PageRequest};
pub use product::{Catalog, Product};
pub use store::{CartStore, MemoryStore, OrderStore, ProductStore};
pub use user::User;
