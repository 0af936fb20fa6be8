//! # shop-stripe
//!
//! Stripe payment gateway for storefront-rs.
//!
//! This crate provides:
//!
//! 1. **StripeGateway** — `shop_core::PaymentGateway` backed by the
//!    Checkout Sessions API (hosted payment page, dynamic line items,
//!    idempotency keys).
//! 2. **WebhookVerifier** — signature verification and parsing of
//!    `checkout.session.completed` into a typed `CheckoutConfirmation`,
//!    which the order ledger consumes as its confirmation identity.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_stripe::{StripeGateway, WebhookVerifier};
//!
//! let gateway = Arc::new(StripeGateway::from_env()?);
//! let preview = checkout.begin_checkout(&user).await?;
//! // redirect the customer to preview.checkout_url
//!
//! // In the webhook endpoint:
//! let event = verifier.verify(&body, signature)?;
//! if let StripeEvent::CheckoutCompleted(confirmation) = event {
//!     if confirmation.is_paid() {
//!         let populated = cart_engine.populate(&cart_engine.cart_for(&user.id).await?).await?;
//!         ledger.create_order(&user, &populated, &confirmation.session_id).await?;
//!     }
//! }
//! ```

pub mod config;
pub mod session;
pub mod webhook;

// Re-exports
pub use config::StripeConfig;
pub use session::StripeGateway;
pub use webhook::{CheckoutConfirmation, StripeEvent, WebhookVerifier};
