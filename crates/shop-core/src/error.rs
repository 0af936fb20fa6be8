//! # Shop Error Types
//!
//! Typed error handling for the storefront core.
//! All core operations return `Result<T, ShopError>`.

use thiserror::Error;

/// Core error type for all storefront operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// Configuration errors (missing keys, invalid catalog entries)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Product not found in catalog
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Order not found
    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: String },

    /// Requesting user is not the buyer of the order
    #[error("Order {order_id} does not belong to the requesting user")]
    Forbidden { order_id: String },

    /// Cart line references a product that no longer exists
    #[error("Cart references a deleted product: {product_id}")]
    DanglingReference { product_id: String },

    /// Checkout attempted on a cart with no billable line items
    #[error("Cart has no line items to check out")]
    EmptyCart,

    /// Payment collaborator failed to create a session
    #[error("Payment session failed: {0}")]
    PaymentSessionFailed(String),

    /// Storage-layer error
    #[error("Persistence error: {0}")]
    PersistenceFailed(String),

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParseError(String),
}

impl ShopError {
    /// Returns true if this error is retryable by the caller
    /// (e.g. the user re-initiating checkout)
    pub fn is_retryable(&self) -> bool {
        matches!(self, ShopError::PaymentSessionFailed(_))
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::Configuration(_) => 500,
            ShopError::ProductNotFound { .. } => 404,
            ShopError::OrderNotFound { .. } => 404,
            ShopError::Forbidden { .. } => 403,
            ShopError::DanglingReference { .. } => 409,
            ShopError::EmptyCart => 400,
            ShopError::PaymentSessionFailed(_) => 502,
            ShopError::PersistenceFailed(_) => 500,
            ShopError::WebhookVerificationFailed(_) => 401,
            ShopError::WebhookParseError(_) => 400,
        }
    }
}

/// Result type alias for storefront operations
pub type ShopResult<T> = Result<T, ShopError>;
