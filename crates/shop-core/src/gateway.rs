//! # Payment Gateway Seam
//!
//! Trait boundary for external payment collaborators. Implementations
//! (Stripe, others) live in their own crates; the checkout orchestrator only
//! sees this contract.

use crate::error::ShopResult;
use crate::money::Currency;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A processor-facing line descriptor: display fields plus the unit amount
/// in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLineItem {
    /// Product display name
    pub name: String,

    /// Description shown on the hosted payment page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Unit amount in minor currency units (cents)
    pub unit_amount: i64,

    /// Currency
    pub currency: Currency,

    /// Quantity
    pub quantity: u32,
}

impl SessionLineItem {
    /// amount x quantity in minor units
    pub fn total_minor_units(&self) -> i64 {
        self.unit_amount * i64::from(self.quantity)
    }
}

/// Everything a gateway needs to create a checkout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    /// Caller-generated reference, also used as the idempotency key
    pub reference: String,

    /// Ordered line descriptors, one per product
    pub line_items: Vec<SessionLineItem>,

    /// Buyer email for prefill
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,

    /// Redirect after successful payment
    pub success_url: String,

    /// Redirect if the customer cancels
    pub cancel_url: String,
}

impl SessionRequest {
    /// Sum of all line totals, in minor units
    pub fn total_minor_units(&self) -> i64 {
        self.line_items.iter().map(|i| i.total_minor_units()).sum()
    }
}

/// A pending payment session created by the collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Collaborator's opaque session id
    pub session_id: String,

    /// URL to redirect the customer to
    pub checkout_url: String,

    /// When the session expires, if the collaborator reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// Payment collaborator contract.
///
/// Treated as fallible, network-bound, and non-idempotent unless the request
/// carries an idempotency key — which [`SessionRequest::reference`] always
/// does.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a checkout session for the given line items
    async fn create_session(&self, request: &SessionRequest) -> ShopResult<PaymentSession>;

    /// Gateway name (for logging)
    fn gateway_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;

/// Success/cancel URL pair handed to the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutUrls {
    /// Base URL of the storefront
    pub base_url: String,
    /// Success page path
    pub success_path: String,
    /// Cancel page path
    pub cancel_path: String,
}

impl CheckoutUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            success_path: "/checkout/success".to_string(),
            cancel_path: "/checkout/cancel".to_string(),
        }
    }

    pub fn success_url(&self) -> String {
        format!("{}{}", self.base_url, self.success_path)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}{}", self.base_url, self.cancel_path)
    }

    /// Success URL with the session-id placeholder the processor substitutes
    pub fn success_url_with_session(&self) -> String {
        format!("{}?session_id={{CHECKOUT_SESSION_ID}}", self.success_url())
    }
}

impl Default for CheckoutUrls {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}
