//! # Stripe Checkout Sessions
//!
//! Implementation of `shop_core::PaymentGateway` against Stripe's Checkout
//! Sessions API. Stripe takes form-encoded bodies; line items are flattened
//! into indexed `line_items[i][...]` parameters.

use crate::config::StripeConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use shop_core::{PaymentGateway, PaymentSession, SessionRequest, ShopError, ShopResult};
use tracing::{debug, error, info, instrument};

/// Stripe Checkout Session gateway.
///
/// Uses Stripe's hosted checkout page; the core never touches card data.
pub struct StripeGateway {
    config: StripeConfig,
    client: Client,
}

impl StripeGateway {
    /// Create a new Stripe gateway
    pub fn new(config: StripeConfig) -> ShopResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ShopError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> ShopResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    /// Flatten a session request into Stripe's form parameters
    fn form_params(request: &SessionRequest) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
        ];

        for (i, item) in request.line_items.iter().enumerate() {
            params.push((
                format!("line_items[{i}][price_data][currency]"),
                item.currency.as_str().to_string(),
            ));
            params.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
            params.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            if let Some(ref desc) = item.description {
                params.push((
                    format!("line_items[{i}][price_data][product_data][description]"),
                    desc.clone(),
                ));
            }
            params.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }

        if let Some(ref email) = request.customer_email {
            params.push(("customer_email".to_string(), email.clone()));
        }

        params.push((
            "metadata[checkout_reference]".to_string(),
            request.reference.clone(),
        ));

        params
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, request), fields(reference = %request.reference))]
    async fn create_session(&self, request: &SessionRequest) -> ShopResult<PaymentSession> {
        let params = Self::form_params(request);
        debug!(items = request.line_items.len(), "creating Stripe checkout session");

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &request.reference)
            .form(&params)
            .send()
            .await
            .map_err(|e| ShopError::PaymentSessionFailed(format!("network: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::PaymentSessionFailed(format!("network: {e}")))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(ShopError::PaymentSessionFailed(error_response.error.message));
            }
            return Err(ShopError::PaymentSessionFailed(format!("HTTP {status}: {body}")));
        }

        let session: StripeSessionResponse = serde_json::from_str(&body).map_err(|e| {
            ShopError::PaymentSessionFailed(format!("failed to parse Stripe response: {e}"))
        })?;

        info!(session_id = %session.id, "created Stripe checkout session");

        Ok(PaymentSession {
            session_id: session.id,
            checkout_url: session.url,
            expires_at: session
                .expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            created_at: Utc::now(),
        })
    }

    fn gateway_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeSessionResponse {
    id: String,
    url: String,
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeApiError,
}

#[derive(Debug, Deserialize)]
struct StripeApiError {
    message: String,
}
