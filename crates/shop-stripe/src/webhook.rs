//! # Stripe Webhook Handling
//!
//! Verifies webhook signatures and parses `checkout.session.completed`
//! events into a typed [`CheckoutConfirmation`] — the confirmation callback
//! that drives order creation. The same confirmation may be delivered more
//! than once; the order ledger deduplicates by session id.

use crate::config::StripeConfig;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shop_core::{ShopError, ShopResult};
use tracing::debug;

/// Signature timestamp tolerance (5 minutes)
const TOLERANCE_SECS: i64 = 300;

/// A verified, parsed webhook event
#[derive(Debug, Clone)]
pub enum StripeEvent {
    /// A checkout session completed; the order can be created
    CheckoutCompleted(CheckoutConfirmation),
    /// Any other event type (passthrough)
    Other { event_type: String },
}

/// Parsed `checkout.session.completed` payload
#[derive(Debug, Clone)]
pub struct CheckoutConfirmation {
    /// Event id from Stripe
    pub event_id: String,

    /// The checkout session id — the order-creation idempotency key
    pub session_id: String,

    /// Stripe payment status ("paid", "unpaid", ...)
    pub payment_status: String,

    /// Amount actually charged, in minor units
    pub amount_total: Option<i64>,

    /// Customer email as entered at checkout
    pub customer_email: Option<String>,

    /// Event timestamp
    pub timestamp: DateTime<Utc>,
}

impl CheckoutConfirmation {
    /// Whether payment completed; orders are only created for paid sessions
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

/// Verifies webhook signatures against the endpoint's signing secret
pub struct WebhookVerifier {
    webhook_secret: String,
}

impl WebhookVerifier {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            webhook_secret: config.webhook_secret.clone(),
        }
    }

    /// Verify a webhook signature and parse the event
    pub fn verify(&self, payload: &[u8], signature: &str) -> ShopResult<StripeEvent> {
        self.verify_at(payload, signature, Utc::now().timestamp())
    }

    /// Verification against an explicit clock; `verify` passes the real one
    fn verify_at(&self, payload: &[u8], signature: &str, now: i64) -> ShopResult<StripeEvent> {
        let sig_parts = parse_signature_header(signature)?;

        if (now - sig_parts.timestamp).abs() > TOLERANCE_SECS {
            return Err(ShopError::WebhookVerificationFailed(
                "timestamp outside tolerance".to_string(),
            ));
        }

        let signed_payload = format!(
            "{}.{}",
            sig_parts.timestamp,
            String::from_utf8_lossy(payload)
        );
        let expected_sig = compute_hmac_sha256(&self.webhook_secret, &signed_payload);

        let valid = sig_parts
            .signatures
            .iter()
            .any(|sig| constant_time_compare(sig, &expected_sig));

        if !valid {
            return Err(ShopError::WebhookVerificationFailed(
                "signature mismatch".to_string(),
            ));
        }

        parse_event(payload)
    }
}

fn parse_event(payload: &[u8]) -> ShopResult<StripeEvent> {
    let event: StripeWebhookEvent = serde_json::from_slice(payload)
        .map_err(|e| ShopError::WebhookParseError(format!("failed to parse webhook: {e}")))?;

    debug!("verified Stripe webhook: type={}", event.event_type);

    if event.event_type != "checkout.session.completed" {
        return Ok(StripeEvent::Other {
            event_type: event.event_type,
        });
    }

    let object = event.data.object;
    let session_id = object
        .get("id")
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| ShopError::WebhookParseError("missing session id".to_string()))?;

    let payment_status = object
        .get("payment_status")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    let amount_total = object.get("amount_total").and_then(|v| v.as_i64());

    let customer_email = object
        .get("customer_details")
        .and_then(|cd| cd.get("email"))
        .and_then(|v| v.as_str())
        .map(String::from);

    Ok(StripeEvent::CheckoutCompleted(CheckoutConfirmation {
        event_id: event.id,
        session_id,
        payment_status,
        amount_total,
        customer_email,
        timestamp: DateTime::from_timestamp(event.created, 0).unwrap_or_else(Utc::now),
    }))
}

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    created: i64,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

// =============================================================================
// Signature Verification
// =============================================================================

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> ShopResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let kv: Vec<&str> = part.split('=').collect();
        if kv.len() != 2 {
            continue;
        }
        match kv[0] {
            "t" => {
                timestamp = kv[1].parse().ok();
            }
            "v1" => {
                signatures.push(kv[1].to_string());
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        ShopError::WebhookVerificationFailed("missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(ShopError::WebhookVerificationFailed(
            "no v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn compute_hmac_sha256(secret: &str, message: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}
