//! # Checkout Orchestrator
//!
//! Turns a cart into a priced line-item set and drives payment-session
//! creation. Population, total computation, and the gateway call run as a
//! strict sequence; any failure before the gateway call means no session is
//! ever created.

use crate::cart::{CartEngine, PopulatedCart, PopulatedLineItem};
use crate::error::{ShopError, ShopResult};
use crate::gateway::{BoxedPaymentGateway, CheckoutUrls, SessionLineItem, SessionRequest};
use crate::money::Currency;
use crate::user::User;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Everything the checkout view needs: the resolved lines, the total that
/// was communicated to the processor, and the session to redirect to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutPreview {
    pub line_items: Vec<PopulatedLineItem>,
    pub total: Decimal,
    pub session_id: String,
    pub checkout_url: String,
}

/// Drives populate -> total -> payment-session creation for one user's cart
pub struct CheckoutOrchestrator {
    cart_engine: Arc<CartEngine>,
    gateway: BoxedPaymentGateway,
    urls: CheckoutUrls,
    currency: Currency,
}

impl CheckoutOrchestrator {
    pub fn new(
        cart_engine: Arc<CartEngine>,
        gateway: BoxedPaymentGateway,
        urls: CheckoutUrls,
    ) -> Self {
        Self {
            cart_engine,
            gateway,
            urls,
            currency: Currency::USD,
        }
    }

    /// Builder: charge in a different currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Populate the user's cart, compute the total, and request a payment
    /// session.
    ///
    /// Fails with [`ShopError::DanglingReference`] if a cart line references
    /// a deleted product and with [`ShopError::EmptyCart`] if nothing
    /// billable remains — in both cases before the payment collaborator is
    /// contacted.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn begin_checkout(&self, user: &User) -> ShopResult<CheckoutPreview> {
        let cart = self.cart_engine.cart_for(&user.id).await?;
        let populated = self.cart_engine.populate(&cart).await?;

        if populated.is_empty() {
            return Err(ShopError::EmptyCart);
        }

        let total = populated.total();
        if total <= Decimal::ZERO {
            return Err(ShopError::EmptyCart);
        }

        let request = SessionRequest {
            reference: Uuid::new_v4().to_string(),
            line_items: self.session_line_items(&populated),
            customer_email: Some(user.email.clone()),
            success_url: self.urls.success_url_with_session(),
            cancel_url: self.urls.cancel_url(),
        };

        let session = self.gateway.create_session(&request).await?;

        info!(
            session_id = %session.session_id,
            gateway = self.gateway.gateway_name(),
            item_count = populated.item_count(),
            %total,
            "created checkout session"
        );

        Ok(CheckoutPreview {
            line_items: populated.items,
            total,
            session_id: session.session_id,
            checkout_url: session.checkout_url,
        })
    }

    /// One processor descriptor per cart line, grouped by product:
    /// the unit amount in minor units with the quantity on the row.
    fn session_line_items(&self, populated: &PopulatedCart) -> Vec<SessionLineItem> {
        populated
            .items
            .iter()
            .map(|item| SessionLineItem {
                name: item.product.title.clone(),
                description: (!item.product.description.is_empty())
                    .then(|| item.product.description.clone()),
                unit_amount: self.currency.minor_units(item.product.price),
                currency: self.currency,
                quantity: item.quantity,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShopError;
    use crate::gateway::{PaymentGateway, PaymentSession};
    use crate::product::Product;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::str::FromStr;
    use std::sync::Mutex;

    /// Records requests and hands back a scripted session
    struct FakeGateway {
        requests: Mutex<Vec<SessionRequest>>,
        fail: bool,
    }

    impl FakeGateway {
        fn new() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last_request(&self) -> SessionRequest {
            self.requests.lock().unwrap().last().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn create_session(&self, request: &SessionRequest) -> ShopResult<PaymentSession> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(ShopError::PaymentSessionFailed("scripted failure".into()));
            }
            Ok(PaymentSession {
                session_id: format!("cs_test_{}", request.reference),
                checkout_url: "https://pay.example.com/cs_test".to_string(),
                expires_at: None,
                created_at: Utc::now(),
            })
        }

        fn gateway_name(&self) -> &'static str {
            "fake"
        }
    }

    fn product(id: &str, title: &str, price: &str) -> Product {
        Product::new(id, title, Decimal::from_str(price).unwrap(), "seller-1")
            .with_description(format!("{title} description"))
    }

    async fn setup(gateway: Arc<FakeGateway>) -> (Arc<MemoryStore>, Arc<CartEngine>, CheckoutOrchestrator) {
        let store = Arc::new(MemoryStore::new());
        store.put_product(product("book-1", "Book", "9.99")).await;
        store.put_product(product("mug-1", "Mug", "5.00")).await;
        let engine = Arc::new(CartEngine::new(store.clone(), store.clone()));
        let orchestrator = CheckoutOrchestrator::new(
            engine.clone(),
            gateway,
            CheckoutUrls::new("https://shop.example.com"),
        );
        (store, engine, orchestrator)
    }

    #[tokio::test]
    async fn test_begin_checkout_totals_and_grouping() {
        let gateway = Arc::new(FakeGateway::new());
        let (_store, engine, orchestrator) = setup(gateway.clone()).await;

        let user = User::new("user-1", "user-1@example.com");
        engine.add_to_cart("user-1", "book-1").await.unwrap();
        engine.add_to_cart("user-1", "book-1").await.unwrap();
        engine.add_to_cart("user-1", "mug-1").await.unwrap();

        let preview = orchestrator.begin_checkout(&user).await.unwrap();

        assert_eq!(preview.total, Decimal::from_str("24.98").unwrap());
        assert_eq!(preview.session_id, format!("cs_test_{}", gateway.last_request().reference));

        // grouped per product: 999 x2 and 500 x1, not duplicated rows
        let request = gateway.last_request();
        let rows: Vec<(i64, u32)> = request
            .line_items
            .iter()
            .map(|i| (i.unit_amount, i.quantity))
            .collect();
        assert_eq!(rows, vec![(999, 2), (500, 1)]);

        // minor-unit amounts reconcile with the decimal total within a cent
        assert_eq!(request.total_minor_units(), 2498);
        assert_eq!(request.customer_email.as_deref(), Some("user-1@example.com"));
        assert!(request
            .success_url
            .ends_with("?session_id={CHECKOUT_SESSION_ID}"));
    }

    #[tokio::test]
    async fn test_empty_cart_never_reaches_gateway() {
        let gateway = Arc::new(FakeGateway::new());
        let (_store, _engine, orchestrator) = setup(gateway.clone()).await;

        let user = User::new("user-1", "user-1@example.com");
        let err = orchestrator.begin_checkout(&user).await.unwrap_err();

        assert!(matches!(err, ShopError::EmptyCart));
        assert_eq!(gateway.request_count(), 0);
    }

    #[tokio::test]
    async fn test_dangling_reference_never_reaches_gateway() {
        let gateway = Arc::new(FakeGateway::new());
        let (store, engine, orchestrator) = setup(gateway.clone()).await;

        let user = User::new("user-1", "user-1@example.com");
        engine.add_to_cart("user-1", "book-1").await.unwrap();
        store.remove_product("book-1").await;

        let err = orchestrator.begin_checkout(&user).await.unwrap_err();

        assert!(matches!(err, ShopError::DanglingReference { .. }));
        assert_eq!(gateway.request_count(), 0);
    }

    #[tokio::test]
    async fn test_gateway_failure_propagates() {
        let gateway = Arc::new(FakeGateway::failing());
        let (_store, engine, orchestrator) = setup(gateway.clone()).await;

        let user = User::new("user-1", "user-1@example.com");
        engine.add_to_cart("user-1", "book-1").await.unwrap();

        let err = orchestrator.begin_checkout(&user).await.unwrap_err();
        assert!(matches!(err, ShopError::PaymentSessionFailed(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_fractional_cent_prices_round_at_boundary() {
        let gateway = Arc::new(FakeGateway::new());
        let store = Arc::new(MemoryStore::new());
        store
            .put_product(product("odd-1", "Odd", "9.999"))
            .await;
        let engine = Arc::new(CartEngine::new(store.clone(), store.clone()));
        let orchestrator = CheckoutOrchestrator::new(
            engine.clone(),
            gateway.clone(),
            CheckoutUrls::default(),
        );

        let user = User::new("user-1", "user-1@example.com");
        engine.add_to_cart("user-1", "odd-1").await.unwrap();
        orchestrator.begin_checkout(&user).await.unwrap();

        assert_eq!(gateway.last_request().line_items[0].unit_amount, 1000);
    }
}
