//! Stripe Checkout gateway.
//!
//! Uses the form-encoded Checkout Sessions API. Only the confirmation slice
//! is consumed here; the hosted checkout page handles card entry.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

use crate::gateway::{CheckoutGateway, CreatedCheckout, GatewayError};
use crate::session::PaymentStatus;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";
const PRODUCT_NAME: &str = "Crowlands Pro";

/// Stripe-backed checkout gateway.
pub struct StripeGateway {
    client: Client,
    api_base: String,
    secret_key: String,
    price_cents: u32,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionResponse {
    id: String,
    url: Option<String>,
    status: Option<String>,
    payment_status: Option<String>,
}

impl StripeGateway {
    /// Creates a gateway against the public Stripe API.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Network` if the HTTP client cannot be built.
    pub fn new(secret_key: impl Into<String>, price_cents: u32) -> Result<Self, GatewayError> {
        Self::with_api_base(STRIPE_API_BASE, secret_key, price_cents)
    }

    /// Creates a gateway against a custom API base (stripe-mock in tests).
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Network` if the HTTP client cannot be built.
    pub fn with_api_base(
        api_base: impl Into<String>,
        secret_key: impl Into<String>,
        price_cents: u32,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Ok(Self {
            client,
            api_base: api_base.into(),
            secret_key: secret_key.into(),
            price_cents,
        })
    }

    async fn parse_session(
        response: reqwest::Response,
    ) -> Result<CheckoutSessionResponse, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected(format!("HTTP {status}: {body}")));
        }
        response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))
    }
}

/// Maps Stripe's (status, payment_status) pair onto the session state
/// machine. Anything unrecognized is treated as still pending rather than
/// guessed into a terminal state.
fn map_status(status: Option<&str>, payment_status: Option<&str>) -> PaymentStatus {
    if payment_status == Some("paid") {
        return PaymentStatus::Paid;
    }
    match status {
        Some("expired") => PaymentStatus::Expired,
        Some("canceled") => PaymentStatus::Failed,
        _ => PaymentStatus::Pending,
    }
}

#[async_trait]
impl CheckoutGateway for StripeGateway {
    async fn create_checkout(
        &self,
        user_id: Uuid,
        return_url: &str,
    ) -> Result<CreatedCheckout, GatewayError> {
        let price = self.price_cents.to_string();
        let user = user_id.to_string();
        let success_url = format!("{return_url}?session_id={{CHECKOUT_SESSION_ID}}");
        let params: Vec<(&str, &str)> = vec![
            ("mode", "payment"),
            ("success_url", &success_url),
            ("cancel_url", return_url),
            ("line_items[0][quantity]", "1"),
            ("line_items[0][price_data][currency]", "usd"),
            ("line_items[0][price_data][unit_amount]", &price),
            ("line_items[0][price_data][product_data][name]", PRODUCT_NAME),
            ("metadata[user_id]", &user),
        ];

        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let session = Self::parse_session(response).await?;
        let checkout_url = session
            .url
            .ok_or_else(|| GatewayError::Malformed("checkout session has no url".into()))?;

        Ok(CreatedCheckout {
            session_id: session.id,
            checkout_url,
        })
    }

    async fn fetch_status(&self, session_id: &str) -> Result<PaymentStatus, GatewayError> {
        let response = self
            .client
            .get(format!("{}/checkout/sessions/{session_id}", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let session = Self::parse_session(response).await?;
        Ok(map_status(
            session.status.as_deref(),
            session.payment_status.as_deref(),
        ))
    }
}
