//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use crowlands_core::clock::Clock;
use crowlands_core::retry::RetryPolicy;
use crowlands_entitlement::{EntitlementLedger, MemoryEntitlementStore, QuotaPolicy};
use crowlands_generation::{
    GenerationOrchestrator, ImagePayload, ImageProvider, ProviderError, TextProvider,
};
use crowlands_grimoire::MemorySpellStore;
use crowlands_payment::{
    CheckoutGateway, CreatedCheckout, GatewayError, MemoryPaymentSessionStore,
    PaymentConfirmationWorker, PaymentStatus,
};
use crowlands_persona::PersonaRegistry;
use crowlands_test_support::FixedClock;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use crowlands_api::routes;
use crowlands_api::state::AppState;

/// A well-formed provider response used by most tests.
pub const RITUAL_JSON: &str = r#"{
    "title": "A Charm of Quiet Courage",
    "materials": ["a white candle", "a feather"],
    "steps": [
        {"instruction": "Light the candle at dusk.", "duration": "5 minutes"},
        {"instruction": "Speak the invocation.", "note": "Face east."}
    ],
    "invocation": "I call the quiet hour.",
    "incantation": "Small acts, gathered, become courage.",
    "closing": "The candle rests; the work is done.",
    "warnings": ["Never leave the candle unattended."]
}"#;

/// Fixed timestamp used across all integration tests.
pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Text provider returning a canned response.
pub struct StubTextProvider(pub &'static str);

#[async_trait]
impl TextProvider for StubTextProvider {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
        Ok(self.0.to_owned())
    }
}

/// Text provider that always fails.
pub struct FailingTextProvider;

#[async_trait]
impl TextProvider for FailingTextProvider {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}

/// Image provider returning a canned payload.
pub struct StubImageProvider;

#[async_trait]
impl ImageProvider for StubImageProvider {
    async fn render(&self, _prompt: &str) -> Result<ImagePayload, ProviderError> {
        Ok(ImagePayload {
            media_type: "image/png".into(),
            base64: "aGVsbG8=".into(),
        })
    }
}

/// Image provider that always fails.
pub struct FailingImageProvider;

#[async_trait]
impl ImageProvider for FailingImageProvider {
    async fn render(&self, _prompt: &str) -> Result<ImagePayload, ProviderError> {
        Err(ProviderError::Failed("no image was generated".into()))
    }
}

/// Gateway that issues sequential session ids and replays a scripted status
/// sequence; once the script is exhausted it keeps reporting `Pending`.
pub struct ScriptedGateway {
    statuses: Mutex<VecDeque<PaymentStatus>>,
    created: AtomicU32,
}

impl ScriptedGateway {
    pub fn new(statuses: &[PaymentStatus]) -> Self {
        Self {
            statuses: Mutex::new(statuses.iter().copied().collect()),
            created: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl CheckoutGateway for ScriptedGateway {
    async fn create_checkout(
        &self,
        _user_id: Uuid,
        _return_url: &str,
    ) -> Result<CreatedCheckout, GatewayError> {
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(CreatedCheckout {
            session_id: format!("cs_test_{n}"),
            checkout_url: format!("https://checkout.example/pay/cs_test_{n}"),
        })
    }

    async fn fetch_status(&self, _session_id: &str) -> Result<PaymentStatus, GatewayError> {
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PaymentStatus::Pending))
    }
}

/// Collaborator overrides for a test app.
pub struct Harness {
    pub text: Arc<dyn TextProvider>,
    pub image: Arc<dyn ImageProvider>,
    pub gateway: Arc<dyn CheckoutGateway>,
    pub quota: u32,
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            text: Arc::new(StubTextProvider(RITUAL_JSON)),
            image: Arc::new(StubImageProvider),
            gateway: Arc::new(ScriptedGateway::new(&[])),
            quota: 3,
        }
    }
}

/// Build the full app router over in-memory stores, stub providers, and a
/// fixed clock. Uses the same route structure as `main.rs`. Clone the
/// returned router per request; all clones share state.
pub fn build_test_app(harness: Harness) -> Router {
    let clock = fixed_clock();
    let registry = Arc::new(PersonaRegistry::builtin().unwrap());
    let ledger = EntitlementLedger::new(
        Arc::new(MemoryEntitlementStore::new()),
        QuotaPolicy {
            monthly_limit: harness.quota,
        },
    );
    let orchestrator = Arc::new(GenerationOrchestrator::new(
        Arc::clone(&registry),
        ledger.clone(),
        harness.text,
        harness.image,
        clock.clone(),
    ));
    let payments = Arc::new(PaymentConfirmationWorker::new(
        Arc::new(MemoryPaymentSessionStore::new()),
        harness.gateway,
        ledger.clone(),
        RetryPolicy::fixed(5, Duration::from_millis(5)),
        clock.clone(),
    ));
    let app_state = AppState::new(
        registry,
        ledger,
        orchestrator,
        payments,
        Arc::new(MemorySpellStore::new()),
        clock,
    );

    routes::router(app_state)
}

fn request_builder(method: &str, uri: &str, user: Option<Uuid>) -> axum::http::request::Builder {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    builder
}

async fn into_json(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };
    (status, json)
}

/// Send a POST request with a JSON body as the given user.
pub async fn post_json(
    app: Router,
    uri: &str,
    user: Uuid,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = request_builder("POST", uri, Some(user))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    into_json(app.oneshot(request).await.unwrap()).await
}

/// Send a POST request without a user identity.
pub async fn post_json_anonymous(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = request_builder("POST", uri, None)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    into_json(app.oneshot(request).await.unwrap()).await
}

/// Send a GET request as the given user.
pub async fn get_json(app: Router, uri: &str, user: Uuid) -> (StatusCode, serde_json::Value) {
    let request = request_builder("GET", uri, Some(user))
        .body(Body::empty())
        .unwrap();

    into_json(app.oneshot(request).await.unwrap()).await
}

/// Send a GET request without a user identity.
pub async fn get_json_anonymous(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = request_builder("GET", uri, None).body(Body::empty()).unwrap();

    into_json(app.oneshot(request).await.unwrap()).await
}

/// Send a DELETE request as the given user; returns only the status.
pub async fn delete_request(app: Router, uri: &str, user: Uuid) -> StatusCode {
    let request = request_builder("DELETE", uri, Some(user))
        .body(Body::empty())
        .unwrap();

    app.oneshot(request).await.unwrap().status()
}
