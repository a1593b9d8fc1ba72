//! Common test utilities for paybridge integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use paybridge_core::{webhook, CheckoutVariant, PriceMapping, Tier, VerifiedEvent, WebhookError};
use paybridge_service::{
    create_router, AppState, BillingProvider, CheckoutSession, CheckoutSessionRequest,
    ServiceConfig, StripeError,
};

/// Webhook signing secret shared by the fake provider and test payloads.
pub const WEBHOOK_SECRET: &str = "whsec_integration_secret";

/// Session id returned by the fake provider.
pub const SESSION_ID: &str = "cs_test_xyz";

/// Frontend origin used for redirects and CORS.
pub const FRONTEND_URL: &str = "http://localhost:5173";

/// Provider double that records checkout requests and verifies webhooks
/// with [`WEBHOOK_SECRET`].
pub struct FakeProvider {
    pub requests: Mutex<Vec<CheckoutSessionRequest>>,
    pub verifications: AtomicUsize,
    pub delay: Duration,
    pub fail: bool,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            verifications: AtomicUsize::new(0),
            delay: Duration::ZERO,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Provider whose checkout call takes `delay` to answer.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new()
        }
    }

    pub fn verification_count(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<CheckoutSessionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl BillingProvider for FakeProvider {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, StripeError> {
        self.requests.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(StripeError::Api {
                status: 400,
                error_type: "invalid_request_error".into(),
                message: "No such price: 'price_111'".into(),
                code: Some("resource_missing".into()),
            });
        }
        Ok(CheckoutSession {
            id: SESSION_ID.parse().unwrap(),
        })
    }

    fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<VerifiedEvent, WebhookError> {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        webhook::verify(
            payload,
            signature,
            WEBHOOK_SECRET,
            webhook::DEFAULT_TOLERANCE_SECONDS,
        )
    }
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The provider behind the server.
    pub provider: Arc<FakeProvider>,
}

impl TestHarness {
    /// Harness using tier checkout with starter and pro prices configured.
    pub fn new() -> Self {
        Self::with(test_config(), FakeProvider::new())
    }

    /// Harness whose provider rejects every checkout.
    pub fn failing() -> Self {
        Self::with(test_config(), FakeProvider::failing())
    }

    /// Harness accepting price ids instead of tier names.
    pub fn price_id_variant() -> Self {
        let config = ServiceConfig {
            checkout_variant: CheckoutVariant::PriceId,
            ..test_config()
        };
        Self::with(config, FakeProvider::new())
    }

    pub fn with(config: ServiceConfig, provider: FakeProvider) -> Self {
        let provider = Arc::new(provider);
        let state = AppState::with_provider(config, Arc::clone(&provider) as Arc<dyn BillingProvider>);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, provider }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration with `starter` and `pro` mapped and no real Stripe keys.
pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        listen_addr: "127.0.0.1:0".into(),
        stripe_secret_key: "sk_test_unused".into(),
        stripe_webhook_secret: WEBHOOK_SECRET.into(),
        prices: PriceMapping::new()
            .with_price(Tier::Starter, "price_111".parse().unwrap())
            .with_price(Tier::Pro, "price_abc123".parse().unwrap()),
        frontend_url: FRONTEND_URL.into(),
        cors_origins: vec![FRONTEND_URL.into()],
        ..ServiceConfig::default()
    }
}

/// Current Unix time in seconds, on the same clock the verifier uses.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// A Stripe event envelope as raw bytes.
pub fn event_payload(event_type: &str, object: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "id": "evt_test_webhook",
        "object": "event",
        "api_version": "2023-08-16",
        "created": unix_now(),
        "livemode": false,
        "type": event_type,
        "data": { "object": object }
    }))
    .unwrap()
}

/// Sign `payload` with [`WEBHOOK_SECRET`] at `timestamp`.
pub fn sign(payload: &[u8], timestamp: i64) -> String {
    webhook::signature_header(payload, WEBHOOK_SECRET, timestamp)
}

/// In-memory log sink for asserting on emitted log lines.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Route this thread's tracing output into a new buffer.
    pub fn install() -> (Self, DefaultGuard) {
        let logs = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
