//! Service configuration.
//!
//! Everything is read once at startup into an immutable [`ServiceConfig`]
//! that is handed to the router. Stripe keys come from a secrets file when
//! one is present, otherwise from the environment.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use paybridge_core::{CheckoutVariant, PriceId, PriceMapping, Tier, DEFAULT_TOLERANCE_SECONDS};

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required key is not set.
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    /// A key is set but its value is unusable.
    #[error("invalid value for {key}: {message}")]
    Invalid {
        /// The offending key.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Service configuration loaded from environment variables.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Address to listen on (`HOST:PORT`, default "0.0.0.0:3000").
    pub listen_addr: String,

    /// Stripe secret API key (`sk_test_...` or `sk_live_...`).
    pub stripe_secret_key: String,

    /// Stripe webhook signing secret (`whsec_...`).
    pub stripe_webhook_secret: String,

    /// Stripe REST base URL.
    pub stripe_api_base: String,

    /// Tier to price mapping.
    pub prices: PriceMapping,

    /// Request shape accepted by the checkout endpoint.
    pub checkout_variant: CheckoutVariant,

    /// Frontend base URL for checkout redirects.
    pub frontend_url: String,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Allowed webhook timestamp skew in seconds (0 disables the check).
    pub webhook_tolerance_seconds: u64,

    /// Timeout for a single Stripe call in seconds.
    pub provider_timeout_seconds: u64,

    /// Whole-request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

/// Stripe secrets file structure.
#[derive(Debug, Default, Deserialize)]
pub struct StripeSecrets {
    /// Secret API key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Webhook signing secret.
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

const PRICE_KEYS: [(Tier, &str); 3] = [
    (Tier::Starter, "STRIPE_STARTER_PRICE_ID"),
    (Tier::Pro, "STRIPE_PRO_PRICE_ID"),
    (Tier::Enterprise, "STRIPE_ENTERPRISE_PRICE_ID"),
];

impl ServiceConfig {
    /// Load configuration from the process environment and secrets files.
    ///
    /// A `.env` file in the working directory is honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        let secrets = load_stripe_secrets().unwrap_or_default();
        Self::from_lookup(|key| std::env::var(key).ok(), secrets)
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Values in `secrets` take precedence over the lookup for the two
    /// Stripe keys. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F, secrets: StripeSecrets) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let stripe_secret_key = non_blank(secrets.api_key)
            .or_else(|| get("STRIPE_SECRET_KEY"))
            .ok_or(ConfigError::Missing("STRIPE_SECRET_KEY"))?;
        let stripe_webhook_secret = non_blank(secrets.webhook_secret)
            .or_else(|| get("STRIPE_WEBHOOK_SECRET"))
            .ok_or(ConfigError::Missing("STRIPE_WEBHOOK_SECRET"))?;

        let mut prices = PriceMapping::new();
        for (tier, key) in PRICE_KEYS {
            if let Some(raw) = get(key) {
                let price = raw.parse::<PriceId>().map_err(|e| ConfigError::Invalid {
                    key,
                    message: format!("{e}"),
                })?;
                prices = prices.with_price(tier, price);
            }
        }

        let checkout_variant = match get("CHECKOUT_VARIANT") {
            Some(raw) => raw.parse::<CheckoutVariant>().map_err(|e| ConfigError::Invalid {
                key: "CHECKOUT_VARIANT",
                message: format!("{e}"),
            })?,
            None => CheckoutVariant::default(),
        };

        if checkout_variant == CheckoutVariant::Tier && prices.is_empty() {
            tracing::warn!("No tier prices configured - every checkout request will be rejected");
        }

        let frontend_url = get("FRONTEND_URL")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let cors_origins = get("CORS_ORIGINS").map_or_else(
            || vec![frontend_url.clone()],
            |raw| {
                raw.split(',')
                    .map(|s| s.trim().trim_end_matches('/').to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            },
        );

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&get, "PORT", 3000)?;

        Ok(Self {
            listen_addr: format!("{host}:{port}"),
            stripe_secret_key,
            stripe_webhook_secret,
            stripe_api_base: get("STRIPE_API_BASE")
                .unwrap_or_else(|| crate::stripe::DEFAULT_BASE_URL.into()),
            prices,
            checkout_variant,
            frontend_url,
            cors_origins,
            webhook_tolerance_seconds: parse_or(
                &get,
                "WEBHOOK_TOLERANCE_SECONDS",
                DEFAULT_TOLERANCE_SECONDS,
            )?,
            provider_timeout_seconds: parse_or(&get, "PROVIDER_TIMEOUT_SECONDS", 10)?,
            request_timeout_seconds: parse_or(&get, "REQUEST_TIMEOUT_SECONDS", 30)?,
            max_body_bytes: parse_or(&get, "MAX_BODY_BYTES", 1024 * 1024)?, // 1MB
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Load Stripe secrets from the first secrets file found.
fn load_stripe_secrets() -> Option<StripeSecrets> {
    let secret_paths = [".secrets/stripe.json", "../.secrets/stripe.json"];

    for path in &secret_paths {
        match load_secrets_file::<StripeSecrets>(Path::new(path)) {
            Ok(secrets) => {
                tracing::info!(path = %path, "Loaded Stripe secrets from file");
                return Some(secrets);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path, error = %e, "Ignoring unreadable secrets file"),
        }
    }

    tracing::debug!("Stripe secrets file not found, using environment variables");
    None
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, std::io::Error> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("listen_addr", &self.listen_addr)
            .field("stripe_secret_key", &"<redacted>")
            .field("stripe_webhook_secret", &"<redacted>")
            .field("stripe_api_base", &self.stripe_api_base)
            .field("prices", &self.prices)
            .field("checkout_variant", &self.checkout_variant)
            .field("frontend_url", &self.frontend_url)
            .field("cors_origins", &self.cors_origins)
            .field("webhook_tolerance_seconds", &self.webhook_tolerance_seconds)
            .field("provider_timeout_seconds", &self.provider_timeout_seconds)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".into(),
            stripe_secret_key: String::new(),
            stripe_webhook_secret: String::new(),
            stripe_api_base: crate::stripe::DEFAULT_BASE_URL.into(),
            prices: PriceMapping::new(),
            checkout_variant: CheckoutVariant::Tier,
            frontend_url: "http://localhost:3000".into(),
            cors_origins: vec!["http://localhost:3000".into()],
            webhook_tolerance_seconds: DEFAULT_TOLERANCE_SECONDS,
            provider_timeout_seconds: 10,
            request_timeout_seconds: 30,
            max_body_bytes: 1024 * 1024,
        }
    }
}
