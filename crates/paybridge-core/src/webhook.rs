//! Webhook signature verification.
//!
//! Stripe signs each delivery with a header of the form
//! `t=<unix seconds>,v1=<hex>[,v1=<hex>...]`. The `v1` value is
//! HMAC-SHA256 of `"<t>." ++ body` keyed with the endpoint signing secret.
//! Several `v1` entries appear while a secret is being rolled; any match is
//! accepted. Other schemes (`v0`) are ignored.
//!
//! The body must be the exact bytes received. Parsing and re-serializing
//! JSON before verification changes the bytes and breaks the signature.

use serde::Deserialize;

use crate::crypto::{constant_time_eq, hmac_sha256_hex};
use crate::event::{EventType, VerifiedEvent};
use crate::ids::EventId;

/// Default allowed distance between the signed timestamp and now.
pub const DEFAULT_TOLERANCE_SECONDS: u64 = 300;

/// Signature scheme accepted by [`verify`].
const EXPECTED_SCHEME: &str = "v1";

/// Reasons a webhook delivery is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    /// The request carried no signature header.
    #[error("No stripe-signature header value was provided.")]
    MissingHeader,

    /// The header has no usable timestamp.
    #[error("Unable to extract timestamp and signatures from header")]
    MalformedHeader,

    /// The header has a timestamp but no `v1` signatures.
    #[error("No signatures found with expected scheme")]
    NoSignatures,

    /// None of the `v1` signatures match the payload.
    #[error(
        "No signatures found matching the expected signature for payload. \
         Are you passing the raw request body you received from Stripe?"
    )]
    SignatureMismatch,

    /// The signed timestamp is too far from the current time.
    #[error("Timestamp outside the tolerance zone")]
    TimestampOutsideTolerance {
        /// Timestamp from the header.
        timestamp: i64,
        /// Verification time.
        now: i64,
    },

    /// The signature matched but the body is not an event object.
    #[error("Invalid event payload: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: EventId,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    created: i64,
    #[serde(default)]
    livemode: bool,
    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

/// Parsed `stripe-signature` header.
#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

fn parse_header(header: &str) -> Result<SignatureHeader<'_>, WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" if timestamp.is_none() => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| WebhookError::MalformedHeader)?,
                );
            }
            EXPECTED_SCHEME => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(WebhookError::NoSignatures);
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// Verify a delivery against the current clock.
///
/// # Errors
///
/// Returns a [`WebhookError`] when the header is missing or malformed, no
/// signature matches, the timestamp is outside `tolerance_seconds`, or the
/// verified body is not an event.
pub fn verify(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    tolerance_seconds: u64,
) -> Result<VerifiedEvent, WebhookError> {
    verify_at(
        payload,
        signature_header,
        secret,
        tolerance_seconds,
        chrono::Utc::now().timestamp(),
    )
}

/// Verify a delivery as of `now` (Unix seconds).
///
/// A `tolerance_seconds` of zero disables the timestamp check.
///
/// # Errors
///
/// See [`verify`].
pub fn verify_at(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    tolerance_seconds: u64,
    now: i64,
) -> Result<VerifiedEvent, WebhookError> {
    if signature_header.trim().is_empty() {
        return Err(WebhookError::MissingHeader);
    }

    let header = parse_header(signature_header)?;
    let timestamp = header.timestamp.to_string();
    let expected = hmac_sha256_hex(secret.as_bytes(), &[timestamp.as_bytes(), b".".as_slice(), payload]);

    let matched = header
        .signatures
        .iter()
        .any(|sig| constant_time_eq(expected.as_bytes(), sig.as_bytes()));
    if !matched {
        return Err(WebhookError::SignatureMismatch);
    }

    if tolerance_seconds > 0 && header.timestamp.abs_diff(now) > tolerance_seconds {
        return Err(WebhookError::TimestampOutsideTolerance {
            timestamp: header.timestamp,
            now,
        });
    }

    let raw: RawEvent = serde_json::from_slice(payload)
        .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

    tracing::debug!(event_id = %raw.id, event_type = %raw.event_type, "Webhook signature verified");

    Ok(VerifiedEvent::new(
        raw.id,
        EventType::from_tag(&raw.event_type),
        raw.created,
        raw.livemode,
        raw.data.object,
    ))
}

/// Build a `stripe-signature` header for `payload`.
///
/// Used to sign test deliveries and by tooling that replays events.
#[must_use]
pub fn signature_header(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let t = timestamp.to_string();
    let sig = hmac_sha256_hex(secret.as_bytes(), &[t.as_bytes(), b".".as_slice(), payload]);
    format!("t={t},{scheme}={sig}", scheme = EXPECTED_SCHEME)
}
