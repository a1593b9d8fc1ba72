//! Event dispatch for verified webhook deliveries.
//!
//! Dispatch is stateless: the event type picks a handler and the handler
//! records what happened. Business logic such as provisioning or
//! entitlement changes plugs in here. Handler failures are logged and never
//! turn into a non-2xx response, since the delivery itself was authentic
//! and a redelivery would not help.
//!
//! Stripe may deliver the same event more than once. Handlers are
//! currently side-effect free, so no deduplication is done; any handler
//! that gains side effects needs a store keyed by [`VerifiedEvent::id`].

use paybridge_core::{EventType, VerifiedEvent};

/// Result of dispatching one verified event.
///
/// Every variant is acknowledged to the provider with `200`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// A dedicated handler ran and succeeded.
    Handled,
    /// No handler exists for the event type.
    Unhandled,
    /// A handler ran and failed; the failure was logged.
    HandlerFailed,
}

/// Why a handler could not process an event.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The event object lacks a field the handler needs.
    #[error("event object is missing field `{0}`")]
    MissingField(&'static str),
}

/// Routes verified events to their handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventDispatcher;

impl EventDispatcher {
    /// Create a dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run the handler for `event` and report the outcome.
    #[must_use]
    pub fn dispatch(&self, event: &VerifiedEvent) -> Ack {
        let result = match event.event_type() {
            EventType::CheckoutSessionCompleted => on_checkout_completed(event),
            EventType::InvoicePaymentSucceeded => on_payment_succeeded(event),
            EventType::CustomerSubscriptionDeleted => on_subscription_deleted(event),
            EventType::Other(tag) => {
                tracing::info!(
                    event_id = %event.id(),
                    event_type = %tag,
                    "Unhandled event type"
                );
                return Ack::Unhandled;
            }
        };

        match result {
            Ok(()) => Ack::Handled,
            Err(e) => {
                tracing::error!(
                    event_id = %event.id(),
                    event_type = %event.event_type(),
                    error = %e,
                    "Event handler failed"
                );
                Ack::HandlerFailed
            }
        }
    }
}

fn object_id(event: &VerifiedEvent) -> Result<&str, HandlerError> {
    event.object_str("id").ok_or(HandlerError::MissingField("id"))
}

fn on_checkout_completed(event: &VerifiedEvent) -> Result<(), HandlerError> {
    let session_id = object_id(event)?;
    tracing::info!(
        event_id = %event.id(),
        session_id = %session_id,
        customer = ?event.object_str("customer"),
        subscription = ?event.object_str("subscription"),
        payment_status = ?event.object_str("payment_status"),
        "Checkout session completed"
    );
    Ok(())
}

fn on_payment_succeeded(event: &VerifiedEvent) -> Result<(), HandlerError> {
    let invoice_id = object_id(event)?;
    tracing::info!(
        event_id = %event.id(),
        invoice_id = %invoice_id,
        customer = ?event.object_str("customer"),
        subscription = ?event.object_str("subscription"),
        amount_paid = ?event.object().get("amount_paid").and_then(serde_json::Value::as_i64),
        "Invoice payment succeeded"
    );
    Ok(())
}

fn on_subscription_deleted(event: &VerifiedEvent) -> Result<(), HandlerError> {
    let subscription_id = object_id(event)?;
    tracing::info!(
        event_id = %event.id(),
        subscription_id = %subscription_id,
        customer = ?event.object_str("customer"),
        "Subscription canceled"
    );
    Ok(())
}
