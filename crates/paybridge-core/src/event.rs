//! Verified provider events.

use std::fmt;

use crate::ids::EventId;

/// Event type tag of a provider notification.
///
/// Known tags get their own variant so dispatch is an exhaustive `match`;
/// everything else lands in [`EventType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    /// `checkout.session.completed`
    CheckoutSessionCompleted,
    /// `invoice.payment_succeeded`
    InvoicePaymentSucceeded,
    /// `customer.subscription.deleted`
    CustomerSubscriptionDeleted,
    /// Any other tag, kept verbatim.
    Other(String),
}

impl EventType {
    /// Map a wire tag to its variant.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "invoice.payment_succeeded" => Self::InvoicePaymentSucceeded,
            "customer.subscription.deleted" => Self::CustomerSubscriptionDeleted,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::InvoicePaymentSucceeded => "invoice.payment_succeeded",
            Self::CustomerSubscriptionDeleted => "customer.subscription.deleted",
            Self::Other(tag) => tag,
        }
    }

    /// Whether a dedicated handler exists for this type.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider event whose signature has been checked.
///
/// There is no public constructor: values only come out of
/// [`crate::webhook::verify`].
#[derive(Debug, Clone)]
pub struct VerifiedEvent {
    id: EventId,
    event_type: EventType,
    created: i64,
    livemode: bool,
    object: serde_json::Value,
}

impl VerifiedEvent {
    pub(crate) fn new(
        id: EventId,
        event_type: EventType,
        created: i64,
        livemode: bool,
        object: serde_json::Value,
    ) -> Self {
        Self {
            id,
            event_type,
            created,
            livemode,
            object,
        }
    }

    /// Provider event id, the natural deduplication key.
    #[must_use]
    pub fn id(&self) -> &EventId {
        &self.id
    }

    /// Event type tag.
    #[must_use]
    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// Creation time at the provider (Unix seconds).
    #[must_use]
    pub fn created(&self) -> i64 {
        self.created
    }

    /// Whether the event came from live mode rather than test mode.
    #[must_use]
    pub fn livemode(&self) -> bool {
        self.livemode
    }

    /// The `data.object` payload, specific to the event type.
    #[must_use]
    pub fn object(&self) -> &serde_json::Value {
        &self.object
    }

    /// Read a string field of the payload object.
    #[must_use]
    pub fn object_str(&self, field: &str) -> Option<&str> {
        self.object.get(field).and_then(serde_json::Value::as_str)
    }
}
