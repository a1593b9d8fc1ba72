//! Core types and logic for paybridge.
//!
//! This crate holds everything that does not touch the network:
//!
//! - **Identifiers**: `PriceId`, `SessionId`, `EventId`
//! - **Tiers**: `Tier`, `PriceMapping`, `CheckoutVariant` and tier resolution
//! - **Webhooks**: signature verification and `VerifiedEvent`
//!
//! # Webhook invariant
//!
//! A `VerifiedEvent` can only be obtained from [`webhook::verify`] (or
//! [`webhook::verify_at`]). Code that receives one knows the payload was
//! signed with the configured signing secret.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod crypto;
pub mod error;
pub mod event;
pub mod ids;
pub mod tier;
pub mod webhook;

pub use error::{BillingError, Result};
pub use event::{EventType, VerifiedEvent};
pub use ids::{EventId, IdError, PriceId, SessionId};
pub use tier::{CheckoutVariant, PriceMapping, Tier, UnknownVariant};
pub use webhook::{WebhookError, DEFAULT_TOLERANCE_SECONDS};
