//! Error types for paybridge.

use crate::ids::IdError;

/// Result type for paybridge operations.
pub type Result<T> = std::result::Result<T, BillingError>;

/// Errors that can occur in paybridge operations.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    /// The requested tier is not in the price mapping.
    #[error("invalid tier: {tier}")]
    InvalidTier {
        /// The tier name as supplied by the caller.
        tier: String,
    },

    /// No price identifier was supplied.
    #[error("missing price identifier")]
    MissingPriceId,

    /// The billing provider could not create the requested object.
    #[error("provider unavailable: {message}")]
    ProviderUnavailable {
        /// Underlying cause, for server-side logging only.
        message: String,
    },

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}

impl BillingError {
    /// Wrap any provider-side failure as `ProviderUnavailable`.
    pub fn provider(cause: impl std::fmt::Display) -> Self {
        Self::ProviderUnavailable {
            message: cause.to_string(),
        }
    }
}
