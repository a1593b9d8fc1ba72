//! Subscription tiers and the tier-to-price mapping.
//!
//! The mapping is built once at startup from configuration and never
//! mutated afterwards. Resolution is a pure lookup; which inputs are
//! accepted depends on the deployment's [`CheckoutVariant`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BillingError, Result};
use crate::ids::PriceId;

/// A subscription plan level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Entry-level plan.
    Starter,
    /// Professional plan.
    Pro,
    /// Enterprise plan.
    Enterprise,
}

impl Tier {
    /// Every tier, in ascending order.
    pub const ALL: [Self; 3] = [Self::Starter, Self::Pro, Self::Enterprise];

    /// The wire name of the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "starter" => Ok(Self::Starter),
            "pro" => Ok(Self::Pro),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(BillingError::InvalidTier {
                tier: other.to_string(),
            }),
        }
    }
}

/// Which request shape the checkout endpoint accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckoutVariant {
    /// `{"tier": "pro"}`; only configured tiers resolve.
    #[default]
    Tier,
    /// `{"priceId": "price_..."}`; tier names still resolve through the
    /// mapping, anything else is passed through as a provider price id.
    PriceId,
}

/// A `CHECKOUT_VARIANT` value that names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown checkout variant: {0}")]
pub struct UnknownVariant(pub String);

impl FromStr for CheckoutVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> std::result::Result<Self, UnknownVariant> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tier" => Ok(Self::Tier),
            "price_id" | "priceid" | "price" => Ok(Self::PriceId),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Fixed mapping from tier to provider price identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceMapping {
    prices: HashMap<Tier, PriceId>,
}

impl PriceMapping {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a price for a tier, replacing any previous one.
    #[must_use]
    pub fn with_price(mut self, tier: Tier, price: PriceId) -> Self {
        self.prices.insert(tier, price);
        self
    }

    /// Look up the price configured for a tier.
    #[must_use]
    pub fn get(&self, tier: Tier) -> Option<&PriceId> {
        self.prices.get(&tier)
    }

    /// Tiers that have a configured price.
    pub fn tiers(&self) -> impl Iterator<Item = Tier> + '_ {
        Tier::ALL.into_iter().filter(|t| self.prices.contains_key(t))
    }

    /// Number of configured tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether no tier has a configured price.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Resolve a caller-supplied tier name or price identifier.
    ///
    /// # Errors
    ///
    /// - [`BillingError::InvalidTier`] when the variant is
    ///   [`CheckoutVariant::Tier`] and `input` is not a configured tier.
    /// - [`BillingError::MissingPriceId`] when the variant is
    ///   [`CheckoutVariant::PriceId`] and `input` is blank.
    /// - [`BillingError::InvalidId`] when a passthrough value is not a
    ///   well-formed identifier.
    pub fn resolve(&self, variant: CheckoutVariant, input: &str) -> Result<PriceId> {
        match variant {
            CheckoutVariant::Tier => self.resolve_tier(input),
            CheckoutVariant::PriceId => {
                if input.trim().is_empty() {
                    return Err(BillingError::MissingPriceId);
                }
                match self.resolve_tier(input) {
                    Ok(price) => Ok(price),
                    Err(_) => Ok(input.parse()?),
                }
            }
        }
    }

    fn resolve_tier(&self, name: &str) -> Result<PriceId> {
        let tier: Tier = name.parse()?;
        self.get(tier).cloned().ok_or_else(|| BillingError::InvalidTier {
            tier: name.to_string(),
        })
    }
}

impl FromIterator<(Tier, PriceId)> for PriceMapping {
    fn from_iter<I: IntoIterator<Item = (Tier, PriceId)>>(iter: I) -> Self {
        Self {
            prices: iter.into_iter().collect(),
        }
    }
}
