//! Identifier types for paybridge.
//!
//! All identifiers are opaque strings issued by the billing provider. The
//! `provider_id_type!` macro gives each one a distinct newtype so a session
//! id can never be passed where a price id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest identifier accepted from callers.
pub const MAX_ID_LEN: usize = 255;

/// Macro to define a provider-issued string identifier with standard trait implementations.
///
/// This macro generates a newtype wrapper around `String` with implementations for:
/// - `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `Serialize`, `Deserialize` (as validated string)
/// - `FromStr`, `Display`, `Debug`
/// - `TryFrom<String>`, `Into<String>`, `AsRef<str>`
macro_rules! provider_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Return the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate(s)?;
                Ok(Self(s.to_string()))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                validate(&value)?;
                Ok(Self(value))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

provider_id_type!(PriceId, "A provider price identifier (e.g. `price_1Nabc...`).\n\nReferenced by the single line item of a subscription checkout.");
provider_id_type!(SessionId, "A provider checkout session identifier (e.g. `cs_test_...`).\n\nHanded to the frontend for the redirect flow; never stored locally.");
provider_id_type!(EventId, "A provider event identifier (e.g. `evt_...`).");

fn validate(s: &str) -> Result<(), IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }
    if s.len() > MAX_ID_LEN {
        return Err(IdError::TooLong(s.len()));
    }
    if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(IdError::InvalidCharacter);
    }
    Ok(())
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is empty.
    #[error("identifier is empty")]
    Empty,

    /// The input exceeds [`MAX_ID_LEN`].
    #[error("identifier is too long ({0} bytes)")]
    TooLong(usize),

    /// The input contains whitespace or control characters.
    #[error("identifier contains whitespace or control characters")]
    InvalidCharacter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_id_parses_provider_value() {
        let id = PriceId::from_str("price_abc123").unwrap();
        assert_eq!(id.as_str(), "price_abc123");
        assert_eq!(id.to_string(), "price_abc123");
        assert_eq!(format!("{id:?}"), "PriceId(price_abc123)");
    }

    #[test]
    fn empty_id_is_rejected() {
        assert_eq!(PriceId::from_str(""), Err(IdError::Empty));
    }

    #[test]
    fn whitespace_is_rejected() {
        assert_eq!(
            SessionId::from_str("cs_test abc"),
            Err(IdError::InvalidCharacter)
        );
        assert_eq!(
            SessionId::from_str("cs_test\n"),
            Err(IdError::InvalidCharacter)
        );
    }

    #[test]
    fn overlong_id_is_rejected() {
        let long = "p".repeat(MAX_ID_LEN + 1);
        assert_eq!(PriceId::from_str(&long), Err(IdError::TooLong(MAX_ID_LEN + 1)));
    }

    #[test]
    fn session_id_serde_json() {
        let id: SessionId = serde_json::from_str("\"cs_test_xyz\"").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"cs_test_xyz\"");
    }

    #[test]
    fn serde_rejects_empty_string() {
        assert!(serde_json::from_str::<EventId>("\"\"").is_err());
    }
}
