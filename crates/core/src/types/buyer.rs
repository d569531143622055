//! Buyer identity type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`BuyerId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuyerIdError {
    /// The input string is empty.
    #[error("buyer id cannot be empty")]
    Empty,
}

/// Stable external identity of a basket owner.
///
/// This is the subject identifier issued by the identity provider. It is
/// opaque to the basket service: any non-empty string is accepted, and it is
/// never trimmed or case-folded, so two ids that differ in any byte refer to
/// different buyers.
///
/// ## Constraints
///
/// - Not empty
///
/// ## Examples
///
/// ```
/// use eshop_core::BuyerId;
///
/// assert!(BuyerId::parse("5f0c9a2e-users-u1").is_ok());
///
/// assert!(BuyerId::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct BuyerId(String);

impl BuyerId {
    /// Parse a `BuyerId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty.
    pub fn parse(s: &str) -> Result<Self, BuyerIdError> {
        if s.is_empty() {
            return Err(BuyerIdError::Empty);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the buyer id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `BuyerId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for BuyerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for BuyerId {
    type Err = BuyerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BuyerId {
    type Error = BuyerIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BuyerId> for String {
    fn from(id: BuyerId) -> Self {
        id.0
    }
}

impl AsRef<str> for BuyerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
