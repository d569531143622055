//! Line item quantity type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a quantity falls outside the accepted range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("quantity {value} is out of range ({min}..={max})", min = Quantity::MIN, max = Quantity::MAX)]
pub struct QuantityError {
    /// The rejected value.
    pub value: i32,
}

/// A validated basket line quantity (0 to 10 000 inclusive).
///
/// The store persists whatever quantity it is given; this type is how the
/// request boundary enforces the range before a basket is built.
///
/// ```
/// use eshop_core::Quantity;
///
/// assert!(Quantity::parse(0).is_ok());
/// assert!(Quantity::parse(10_000).is_ok());
/// assert!(Quantity::parse(-1).is_err());
/// assert!(Quantity::parse(10_001).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// Smallest accepted quantity.
    pub const MIN: i32 = 0;
    /// Largest accepted quantity.
    pub const MAX: i32 = 10_000;

    /// Validate a raw quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError`] if `value` is outside `MIN..=MAX`.
    pub const fn parse(value: i32) -> Result<Self, QuantityError> {
        if value < Self::MIN || value > Self::MAX {
            return Err(QuantityError { value });
        }
        Ok(Self(value))
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Quantity> for i32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
