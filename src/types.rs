//! Validated scalar newtypes shared by the probabilistic solvers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A probability in the closed interval [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Probability(f64);

impl Probability {
    /// Create a new probability, validating it lies in [0, 1].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidProbability`] if the value is outside
    /// [0, 1] or not finite.
    pub fn new(value: f64) -> Result<Self, crate::Error> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Probability(value))
        } else {
            Err(crate::Error::InvalidProbability { value })
        }
    }

    /// For literal table entries known to lie in [0, 1].
    pub(crate) const fn from_constant(value: f64) -> Self {
        Probability(value)
    }

    /// Probability of the complementary event.
    pub fn complement(&self) -> Self {
        Probability(1.0 - self.0)
    }

    /// Get the inner value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Probability {
    type Error = crate::Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Probability::new(value)
    }
}

impl From<Probability> for f64 {
    fn from(p: Probability) -> Self {
        p.0
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

/// Discount factor γ in the open interval (0, 1).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Discount(f64);

impl Discount {
    /// Create a new discount factor.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidDiscount`] unless `0 < value < 1`.
    pub fn new(value: f64) -> Result<Self, crate::Error> {
        if value.is_finite() && value > 0.0 && value < 1.0 {
            Ok(Discount(value))
        } else {
            Err(crate::Error::InvalidDiscount { value })
        }
    }

    /// Get the inner value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Discount {
    type Error = crate::Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Discount::new(value)
    }
}

impl From<Discount> for f64 {
    fn from(d: Discount) -> Self {
        d.0
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
