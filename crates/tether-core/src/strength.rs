//! Constraint strengths.

use std::fmt;

/// The priority of a constraint.
///
/// A strength packs three priority buckets (strong, medium, weak) into one
/// ordered scalar. Each bucket is worth 1000 of the one below it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Strength(f64);

impl Strength {
    pub const REQUIRED: Strength = Strength(1_001_001_000.0);
    pub const STRONG: Strength = Strength(1_000_000.0);
    pub const MEDIUM: Strength = Strength(1_000.0);
    pub const WEAK: Strength = Strength(1.0);

    /// Build a strength from its strong, medium and weak components.
    ///
    /// Each component is scaled by `weight` and clamped to `[0, 1000]`.
    pub fn create(strong: f64, medium: f64, weak: f64, weight: f64) -> Self {
        let bucket = |v: f64| (v * weight).max(0.0).min(1000.0);
        Self(bucket(strong) * 1_000_000.0 + bucket(medium) * 1_000.0 + bucket(weak))
    }

    /// Create a custom strength, clipped to `[0, REQUIRED]`.
    pub fn new(value: f64) -> Self {
        Self(value).clip()
    }

    /// Clamp the strength to `[0, REQUIRED]`. NaN clips to zero.
    pub fn clip(self) -> Self {
        Self(self.0.max(0.0).min(Self::REQUIRED.0))
    }

    /// True for strengths that may never be relaxed.
    pub fn is_required(&self) -> bool {
        self.0 >= Self::REQUIRED.0
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Strength {
    fn from(value: f64) -> Self {
        Strength::new(value)
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = [
            (Strength::REQUIRED, "REQUIRED"),
            (Strength::STRONG, "STRONG"),
            (Strength::MEDIUM, "MEDIUM"),
            (Strength::WEAK, "WEAK"),
        ]
        .into_iter()
        .find(|(strength, _)| strength == self)
        .map(|(_, name)| name);

        match name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{}", self.0),
        }
    }
}
