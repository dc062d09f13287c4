//! Core domain types shared across the allocation pipeline.
//!
//! Identifiers are opaque positive integers (§3 of the spec); the engine
//! never reorders or renumbers them in any externally visible way. Monetary
//! quantities are [`Money`], a fixed-point wrapper over `i64` micro-units so
//! that every arithmetic step stays exact and reproducible (see `DESIGN.md`
//! for the rationale).

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// External voter identifier. Unique per run; the engine treats it as opaque.
pub type VoterId = u64;

/// External project identifier. Unique per run; the engine treats it as opaque.
pub type ProjectId = u64;

/// Number of micro-units per whole input unit (1 unit = 1_000_000 micros).
pub const MICRO: i64 = 1_000_000;

/// A monetary amount, stored internally as a micro-unit-precise integer.
///
/// All arithmetic on `Money` is exact; there is no floating point anywhere
/// on the path that affects which project is selected or how much a voter
/// pays. [`Money::as_f64`] exists only for human-readable rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Build a `Money` from a whole input unit (e.g. a project's `min_cost`).
    pub const fn from_units(units: i64) -> Self {
        Money(units * MICRO)
    }

    /// Build a `Money` directly from micro-units (internal arithmetic only).
    pub const fn from_micros(micros: i64) -> Self {
        Money(micros)
    }

    pub const fn micros(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn min(self, other: Money) -> Money {
        if self <= other {
            self
        } else {
            other
        }
    }

    pub fn max(self, other: Money) -> Money {
        if self >= other {
            self
        } else {
            other
        }
    }

    pub fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }

    /// Lossy conversion to a float, for display purposes only — never feed
    /// this back into a comparison that affects algorithm behaviour.
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / MICRO as f64
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        Money(iter.map(|m| m.0).sum())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0.div_euclid(MICRO);
        let frac = self.0.rem_euclid(MICRO);
        if frac == 0 {
            write!(f, "{whole}")
        } else {
            // Trim trailing zeros for a readable, still-exact display.
            let mut frac_str = format!("{:06}", frac);
            while frac_str.ends_with('0') {
                frac_str.pop();
            }
            write!(f, "{whole}.{frac_str}")
        }
    }
}

/// Serialized as its exact decimal string (via [`Money`]'s `Display` impl)
/// rather than a JSON number, so a fractional continuous-phase allocation
/// round-trips without floating-point rounding.
impl serde::Serialize for Money {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A project's min/max cost range, as given by the external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectRange {
    pub min_cost: Money,
    pub max_cost: Money,
}

/// The raw, externally-shaped input to the engine: a bid table keyed by
/// project id then voter id. Zero amounts and unknown voters are still
/// possible here; [`crate::normalize`] cleans them up.
pub type RawBidTable = std::collections::BTreeMap<ProjectId, std::collections::BTreeMap<VoterId, Money>>;

/// Per-project maximum bid, `MaxBid[p] = max_v bid(p, v)` (0 if no supporters).
pub type MaxBidTable = std::collections::BTreeMap<ProjectId, Money>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_from_units_scales_to_micros() {
        assert_eq!(Money::from_units(1).micros(), MICRO);
        assert_eq!(Money::from_units(0).micros(), 0);
    }

    #[test]
    fn money_display_trims_trailing_zeros() {
        assert_eq!(Money::from_units(150).to_string(), "150");
        assert_eq!(
            Money::from_micros(166_666_667).to_string(),
            "166.666667"
        );
        assert_eq!(Money::from_micros(150_500_000).to_string(), "150.5");
    }

    #[test]
    fn money_ordering_matches_micros() {
        assert!(Money::from_units(1) < Money::from_units(2));
        assert!(Money::from_micros(100) < Money::from_units(1));
    }

    #[test]
    fn money_saturating_sub_floors_at_zero() {
        assert_eq!(
            Money::from_units(1).saturating_sub(Money::from_units(2)),
            Money::ZERO
        );
    }
}
