use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of lines, across a corpus, that match a pattern.
///
/// On the wire a count travels as a signed 64-bit integer; see
/// [`MatchCount::to_wire`] and [`MatchCount::from_wire`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchCount(u64);

impl MatchCount {
    pub const ZERO: Self = Self(0);

    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Wire representation. Saturates at `i64::MAX`.
    pub fn to_wire(self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }

    /// Parse a wire value, rejecting negatives.
    pub fn from_wire(value: i64) -> Result<Self, TypeError> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| TypeError::NegativeCount(value))
    }
}

impl fmt::Display for MatchCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MatchCount {
    fn from(count: u64) -> Self {
        Self(count)
    }
}

impl From<MatchCount> for u64 {
    fn from(count: MatchCount) -> Self {
        count.0
    }
}

impl Add for MatchCount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for MatchCount {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for MatchCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_of_counts() {
        let total: MatchCount = [2u64, 1, 0].into_iter().map(MatchCount::new).sum();
        assert_eq!(total, MatchCount::new(3));
    }

    #[test]
    fn add_assign_saturates() {
        let mut c = MatchCount::new(u64::MAX);
        c += MatchCount::new(1);
        assert_eq!(c.get(), u64::MAX);
    }

    #[test]
    fn wire_conversion() {
        assert_eq!(MatchCount::new(42).to_wire(), 42);
        assert_eq!(MatchCount::new(u64::MAX).to_wire(), i64::MAX);
        assert_eq!(MatchCount::from_wire(7).unwrap(), MatchCount::new(7));
        assert_eq!(MatchCount::from_wire(-1), Err(TypeError::NegativeCount(-1)));
    }

    #[test]
    fn display_is_number() {
        assert_eq!(MatchCount::new(3040).to_string(), "3040");
    }
}
