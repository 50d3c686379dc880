// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};

/// Credit granted by a subscriber: how many more values it is willing to accept.
///
/// Bounded demand counts down as values are delivered. [`Demand::Unlimited`]
/// absorbs addition and is never decreased.
///
/// # Example
///
/// ```
/// use fanin_core::Demand;
///
/// let mut demand = Demand::max(2);
/// demand += 3;
/// demand -= 1;
/// assert_eq!(demand, Demand::max(4));
///
/// demand += Demand::Unlimited;
/// demand -= 10;
/// assert!(demand.is_unlimited());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Demand {
    /// No upper bound on the number of values.
    Unlimited,
    /// At most this many values.
    Max(usize),
}

impl Demand {
    /// No credit at all.
    pub const NONE: Self = Self::Max(0);

    /// Bounded demand of `count` values.
    #[must_use]
    pub const fn max(count: usize) -> Self {
        Self::Max(count)
    }

    #[must_use]
    pub const fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// Returns `true` for `Max(0)`.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::Max(0))
    }

    /// The bounded count, or `None` when unlimited.
    #[must_use]
    pub const fn as_max(self) -> Option<usize> {
        match self {
            Self::Unlimited => None,
            Self::Max(count) => Some(count),
        }
    }

    /// Subtracts `count`, returning `None` if bounded demand would go negative.
    #[must_use]
    pub const fn checked_sub(self, count: usize) -> Option<Self> {
        match self {
            Self::Unlimited => Some(Self::Unlimited),
            Self::Max(current) => match current.checked_sub(count) {
                Some(rest) => Some(Self::Max(rest)),
                None => None,
            },
        }
    }
}

impl Default for Demand {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<usize> for Demand {
    fn from(count: usize) -> Self {
        Self::Max(count)
    }
}

impl fmt::Display for Demand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => write!(f, "unlimited"),
            Self::Max(count) => write!(f, "max({count})"),
        }
    }
}

impl Add for Demand {
    type Output = Self;

    /// Bounded sums that overflow `usize` become unlimited.
    fn add(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Max(a), Self::Max(b)) => a.checked_add(b).map_or(Self::Unlimited, Self::Max),
            _ => Self::Unlimited,
        }
    }
}

impl Add<usize> for Demand {
    type Output = Self;

    fn add(self, rhs: usize) -> Self {
        self + Self::Max(rhs)
    }
}

impl AddAssign for Demand {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl AddAssign<usize> for Demand {
    fn add_assign(&mut self, rhs: usize) {
        *self = *self + rhs;
    }
}

impl Sub<usize> for Demand {
    type Output = Self;

    /// # Panics
    ///
    /// Panics if bounded demand would become negative. Consuming credit that was
    /// never granted is a logic error, not a runtime condition.
    fn sub(self, rhs: usize) -> Self {
        match self.checked_sub(rhs) {
            Some(rest) => rest,
            None => panic!("demand {self} cannot be reduced by {rhs}"),
        }
    }
}

impl SubAssign<usize> for Demand {
    fn sub_assign(&mut self, rhs: usize) {
        *self = *self - rhs;
    }
}

impl PartialOrd for Demand {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Demand {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Unlimited, Self::Unlimited) => Ordering::Equal,
            (Self::Unlimited, Self::Max(_)) => Ordering::Greater,
            (Self::Max(_), Self::Unlimited) => Ordering::Less,
            (Self::Max(a), Self::Max(b)) => a.cmp(b),
        }
    }
}

impl PartialEq<usize> for Demand {
    fn eq(&self, other: &usize) -> bool {
        matches!(self, Self::Max(count) if count == other)
    }
}

impl PartialOrd<usize> for Demand {
    fn partial_cmp(&self, other: &usize) -> Option<Ordering> {
        Some(self.cmp(&Self::Max(*other)))
    }
}
