//! Retractable weighted-mean accumulator.
//!
//! States form a commutative monoid under [`AggregateState::merge`] with
//! [`AggregateState::empty`] as identity. Accumulating an observation is
//! merging its singleton state; retracting it is merging the negated
//! singleton. The direct implementations below must stay equivalent to that
//! definition.
//!
//! Numbers are `f64` for the whole lifetime of a state. Summation is not
//! compensated, so a long run of accumulate/retract pairs can leave rounding
//! residue behind: a group whose rows were all retracted may finish with a
//! `total_weight` of `1e-17` rather than `0`, and [`AggregateState::finalize`]
//! then reports a defined (noisy) mean. Hosts that need exact cancellation
//! should feed values that are exactly representable or quantize upstream.

use std::iter::Sum;
use std::ops::{Add, Neg};

use serde::{Deserialize, Serialize};

use super::observation::Observation;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateState {
    weighted_sum: f64,
    total_weight: f64,
}

impl AggregateState {
    /// The zero identity: no active observations.
    pub const fn empty() -> Self {
        Self {
            weighted_sum: 0.0,
            total_weight: 0.0,
        }
    }

    /// Singleton state holding exactly one observation. Null observations
    /// yield the empty state.
    pub fn from_observation(obs: impl Into<Observation>) -> Self {
        match obs.into().contribution() {
            Some((weighted_sum, total_weight)) => Self {
                weighted_sum,
                total_weight,
            },
            None => Self::empty(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(weighted_sum: f64, total_weight: f64) -> Self {
        Self {
            weighted_sum,
            total_weight,
        }
    }

    pub fn weighted_sum(&self) -> f64 {
        self.weighted_sum
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// True when [`finalize`](Self::finalize) has no defined value.
    pub fn is_zero_weight(&self) -> bool {
        self.total_weight == 0.0
    }

    #[inline]
    #[must_use]
    pub fn accumulate(self, obs: impl Into<Observation>) -> Self {
        match obs.into().contribution() {
            Some((ws, w)) => Self {
                weighted_sum: self.weighted_sum + ws,
                total_weight: self.total_weight + w,
            },
            None => self,
        }
    }

    /// Removes the contribution of an observation previously accumulated
    /// (directly or through a merge) into this same logical state.
    ///
    /// The state does not track observation identity. Retracting something
    /// that was never accumulated, or retracting it twice, silently corrupts
    /// the aggregate; the caller owns exactly-once pairing.
    #[inline]
    #[must_use]
    pub fn retract(self, obs: impl Into<Observation>) -> Self {
        match obs.into().contribution() {
            Some((ws, w)) => Self {
                weighted_sum: self.weighted_sum - ws,
                total_weight: self.total_weight - w,
            },
            None => self,
        }
    }

    #[inline]
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            weighted_sum: self.weighted_sum + other.weighted_sum,
            total_weight: self.total_weight + other.total_weight,
        }
    }

    /// Algebraic inverse under merge.
    #[inline]
    #[must_use]
    pub fn negate(self) -> Self {
        Self {
            weighted_sum: -self.weighted_sum,
            total_weight: -self.total_weight,
        }
    }

    /// Weighted mean of the active observations, `None` when the total
    /// weight is zero. A defined mean of `0.0` is distinct from `None`.
    pub fn finalize(&self) -> Option<f64> {
        if self.is_zero_weight() {
            return None;
        }
        Some(self.weighted_sum / self.total_weight)
    }
}

impl Add for AggregateState {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.merge(rhs)
    }
}

impl Neg for AggregateState {
    type Output = Self;

    fn neg(self) -> Self {
        self.negate()
    }
}

impl Sum for AggregateState {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::empty(), Self::merge)
    }
}

impl<'a> Sum<&'a AggregateState> for AggregateState {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::empty(), |acc, s| acc.merge(*s))
    }
}
