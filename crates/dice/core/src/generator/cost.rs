//! Pop-direction cost estimation.
//!
//! Popping an outcome that several die kinds share multiplies their hit
//! distributions together, so the branching factor of a pop is the product of
//! `(multiplicity + 1)` over the kinds whose extreme is that outcome. The
//! estimate sums that product over distinct extremes. It is a heuristic only:
//! it ranks the two directions and never affects results.
//!
//! Mixed standard dice (d4, d6, d8, d10, d12) all share their minimum, so
//! popping from the bottom branches on every kind at once while popping from
//! the top handles one kind at a time.

use core::iter::Sum;
use core::ops::Add;
use std::collections::BTreeMap;

use super::PopOrder;
use crate::die::Die;
use crate::outcome::Outcome;

/// Estimated cost of popping from each end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PopCost {
    pub min: u64,
    pub max: u64,
}

impl PopCost {
    pub const ZERO: Self = Self { min: 0, max: 0 };

    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub const fn of(&self, order: PopOrder) -> u64 {
        match order {
            PopOrder::Min => self.min,
            PopOrder::Max => self.max,
        }
    }

    /// Cheaper direction, `None` on a tie.
    pub fn preferred(&self) -> Option<PopOrder> {
        match self.min.cmp(&self.max) {
            core::cmp::Ordering::Less => Some(PopOrder::Min),
            core::cmp::Ordering::Greater => Some(PopOrder::Max),
            core::cmp::Ordering::Equal => None,
        }
    }
}

impl Add for PopCost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            min: self.min.saturating_add(rhs.min),
            max: self.max.saturating_add(rhs.max),
        }
    }
}

impl Sum for PopCost {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

pub(crate) fn estimate_dice_cost<T: Outcome>(dice: &[(Die<T>, u32)]) -> PopCost {
    PopCost {
        min: directional_cost(dice, PopOrder::Min),
        max: directional_cost(dice, PopOrder::Max),
    }
}

fn directional_cost<T: Outcome>(dice: &[(Die<T>, u32)], order: PopOrder) -> u64 {
    let mut groups: BTreeMap<&T, u64> = BTreeMap::new();
    for (die, multiplicity) in dice {
        if let Some(extreme) = die.extreme(order) {
            let branching = u64::from(*multiplicity).saturating_add(1);
            let product = groups.entry(extreme).or_insert(1);
            *product = product.saturating_mul(branching);
        }
    }
    groups
        .values()
        .fold(0u64, |acc, product| acc.saturating_add(*product))
}
