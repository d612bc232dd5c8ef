//! Mixtures and explosion.

use std::collections::BTreeMap;

use num::{Integer, One, Zero};

use super::Die;
use crate::outcome::{Integral, Outcome};
use crate::weight::Weight;

impl<T: Outcome> Die<T> {
    /// Exact mixture of weighted dice.
    ///
    /// Each branch contributes `weight * die.weight(o) / die.denominator()`
    /// to outcome `o`. Denominators are reconciled through their least common
    /// multiple so the result stays integral; if every branch die has
    /// denominator 1 the weights pass through unscaled. Branches whose die is
    /// empty are dropped.
    pub fn mix(branches: impl IntoIterator<Item = (Die<T>, Weight)>) -> Die<T> {
        let branches: Vec<(Die<T>, Weight)> = branches
            .into_iter()
            .filter(|(die, weight)| !die.is_empty() && !weight.is_zero())
            .collect();

        let lcm = branches
            .iter()
            .fold(Weight::one(), |acc, (die, _)| acc.lcm(die.denominator()));

        let mut merged: BTreeMap<T, Weight> = BTreeMap::new();
        for (die, weight) in &branches {
            let scale = weight * (&lcm / die.denominator());
            for (outcome, w) in die.iter() {
                *merged.entry(outcome.clone()).or_default() += w * &scale;
            }
        }
        Die::from_sorted(merged.into_iter().collect())
    }
}

impl<T: Integral> Die<T> {
    /// Rerolls the highest outcome and adds, up to `depth` extra rolls.
    ///
    /// The final denominator is `denominator ^ (depth + 1)`. Totals beyond
    /// the range of `T` are dropped.
    pub fn explode(&self, depth: u32) -> Die<T> {
        let Some(top) = self.max_outcome().copied() else {
            return self.clone();
        };
        let top_weight = self.weight(&top);

        let mut exploded = self.clone();
        for _ in 0..depth {
            let tail = Die::new(exploded.iter().filter_map(|(o, w)| {
                let total = T::from_i64(o.to_i64() + top.to_i64())?;
                Some((total, w.clone()))
            }));
            let branches = self
                .iter()
                .filter(|(o, _)| **o != top)
                .map(|(o, w)| (Die::single(*o), w.clone()))
                .chain(std::iter::once((tail, top_weight.clone())));
            exploded = Die::mix(branches);
        }
        exploded
    }
}
