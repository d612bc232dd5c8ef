//! Immutable integer-weighted distributions over outcomes.
//!
//! A [`Die`] is a sorted outcome→weight table. It is cheap to clone (the
//! table is shared behind an `Arc`) and compares, orders and hashes
//! structurally, which lets pools built from independently constructed dice
//! share evaluation cache entries.

mod ops;

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use std::collections::BTreeMap;
use std::sync::Arc;

use num::{Integer, One, Zero};
use rustc_hash::FxHasher;

use crate::error::{DiceError, DiceResult};
use crate::generator::{Pool, PopOrder};
use crate::outcome::{Integral, Outcome};
use crate::weight::Weight;

/// Immutable distribution over outcomes.
///
/// Invariants: outcomes are strictly ascending, every stored weight is
/// positive, and `denominator()` is the sum of the weights.
pub struct Die<T> {
    inner: Arc<DieInner<T>>,
}

struct DieInner<T> {
    entries: Vec<(T, Weight)>,
    denominator: Weight,
    hash: u64,
}

impl<T: Outcome> Die<T> {
    /// Builds a die from outcome/weight pairs.
    ///
    /// Duplicate outcomes are merged and zero weights are dropped.
    pub fn new<W>(pairs: impl IntoIterator<Item = (T, W)>) -> Self
    where
        W: Into<Weight>,
    {
        let mut merged: BTreeMap<T, Weight> = BTreeMap::new();
        for (outcome, weight) in pairs {
            *merged.entry(outcome).or_default() += weight.into();
        }
        Self::from_sorted(merged.into_iter().filter(|(_, w)| !w.is_zero()).collect())
    }

    /// Every outcome with weight 1.
    pub fn uniform(outcomes: impl IntoIterator<Item = T>) -> Self {
        Self::new(outcomes.into_iter().map(|o| (o, 1u32)))
    }

    /// A die that always rolls `outcome`.
    pub fn single(outcome: T) -> Self {
        Self::from_sorted(vec![(outcome, Weight::one())])
    }

    /// The outcome-less die.
    pub fn empty() -> Self {
        Self::from_sorted(Vec::new())
    }

    /// Entries must already be strictly ascending with positive weights.
    pub(crate) fn from_sorted(entries: Vec<(T, Weight)>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        let denominator = entries.iter().map(|(_, w)| w).sum();
        let mut hasher = FxHasher::default();
        entries.hash(&mut hasher);
        Self {
            inner: Arc::new(DieInner {
                entries,
                denominator,
                hash: hasher.finish(),
            }),
        }
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &T> {
        self.inner.entries.iter().map(|(o, _)| o)
    }

    pub fn weights(&self) -> impl Iterator<Item = &Weight> {
        self.inner.entries.iter().map(|(_, w)| w)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&T, &Weight)> {
        self.inner.entries.iter().map(|(o, w)| (o, w))
    }

    /// Weight of `outcome`, zero if the die cannot roll it.
    pub fn weight(&self, outcome: &T) -> Weight {
        self.inner
            .entries
            .binary_search_by(|(o, _)| o.cmp(outcome))
            .map(|idx| self.inner.entries[idx].1.clone())
            .unwrap_or_default()
    }

    pub fn denominator(&self) -> &Weight {
        &self.inner.denominator
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub fn min_outcome(&self) -> Option<&T> {
        self.inner.entries.first().map(|(o, _)| o)
    }

    pub fn max_outcome(&self) -> Option<&T> {
        self.inner.entries.last().map(|(o, _)| o)
    }

    pub(crate) fn extreme(&self, order: PopOrder) -> Option<&T> {
        match order {
            PopOrder::Min => self.min_outcome(),
            PopOrder::Max => self.max_outcome(),
        }
    }

    /// Removes the lowest outcome, returning the remainder and its weight.
    pub fn pop_min(&self) -> DiceResult<(Die<T>, Weight)> {
        self.split(PopOrder::Min)
            .ok_or(DiceError::PopFromEmpty { what: "die" })
    }

    /// Removes the highest outcome, returning the remainder and its weight.
    pub fn pop_max(&self) -> DiceResult<(Die<T>, Weight)> {
        self.split(PopOrder::Max)
            .ok_or(DiceError::PopFromEmpty { what: "die" })
    }

    pub(crate) fn split(&self, order: PopOrder) -> Option<(Die<T>, Weight)> {
        let entries = &self.inner.entries;
        let (popped, rest) = match order {
            PopOrder::Min => {
                let (first, rest) = entries.split_first()?;
                (first, rest)
            }
            PopOrder::Max => {
                let (last, rest) = entries.split_last()?;
                (last, rest)
            }
        };
        Some((Self::from_sorted(rest.to_vec()), popped.1.clone()))
    }

    /// Divides every weight by their greatest common divisor.
    pub fn reduce(&self) -> Die<T> {
        let gcd = self
            .weights()
            .fold(Weight::zero(), |acc, w| acc.gcd(w));
        if gcd.is_zero() || gcd.is_one() {
            return self.clone();
        }
        Self::from_sorted(
            self.inner
                .entries
                .iter()
                .map(|(o, w)| (o.clone(), w / &gcd))
                .collect(),
        )
    }

    /// Maps every outcome, merging outcomes that map to the same value.
    pub fn map<U: Outcome>(&self, f: impl Fn(&T) -> U) -> Die<U> {
        Die::new(self.iter().map(|(o, w)| (f(o), w.clone())))
    }

    /// Combines two independent dice outcome by outcome.
    pub fn combine<U, V>(&self, other: &Die<U>, f: impl Fn(&T, &U) -> V) -> Die<V>
    where
        U: Outcome,
        V: Outcome,
    {
        Die::new(self.iter().flat_map(|(a, wa)| {
            other
                .iter()
                .map(|(b, wb)| (f(a, b), wa * wb))
                .collect::<Vec<_>>()
        }))
    }

    /// Joint distribution of two independent dice.
    pub fn product<U: Outcome>(&self, other: &Die<U>) -> Die<(T, U)> {
        self.combine(other, |a, b| (a.clone(), b.clone()))
    }

    /// A pool of `count` copies of this die.
    pub fn pool(&self, count: u32) -> Pool<T> {
        Pool::from_multiplicities([(self.clone(), count)])
    }
}

impl<T: Integral> Die<T> {
    /// Fair die over `1..=sides`.
    pub fn standard(sides: T) -> Self {
        Self::uniform((1..=sides.to_i64()).filter_map(T::from_i64))
    }
}

/// Fair `i64` die over `1..=sides`.
pub fn d(sides: i64) -> Die<i64> {
    Die::standard(sides)
}

impl<T> Clone for Die<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Outcome> PartialEq for Die<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.hash == other.inner.hash && self.inner.entries == other.inner.entries)
    }
}

impl<T: Outcome> Eq for Die<T> {}

impl<T: Outcome> PartialOrd for Die<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Outcome> Ord for Die<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return Ordering::Equal;
        }
        self.inner.entries.cmp(&other.inner.entries)
    }
}

impl<T: Outcome> Hash for Die<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.inner.hash);
    }
}

impl<T: fmt::Debug> fmt::Debug for Die<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Die")?;
        f.debug_map()
            .entries(self.inner.entries.iter().map(|(o, w)| (o, w)))
            .finish()
    }
}

impl<T: Outcome> Default for Die<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(value: u32) -> Weight {
        Weight::from(value)
    }

    #[test]
    fn new_merges_duplicates_and_sorts() {
        let die = Die::new([(3, 1u32), (1, 2), (3, 4), (2, 0)]);
        let outcomes: Vec<i32> = die.outcomes().copied().collect();
        assert_eq!(outcomes, vec![1, 3]);
        assert_eq!(die.weight(&3), w(5));
        assert_eq!(die.weight(&2), w(0));
        assert_eq!(die.denominator(), &w(7));
    }

    #[test]
    fn pop_extremes() {
        let d6 = d(6);
        let (rest, popped) = d6.pop_max().expect("non-empty");
        assert_eq!(popped, w(1));
        assert_eq!(rest.max_outcome(), Some(&5));
        assert_eq!(rest.denominator(), &w(5));

        let (rest, popped) = d6.pop_min().expect("non-empty");
        assert_eq!(popped, w(1));
        assert_eq!(rest.min_outcome(), Some(&2));
    }

    #[test]
    fn single_outcome_pops_to_empty() {
        let (rest, popped) = Die::single(4).pop_min().expect("non-empty");
        assert!(rest.is_empty());
        assert_eq!(popped, w(1));
        assert_eq!(
            rest.pop_max(),
            Err(DiceError::PopFromEmpty { what: "die" })
        );
    }

    #[test]
    fn structural_equality_ignores_construction_path() {
        let a = d(4);
        let b = Die::new([(4i64, 1u32), (2, 1), (3, 1), (1, 1)]);
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);

        let mut ha = FxHasher::default();
        let mut hb = FxHasher::default();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn reduce_divides_by_gcd() {
        let die = Die::new([(1, 4u32), (2, 6)]).reduce();
        assert_eq!(die.weight(&1), w(2));
        assert_eq!(die.weight(&2), w(3));
    }

    #[test]
    fn combine_convolves() {
        let sum = d(6).combine(&d(6), |a, b| a + b);
        assert_eq!(sum.denominator(), &w(36));
        assert_eq!(sum.weight(&7), w(6));
        assert_eq!(sum.weight(&2), w(1));
    }
}
