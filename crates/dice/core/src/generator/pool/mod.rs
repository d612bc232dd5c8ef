//! Dice pools.
//!
//! A [`Pool`] is a multiset of dice plus a `sorted_roll_counts` tuple saying
//! how much each sorted rank contributes. Keep-highest, drop-lowest, middle
//! and signed differences are all expressed through that tuple; evaluators see
//! only the resulting per-outcome counts.
//!
//! Pools are canonical: dice are stored sorted with equal dice merged, and a
//! structural hash is computed once at construction. Two pools with the same
//! dice and counts are interchangeable as evaluation cache keys however they
//! were built.

mod counts;
mod pop;

use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;

use super::cost::estimate_dice_cost;
use super::{MultisetGenerator, PopBranch, PopCost, PopOrder};
use crate::die::Die;
use crate::error::{DiceError, DiceResult};
use crate::evaluator::{EvaluationEngine, SumEvaluator};
use crate::outcome::{Integral, Outcome};
use crate::weight::Weight;

pub use counts::{CountItem, RollCountSpec, resolve as resolve_roll_counts};

/// Which side gives up the extra die when [`Pool::middle`] cannot drop the
/// same number of dice from both ends.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MiddleTie {
    /// Keep the higher window; the extra die is dropped from the bottom.
    High,
    /// Keep the lower window; the extra die is dropped from the top.
    Low,
    /// Reject uneven splits.
    #[default]
    Error,
}

/// Immutable dice multiset with per-rank roll counts.
pub struct Pool<T> {
    inner: Arc<PoolInner<T>>,
}

struct PoolInner<T> {
    dice: Vec<(Die<T>, u32)>,
    sorted_roll_counts: Vec<i64>,
    hash: u64,
}

impl<T: Outcome> Pool<T> {
    /// One of each die, every die counted once.
    pub fn new(dice: impl IntoIterator<Item = Die<T>>) -> Self {
        Self::from_multiplicities(dice.into_iter().map(|die| (die, 1)))
    }

    /// Dice with multiplicities, every die counted once. Duplicate dice merge.
    pub fn from_multiplicities(pairs: impl IntoIterator<Item = (Die<T>, u32)>) -> Self {
        let dice = pop::canonical_dice(pairs.into_iter().collect());
        let size = dice.iter().map(|(_, m)| *m as usize).sum();
        Self::from_parts(dice, vec![1; size])
    }

    /// A pool with no dice.
    pub fn empty() -> Self {
        Self::from_parts(Vec::new(), Vec::new())
    }

    /// `dice` must be canonical and `sorted_roll_counts` one entry per die.
    pub(crate) fn from_parts(dice: Vec<(Die<T>, u32)>, sorted_roll_counts: Vec<i64>) -> Self {
        debug_assert_eq!(
            dice.iter().map(|(_, m)| *m as usize).sum::<usize>(),
            sorted_roll_counts.len()
        );
        let mut hasher = FxHasher::default();
        dice.hash(&mut hasher);
        sorted_roll_counts.hash(&mut hasher);
        Self {
            inner: Arc::new(PoolInner {
                dice,
                sorted_roll_counts,
                hash: hasher.finish(),
            }),
        }
    }

    /// Distinct dice and their multiplicities, in canonical order.
    pub fn dice(&self) -> &[(Die<T>, u32)] {
        &self.inner.dice
    }

    pub fn sorted_roll_counts(&self) -> &[i64] {
        &self.inner.sorted_roll_counts
    }

    /// Total number of dice.
    pub fn size(&self) -> usize {
        self.inner.sorted_roll_counts.len()
    }

    pub fn has_zero_roll_counts(&self) -> bool {
        self.inner.sorted_roll_counts.iter().all(|c| *c == 0)
    }

    /// Replaces the roll counts outright.
    pub fn with_roll_counts(&self, counts: Vec<i64>) -> DiceResult<Self> {
        if counts.len() != self.size() {
            return Err(DiceError::RollCountMismatch {
                expected: self.size(),
                actual: counts.len(),
            });
        }
        Ok(Self::from_parts(self.inner.dice.clone(), counts))
    }

    /// Restricts the pool by a roll-count specification.
    ///
    /// On a pool that is already restricted the new counts multiply the old
    /// ones element-wise, so `keep` composes.
    pub fn keep(&self, spec: impl Into<RollCountSpec>) -> DiceResult<Self> {
        let resolved = counts::resolve(self.size(), &spec.into())?;
        Ok(self.compose(resolved))
    }

    /// Keeps the `keep` highest dice after dropping the `drop` highest.
    pub fn highest(&self, keep: usize, drop: usize) -> Self {
        let size = self.size();
        let stop = size.saturating_sub(drop);
        let start = stop.saturating_sub(keep);
        self.compose(rank_window(size, start, stop))
    }

    /// Keeps the `keep` lowest dice after dropping the `drop` lowest.
    pub fn lowest(&self, keep: usize, drop: usize) -> Self {
        let size = self.size();
        let start = drop.min(size);
        let stop = drop.saturating_add(keep).min(size);
        self.compose(rank_window(size, start, stop))
    }

    /// Keeps the `keep` middle dice. When the dropped dice cannot split
    /// evenly, `tie` decides which end loses the extra one.
    pub fn middle(&self, keep: usize, tie: MiddleTie) -> DiceResult<Self> {
        let size = self.size();
        let keep = keep.min(size);
        let dropped = size - keep;
        let below = match tie {
            _ if dropped % 2 == 0 => dropped / 2,
            MiddleTie::High => dropped / 2 + 1,
            MiddleTie::Low => dropped / 2,
            MiddleTie::Error => return Err(DiceError::UnevenMiddle { size, keep }),
        };
        Ok(self.lowest(keep, below))
    }

    fn compose(&self, counts: Vec<i64>) -> Self {
        let composed = self
            .inner
            .sorted_roll_counts
            .iter()
            .zip(counts)
            .map(|(old, new)| old * new)
            .collect();
        Self::from_parts(self.inner.dice.clone(), composed)
    }
}

fn rank_window(size: usize, start: usize, stop: usize) -> Vec<i64> {
    (0..size).map(|i| i64::from(i >= start && i < stop)).collect()
}

impl<T: Integral> Pool<T> {
    /// Distribution of the weighted sum of the pool.
    pub fn sum(&self) -> Die<T> {
        EvaluationEngine::new(SumEvaluator).evaluate_pool(self)
    }
}

impl<T: Outcome> MultisetGenerator<T> for Pool<T> {
    fn arity(&self) -> usize {
        1
    }

    fn outcomes(&self) -> Vec<T> {
        let mut outcomes: Vec<T> = self
            .inner
            .dice
            .iter()
            .flat_map(|(die, _)| die.outcomes().cloned())
            .collect();
        outcomes.sort();
        outcomes.dedup();
        outcomes
    }

    fn min_outcome(&self) -> Option<&T> {
        self.inner
            .dice
            .iter()
            .filter_map(|(die, _)| die.min_outcome())
            .min()
    }

    fn max_outcome(&self) -> Option<&T> {
        self.inner
            .dice
            .iter()
            .filter_map(|(die, _)| die.max_outcome())
            .max()
    }

    fn is_resolvable(&self) -> bool {
        self.inner.dice.iter().all(|(die, _)| !die.is_empty())
    }

    fn denominator(&self) -> Weight {
        pop::dice_denominator(&self.inner.dice)
    }

    fn generate_min(&self, outcome: &T) -> Vec<PopBranch<Self>> {
        pop::generate(self, PopOrder::Min, outcome)
    }

    fn generate_max(&self, outcome: &T) -> Vec<PopBranch<Self>> {
        pop::generate(self, PopOrder::Max, outcome)
    }

    fn estimate_pop_cost(&self) -> PopCost {
        estimate_dice_cost(&self.inner.dice)
    }
}

impl<T> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Outcome> PartialEq for Pool<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.hash == other.inner.hash
                && self.inner.sorted_roll_counts == other.inner.sorted_roll_counts
                && self.inner.dice == other.inner.dice)
    }
}

impl<T: Outcome> Eq for Pool<T> {}

impl<T: Outcome> Hash for Pool<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.inner.hash);
    }
}

impl<T: fmt::Debug> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("dice", &self.inner.dice)
            .field("sorted_roll_counts", &self.inner.sorted_roll_counts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use num::Zero;

    use super::*;
    use crate::die::d;

    /// Branch weights scaled by what the remaining pools still represent.
    fn total(branches: &[PopBranch<Pool<i64>>]) -> Weight {
        branches
            .iter()
            .map(|b| &b.weight * b.next.denominator())
            .sum()
    }

    #[test]
    fn construction_is_canonical() {
        let a = Pool::new([d(8), d(6), d(6)]);
        let b = Pool::from_multiplicities([(d(6), 1), (d(8), 1), (d(6), 1)]);
        assert_eq!(a, b);
        assert_eq!(a.dice().len(), 2);
        assert_eq!(a.size(), 3);
        assert_eq!(a.sorted_roll_counts(), &[1, 1, 1]);
    }

    #[test]
    fn pop_max_of_identical_dice_has_one_branch_per_hit_count() {
        let pool = d(6).pool(3);
        let branches = pool.generate_max(&6);
        assert_eq!(branches.len(), 4);
        assert_eq!(total(&branches), pool.denominator());
        assert_eq!(pool.denominator(), Weight::from(216u32));

        let three_sixes = branches
            .iter()
            .find(|b| b.counts == vec![3])
            .expect("all three dice can roll a six");
        assert_eq!(three_sixes.weight, Weight::from(1u32));
        assert_eq!(three_sixes.next.size(), 0);

        let no_sixes = branches
            .iter()
            .find(|b| b.counts == vec![0])
            .expect("no die needs to roll a six");
        assert_eq!(no_sixes.weight, Weight::from(1u32));
        assert_eq!(no_sixes.next, d(5).pool(3));

        let one_six = branches
            .iter()
            .find(|b| b.counts == vec![1])
            .expect("one die can roll a six");
        assert_eq!(one_six.weight, Weight::from(3u32));
    }

    #[test]
    fn pop_of_absent_outcome_is_unchanged() {
        let pool = Pool::new([d(4), d(6)]);
        let branches = pool.generate_max(&8);
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].next, pool);
        assert_eq!(branches[0].counts, vec![0]);
    }

    #[test]
    fn pop_reports_counts_at_popped_end() {
        let pool = d(6).pool(3).keep(-1isize).expect("valid index");
        let branches = pool.generate_min(&1);
        // Low ranks count zero, so any low hits report zero.
        assert!(branches.iter().all(|b| b.counts == vec![0] || b.next.size() == 0));
        let all_ones = branches
            .iter()
            .find(|b| b.counts == vec![1])
            .expect("top rank is hit when all three roll one");
        assert_eq!(all_ones.weight, Weight::from(1u32));
    }

    #[test]
    fn zero_remaining_counts_fold_into_weight() {
        // Keep only the highest die: once it is popped nothing else counts.
        let pool = d(6).pool(3).highest(1, 0);
        let branches = pool.generate_max(&6);
        // One branch with no sixes, and one folded branch for one-or-more sixes.
        assert_eq!(branches.len(), 2);
        let folded = branches
            .iter()
            .find(|b| b.counts == vec![1])
            .expect("a six was rolled");
        assert_eq!(folded.next, Pool::empty());
        // 3 * 5^2 + 3 * 5 + 1
        assert_eq!(folded.weight, Weight::from(91u32));
        assert_eq!(total(&branches), pool.denominator());
    }

    #[test]
    fn empty_pool_pops_to_itself() {
        let pool: Pool<i64> = Pool::empty();
        let branches = pool.generate_min(&3);
        assert_eq!(branches, vec![PopBranch::new(pool.clone(), vec![0], Weight::from(1u32))]);
        assert_eq!(pool.min_outcome(), None);
    }

    #[test]
    fn single_outcome_die_always_hits() {
        let pool = Die::single(4i64).pool(3);
        let branches = pool.generate_min(&4);
        assert_eq!(
            branches,
            vec![PopBranch::new(Pool::empty(), vec![3], Weight::from(1u32))]
        );
    }

    #[test]
    fn empty_die_makes_pool_unresolvable() {
        let pool = Pool::new([d(6), Die::empty()]);
        assert!(!pool.is_resolvable());
        assert!(pool.generate_max(&6).is_empty());
        assert!(pool.denominator().is_zero());
    }

    #[test]
    fn keep_composes_multiplicatively() {
        let pool = d(6).pool(4).highest(2, 0);
        assert_eq!(pool.sorted_roll_counts(), &[0, 0, 1, 1]);
        let narrowed = pool.keep(-1isize).expect("valid index");
        assert_eq!(narrowed.sorted_roll_counts(), &[0, 0, 0, 1]);
    }

    #[test]
    fn lowest_and_middle_windows() {
        let pool = d(6).pool(5);
        assert_eq!(pool.lowest(2, 1).sorted_roll_counts(), &[0, 1, 1, 0, 0]);
        let middle = |keep, tie| pool.middle(keep, tie).expect("split is allowed");
        assert_eq!(middle(3, MiddleTie::Error).sorted_roll_counts(), &[0, 1, 1, 1, 0]);
        assert_eq!(middle(2, MiddleTie::Low).sorted_roll_counts(), &[0, 1, 1, 0, 0]);
        assert_eq!(middle(2, MiddleTie::High).sorted_roll_counts(), &[0, 0, 1, 1, 0]);
        assert_eq!(middle(9, MiddleTie::Error).sorted_roll_counts(), &[1, 1, 1, 1, 1]);
        assert_eq!(
            pool.middle(2, MiddleTie::Error),
            Err(DiceError::UnevenMiddle { size: 5, keep: 2 })
        );
        assert_eq!(
            pool.with_roll_counts(vec![1, 1]),
            Err(DiceError::RollCountMismatch {
                expected: 5,
                actual: 2
            })
        );
    }

    #[test]
    fn popped_remainders_merge_with_existing_kinds() {
        // Popping 6 from the d6 leaves a d5, which merges with the d5 already present.
        let pool = Pool::new([d(6), d(5)]);
        let branches = pool.generate_max(&6);
        let miss = branches
            .iter()
            .find(|b| b.counts == vec![0])
            .expect("d6 can miss");
        assert_eq!(miss.next, d(5).pool(2));
    }
}
