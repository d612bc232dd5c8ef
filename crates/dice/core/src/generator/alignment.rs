use std::sync::Arc;

use num::One;

use super::{MultisetGenerator, PopBranch, PopCost};
use crate::outcome::Outcome;
use crate::weight::Weight;

/// A generator with no dice that forces a fixed set of outcomes to be visited.
///
/// Popping an outcome in the set removes it with weight 1; any other outcome
/// is a no-op. Evaluators use this through
/// [`extra_outcomes`](crate::MultisetEvaluator::extra_outcomes), for example
/// to see every integer in a range even where no die can roll it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Alignment<T> {
    outcomes: Arc<[T]>,
}

impl<T: Outcome> Alignment<T> {
    pub fn new(outcomes: impl IntoIterator<Item = T>) -> Self {
        let mut outcomes: Vec<T> = outcomes.into_iter().collect();
        outcomes.sort();
        outcomes.dedup();
        Self {
            outcomes: outcomes.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(core::iter::empty())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn pop_at(&self, hit: bool, remaining: &[T]) -> Vec<PopBranch<Self>> {
        let next = if hit {
            Self {
                outcomes: remaining.into(),
            }
        } else {
            self.clone()
        };
        vec![PopBranch::new(next, Vec::new(), Weight::one())]
    }
}

impl<T: Outcome> MultisetGenerator<T> for Alignment<T> {
    fn arity(&self) -> usize {
        0
    }

    fn outcomes(&self) -> Vec<T> {
        self.outcomes.to_vec()
    }

    fn min_outcome(&self) -> Option<&T> {
        self.outcomes.first()
    }

    fn max_outcome(&self) -> Option<&T> {
        self.outcomes.last()
    }

    fn is_resolvable(&self) -> bool {
        true
    }

    fn denominator(&self) -> Weight {
        Weight::one()
    }

    fn generate_min(&self, outcome: &T) -> Vec<PopBranch<Self>> {
        match self.outcomes.split_first() {
            Some((first, rest)) if first == outcome => self.pop_at(true, rest),
            _ => self.pop_at(false, &[]),
        }
    }

    fn generate_max(&self, outcome: &T) -> Vec<PopBranch<Self>> {
        match self.outcomes.split_last() {
            Some((last, rest)) if last == outcome => self.pop_at(true, rest),
            _ => self.pop_at(false, &[]),
        }
    }

    fn estimate_pop_cost(&self) -> PopCost {
        PopCost::ZERO
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Alignment<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Alignment").field(&&*self.outcomes).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_present_outcome() {
        let alignment = Alignment::new([3, 1, 2, 2]);
        assert_eq!(alignment.len(), 3);

        let branches = alignment.generate_min(&1);
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].next.outcomes(), vec![2, 3]);
        assert!(branches[0].counts.is_empty());
        assert_eq!(branches[0].weight, Weight::one());
    }

    #[test]
    fn absent_outcome_is_noop() {
        let alignment = Alignment::new([2, 5]);
        let branches = alignment.generate_max(&4);
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].next, alignment);
    }
}
