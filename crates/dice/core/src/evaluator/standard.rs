//! Ready-made evaluators.
//!
//! | Evaluator              | Final outcome                      | Order     |
//! |------------------------|------------------------------------|-----------|
//! | [`SumEvaluator`]       | weighted sum of the outcomes       | any       |
//! | [`CountEvaluator`]     | total count                        | any       |
//! | [`SortedEvaluator`]    | counted outcomes, ascending        | any       |
//! | [`LargestMatchingSet`] | `(size, outcome)` of the best set  | any       |
//! | [`LargestStraight`]    | `(length, top)` of the best run    | ascending |
//!
//! Ties between matching sets or runs go to the higher outcome. Evaluating
//! zero dice rerolls for the last two, since there is no set or run to
//! report.

use super::{FinalOutcome, MultisetEvaluator, Order, Transition};
use crate::outcome::{Integral, Outcome};

fn total(counts: &[i64]) -> i64 {
    counts.iter().sum()
}

/// Sum of every outcome times its count.
///
/// Sums outside the range of `T` are rerolled with a warning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SumEvaluator;

impl<T: Integral> MultisetEvaluator<T> for SumEvaluator {
    type State = i64;
    type Final = T;

    fn next_state(&self, state: Option<&i64>, outcome: &T, counts: &[i64]) -> Transition<i64> {
        Transition::Next(state.copied().unwrap_or(0) + outcome.to_i64() * total(counts))
    }

    fn final_outcome(&self, state: Option<&i64>) -> FinalOutcome<T> {
        let sum = state.copied().unwrap_or(0);
        match T::from_i64(sum) {
            Some(sum) => FinalOutcome::Outcome(sum),
            None => {
                tracing::warn!("sum {} does not fit the outcome type; rerolled", sum);
                FinalOutcome::Reroll
            }
        }
    }
}

/// Total count across all outcomes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CountEvaluator;

impl<T: Outcome> MultisetEvaluator<T> for CountEvaluator {
    type State = i64;
    type Final = i64;

    fn next_state(&self, state: Option<&i64>, _outcome: &T, counts: &[i64]) -> Transition<i64> {
        Transition::Next(state.copied().unwrap_or(0) + total(counts))
    }

    fn final_outcome(&self, state: Option<&i64>) -> FinalOutcome<i64> {
        FinalOutcome::Outcome(state.copied().unwrap_or(0))
    }
}

/// Every counted outcome, ascending, repeated by its count.
///
/// Non-positive counts contribute nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SortedEvaluator;

impl<T: Outcome> MultisetEvaluator<T> for SortedEvaluator {
    type State = Vec<T>;
    type Final = Vec<T>;

    fn next_state(&self, state: Option<&Vec<T>>, outcome: &T, counts: &[i64]) -> Transition<Vec<T>> {
        self.next_state_ascending(state, outcome, counts)
    }

    fn next_state_ascending(
        &self,
        state: Option<&Vec<T>>,
        outcome: &T,
        counts: &[i64],
    ) -> Transition<Vec<T>> {
        let mut sorted = state.cloned().unwrap_or_default();
        let repeat = total(counts).max(0) as usize;
        sorted.extend(core::iter::repeat_n(outcome.clone(), repeat));
        Transition::Next(sorted)
    }

    fn next_state_descending(
        &self,
        state: Option<&Vec<T>>,
        outcome: &T,
        counts: &[i64],
    ) -> Transition<Vec<T>> {
        let repeat = total(counts).max(0) as usize;
        let mut sorted: Vec<T> = core::iter::repeat_n(outcome.clone(), repeat).collect();
        if let Some(state) = state {
            sorted.extend_from_slice(state);
        }
        Transition::Next(sorted)
    }

    fn final_outcome(&self, state: Option<&Vec<T>>) -> FinalOutcome<Vec<T>> {
        FinalOutcome::Outcome(state.cloned().unwrap_or_default())
    }
}

/// Size and outcome of the largest group of matching dice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LargestMatchingSet;

impl<T: Outcome> MultisetEvaluator<T> for LargestMatchingSet {
    type State = (i64, T);
    type Final = (i64, T);

    fn next_state(
        &self,
        state: Option<&(i64, T)>,
        outcome: &T,
        counts: &[i64],
    ) -> Transition<(i64, T)> {
        let candidate = (total(counts), outcome.clone());
        match state {
            Some(best) if *best >= candidate => Transition::Next(best.clone()),
            _ => Transition::Next(candidate),
        }
    }

    fn final_outcome(&self, state: Option<&(i64, T)>) -> FinalOutcome<(i64, T)> {
        match state {
            Some(best) => FinalOutcome::Outcome(best.clone()),
            None => FinalOutcome::Reroll,
        }
    }
}

/// Running state of [`LargestStraight`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StraightState<T> {
    /// Length of the run ending at the last visited outcome.
    pub run: i64,
    /// Longest run so far and its top outcome.
    pub best: Option<(i64, T)>,
}

/// Length and top outcome of the longest run of consecutive integers.
///
/// Visits every integer between the lowest and highest outcome so gaps break
/// runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LargestStraight;

impl<T: Integral> MultisetEvaluator<T> for LargestStraight {
    type State = StraightState<T>;
    type Final = (i64, T);

    fn next_state(
        &self,
        state: Option<&StraightState<T>>,
        outcome: &T,
        counts: &[i64],
    ) -> Transition<StraightState<T>> {
        let (run, best) = match state {
            Some(state) => (state.run, state.best),
            None => (0, None),
        };
        if total(counts) <= 0 {
            return Transition::Next(StraightState { run: 0, best });
        }
        let run = run + 1;
        let candidate = (run, *outcome);
        let best = match best {
            Some(best) if best > candidate => best,
            _ => candidate,
        };
        Transition::Next(StraightState {
            run,
            best: Some(best),
        })
    }

    fn final_outcome(&self, state: Option<&StraightState<T>>) -> FinalOutcome<(i64, T)> {
        match state.and_then(|state| state.best) {
            Some(best) => FinalOutcome::Outcome(best),
            None => FinalOutcome::Reroll,
        }
    }

    fn extra_outcomes(&self, outcomes: &[T]) -> Vec<T> {
        match (outcomes.first(), outcomes.last()) {
            (Some(low), Some(high)) => (low.to_i64()..=high.to_i64()).filter_map(T::from_i64).collect(),
            _ => Vec::new(),
        }
    }

    fn order(&self) -> Order {
        Order::Ascending
    }
}
