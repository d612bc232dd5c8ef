//! Multiset evaluators.
//!
//! An evaluator is a state machine folded over the outcomes of one or more
//! generators in monotonic order. At each outcome it receives the previous
//! state and one count per pool, and returns the next state. After the
//! last outcome the state is turned into a final outcome.
//!
//! Evaluators never see individual rolls. The [`EvaluationEngine`] drives the
//! fold over every popped branch at once, merging equal states and caching
//! intermediate results by generator structure.
//!
//! # Modules
//!
//! - `engine`: the backward (memoized) and forward DP algorithms
//! - [`standard`]: sums, counts, sorted tuples, matching sets and straights
//! - `joint`: two evaluators run in lockstep

mod engine;
mod finalize;
mod joint;
mod select;
pub mod standard;

use core::fmt::Debug;
use core::hash::Hash;

use crate::die::Die;
use crate::error::{DiceError, DiceResult};
use crate::generator::PopOrder;
use crate::outcome::Outcome;

pub use engine::EvaluationEngine;
pub use joint::JointEvaluator;
pub use select::Plan;
pub use standard::{
    CountEvaluator, LargestMatchingSet, LargestStraight, SortedEvaluator, StraightState,
    SumEvaluator,
};

/// Order in which an evaluator needs to see outcomes.
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
pub enum Order {
    Ascending,
    Descending,
    /// The evaluator produces the same result in either order.
    #[default]
    Any,
}

impl Order {
    /// Combines the requirements of two evaluators that share an outcome
    /// stream.
    pub fn merge(self, other: Self) -> DiceResult<Self> {
        match (self, other) {
            (Self::Any, order) | (order, Self::Any) => Ok(order),
            (a, b) if a == b => Ok(a),
            (first, second) => Err(DiceError::ConflictingOrder { first, second }),
        }
    }

    /// Order in which outcomes are visited when popping from `order` and
    /// applying transitions in pop order.
    pub const fn visited_by(order: PopOrder) -> Self {
        match order {
            PopOrder::Min => Self::Ascending,
            PopOrder::Max => Self::Descending,
        }
    }

    /// End of the outcome range visited first, `None` for [`Order::Any`].
    pub const fn first_end(self) -> Option<PopOrder> {
        match self {
            Self::Ascending => Some(PopOrder::Min),
            Self::Descending => Some(PopOrder::Max),
            Self::Any => None,
        }
    }
}

/// Evaluation strategy.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Algorithm {
    /// Recursive and memoized across calls. States see outcomes in the
    /// reverse of the pop order.
    Backward,
    /// Iterative with a per-call frontier. States see outcomes in pop order.
    Forward,
}

impl Algorithm {
    /// Order in which states see outcomes when popping from `pop_order`.
    pub const fn visit_order(self, pop_order: PopOrder) -> Order {
        match self {
            Self::Backward => Order::visited_by(pop_order.reverse()),
            Self::Forward => Order::visited_by(pop_order),
        }
    }

    /// Pop direction under which this algorithm visits outcomes in `order`.
    pub const fn pop_order_for(self, visit_first: PopOrder) -> PopOrder {
        match self {
            Self::Backward => visit_first.reverse(),
            Self::Forward => visit_first,
        }
    }
}

/// Result of one evaluator step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition<S> {
    Next(S),
    /// Drops the branch and its weight.
    Reroll,
}

impl<S> From<S> for Transition<S> {
    fn from(state: S) -> Self {
        Self::Next(state)
    }
}

/// What a final state turns into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FinalOutcome<U: Outcome> {
    Outcome(U),
    /// Mixed into the result with its own weights.
    Die(Die<U>),
    /// Drops the branch and its weight.
    Reroll,
}

/// A state machine folded over outcomes in monotonic order.
///
/// `state` is `None` before the first outcome. `counts` holds one entry per
/// pool, in generator order, and may be zero or negative. Alignments
/// contribute no entry.
///
/// # Example
///
/// ```
/// use dice_core::{d, EvaluationEngine, FinalOutcome, MultisetEvaluator, Transition, Weight};
///
/// /// Number of dice that rolled at least `target`.
/// struct Successes {
///     target: i64,
/// }
///
/// impl MultisetEvaluator<i64> for Successes {
///     type State = i64;
///     type Final = i64;
///
///     fn next_state(&self, state: Option<&i64>, outcome: &i64, counts: &[i64]) -> Transition<i64> {
///         let hits: i64 = if *outcome >= self.target { counts.iter().sum() } else { 0 };
///         Transition::Next(state.copied().unwrap_or(0) + hits)
///     }
///
///     fn final_outcome(&self, state: Option<&i64>) -> FinalOutcome<i64> {
///         FinalOutcome::Outcome(state.copied().unwrap_or(0))
///     }
/// }
///
/// let mut engine = EvaluationEngine::new(Successes { target: 5 });
/// let successes = engine.evaluate_pool(&d(6).pool(3));
/// assert_eq!(successes.weight(&3), Weight::from(8u32));
/// ```
pub trait MultisetEvaluator<T: Outcome> {
    type State: Clone + Eq + Hash + Debug;
    type Final: Outcome;

    fn next_state(
        &self,
        state: Option<&Self::State>,
        outcome: &T,
        counts: &[i64],
    ) -> Transition<Self::State>;

    /// Transition used when outcomes are visited in ascending order.
    fn next_state_ascending(
        &self,
        state: Option<&Self::State>,
        outcome: &T,
        counts: &[i64],
    ) -> Transition<Self::State> {
        self.next_state(state, outcome, counts)
    }

    /// Transition used when outcomes are visited in descending order.
    fn next_state_descending(
        &self,
        state: Option<&Self::State>,
        outcome: &T,
        counts: &[i64],
    ) -> Transition<Self::State> {
        self.next_state(state, outcome, counts)
    }

    fn final_outcome(&self, state: Option<&Self::State>) -> FinalOutcome<Self::Final>;

    /// Outcomes to visit in addition to those the generators can produce.
    /// Receives the generators' outcomes, ascending.
    fn extra_outcomes(&self, outcomes: &[T]) -> Vec<T> {
        let _ = outcomes;
        Vec::new()
    }

    fn order(&self) -> Order {
        Order::Any
    }

    /// Transition for a known visitation order.
    fn step(
        &self,
        visit: Order,
        state: Option<&Self::State>,
        outcome: &T,
        counts: &[i64],
    ) -> Transition<Self::State> {
        match visit {
            Order::Ascending => self.next_state_ascending(state, outcome, counts),
            Order::Descending => self.next_state_descending(state, outcome, counts),
            Order::Any => self.next_state(state, outcome, counts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_merge() {
        assert_eq!(Order::Any.merge(Order::Ascending), Ok(Order::Ascending));
        assert_eq!(Order::Descending.merge(Order::Any), Ok(Order::Descending));
        assert_eq!(Order::Any.merge(Order::Any), Ok(Order::Any));
        assert_eq!(
            Order::Ascending.merge(Order::Descending),
            Err(DiceError::ConflictingOrder {
                first: Order::Ascending,
                second: Order::Descending
            })
        );
    }

    #[test]
    fn algorithm_visit_order() {
        assert_eq!(
            Algorithm::Backward.visit_order(PopOrder::Max),
            Order::Ascending
        );
        assert_eq!(Algorithm::Forward.visit_order(PopOrder::Max), Order::Descending);
        assert_eq!(
            Algorithm::Backward.pop_order_for(PopOrder::Min),
            PopOrder::Max
        );
        assert_eq!(Algorithm::Forward.pop_order_for(PopOrder::Min), PopOrder::Min);
    }

    #[test]
    fn enums_parse_from_snake_case() {
        assert_eq!("descending".parse::<Order>(), Ok(Order::Descending));
        assert_eq!("FORWARD".parse::<Algorithm>(), Ok(Algorithm::Forward));
        assert_eq!(PopOrder::Max.to_string(), "max");
    }

    #[test]
    fn final_outcomes_compare_structurally() {
        use crate::die::d;

        assert_eq!(
            FinalOutcome::Die(d(2)),
            FinalOutcome::Die(Die::uniform([2, 1]))
        );
        assert_ne!(FinalOutcome::Die(Die::single(1)), FinalOutcome::Outcome(1));
        assert_ne!(FinalOutcome::<i64>::Reroll, FinalOutcome::Outcome(0));
    }
}
