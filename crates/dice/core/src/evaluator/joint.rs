use core::marker::PhantomData;

use super::{FinalOutcome, MultisetEvaluator, Order, Transition};
use crate::die::Die;
use crate::error::DiceResult;
use crate::outcome::Outcome;

/// Two evaluators run in lockstep over the same outcome stream.
///
/// The state is the pair of sub-states and the final outcome is the pair of
/// sub-outcomes. A reroll from either side rerolls the pair.
pub struct JointEvaluator<T, A, B> {
    first: A,
    second: B,
    order: Order,
    _outcome: PhantomData<fn(&T)>,
}

impl<T, A, B> JointEvaluator<T, A, B>
where
    T: Outcome,
    A: MultisetEvaluator<T>,
    B: MultisetEvaluator<T>,
{
    /// Fails if the evaluators need opposite orders.
    pub fn new(first: A, second: B) -> DiceResult<Self> {
        let order = first.order().merge(second.order())?;
        Ok(Self {
            first,
            second,
            order,
            _outcome: PhantomData,
        })
    }

    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }

    fn pair(
        a: Transition<A::State>,
        b: Transition<B::State>,
    ) -> Transition<(Option<A::State>, Option<B::State>)> {
        match (a, b) {
            (Transition::Next(a), Transition::Next(b)) => Transition::Next((Some(a), Some(b))),
            _ => Transition::Reroll,
        }
    }
}

macro_rules! joint_step {
    ($self:ident, $method:ident, $state:ident, $outcome:ident, $counts:ident) => {{
        let (a, b) = match $state {
            Some((a, b)) => (a.as_ref(), b.as_ref()),
            None => (None, None),
        };
        Self::pair(
            $self.first.$method(a, $outcome, $counts),
            $self.second.$method(b, $outcome, $counts),
        )
    }};
}

impl<T, A, B> MultisetEvaluator<T> for JointEvaluator<T, A, B>
where
    T: Outcome,
    A: MultisetEvaluator<T>,
    B: MultisetEvaluator<T>,
{
    type State = (Option<A::State>, Option<B::State>);
    type Final = (A::Final, B::Final);

    fn next_state(
        &self,
        state: Option<&Self::State>,
        outcome: &T,
        counts: &[i64],
    ) -> Transition<Self::State> {
        joint_step!(self, next_state, state, outcome, counts)
    }

    fn next_state_ascending(
        &self,
        state: Option<&Self::State>,
        outcome: &T,
        counts: &[i64],
    ) -> Transition<Self::State> {
        joint_step!(self, next_state_ascending, state, outcome, counts)
    }

    fn next_state_descending(
        &self,
        state: Option<&Self::State>,
        outcome: &T,
        counts: &[i64],
    ) -> Transition<Self::State> {
        joint_step!(self, next_state_descending, state, outcome, counts)
    }

    fn final_outcome(&self, state: Option<&Self::State>) -> FinalOutcome<Self::Final> {
        let (a, b) = match state {
            Some((a, b)) => (a.as_ref(), b.as_ref()),
            None => (None, None),
        };
        match (self.first.final_outcome(a), self.second.final_outcome(b)) {
            (FinalOutcome::Reroll, _) | (_, FinalOutcome::Reroll) => FinalOutcome::Reroll,
            (FinalOutcome::Outcome(a), FinalOutcome::Outcome(b)) => FinalOutcome::Outcome((a, b)),
            (FinalOutcome::Outcome(a), FinalOutcome::Die(b)) => {
                FinalOutcome::Die(Die::single(a).product(&b))
            }
            (FinalOutcome::Die(a), FinalOutcome::Outcome(b)) => {
                FinalOutcome::Die(a.product(&Die::single(b)))
            }
            (FinalOutcome::Die(a), FinalOutcome::Die(b)) => FinalOutcome::Die(a.product(&b)),
        }
    }

    fn extra_outcomes(&self, outcomes: &[T]) -> Vec<T> {
        let mut extra = self.first.extra_outcomes(outcomes);
        extra.extend(self.second.extra_outcomes(outcomes));
        extra.sort();
        extra.dedup();
        extra
    }

    fn order(&self) -> Order {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::die::d;
    use crate::error::DiceError;
    use crate::evaluator::{CountEvaluator, EvaluationEngine, LargestStraight, SumEvaluator};
    use crate::weight::Weight;

    #[test]
    fn sum_and_count_in_lockstep() {
        let joint = JointEvaluator::<i64, _, _>::new(SumEvaluator, CountEvaluator)
            .expect("both evaluators accept any order");
        let mut engine = EvaluationEngine::new(joint);
        let die = engine.evaluate_pool(&d(6).pool(2));
        assert_eq!(die.denominator(), &Weight::from(36u32));
        assert_eq!(die.weight(&(7, 2)), Weight::from(6u32));
        assert!(die.outcomes().all(|(_, count)| *count == 2));
    }

    #[test]
    fn conflicting_orders_fail_at_construction() {
        /// Accepts everything, but only in descending order.
        struct Descending;

        impl MultisetEvaluator<i64> for Descending {
            type State = ();
            type Final = ();

            fn next_state(&self, _: Option<&()>, _: &i64, _: &[i64]) -> Transition<()> {
                Transition::Next(())
            }

            fn final_outcome(&self, _: Option<&()>) -> FinalOutcome<()> {
                FinalOutcome::Outcome(())
            }

            fn order(&self) -> Order {
                Order::Descending
            }
        }

        let result = JointEvaluator::<i64, _, _>::new(LargestStraight, Descending);
        assert!(matches!(
            result,
            Err(DiceError::ConflictingOrder {
                first: Order::Ascending,
                second: Order::Descending
            })
        ));
    }
}
