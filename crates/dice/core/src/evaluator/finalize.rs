use rustc_hash::FxHashMap;

use super::{FinalOutcome, MultisetEvaluator};
use crate::die::Die;
use crate::outcome::Outcome;
use crate::weight::Weight;

/// Turns the final state distribution into a die.
///
/// Plain outcomes keep their weights. Die-valued outcomes are mixed in
/// through [`Die::mix`], which rescales every branch to a common
/// denominator. Rerolled states are dropped without renormalizing.
pub(super) fn finalize<T, E>(evaluator: &E, states: &FxHashMap<Option<E::State>, Weight>) -> Die<E::Final>
where
    T: Outcome,
    E: MultisetEvaluator<T>,
{
    let mut plain: Vec<(E::Final, Weight)> = Vec::with_capacity(states.len());
    let mut nested: Vec<(Die<E::Final>, Weight)> = Vec::new();
    let mut rerolled = 0usize;

    for (state, weight) in states {
        match evaluator.final_outcome(state.as_ref()) {
            FinalOutcome::Outcome(outcome) => plain.push((outcome, weight.clone())),
            FinalOutcome::Die(die) => nested.push((die, weight.clone())),
            FinalOutcome::Reroll => rerolled += 1,
        }
    }

    if rerolled > 0 {
        tracing::trace!("{} final states rerolled", rerolled);
    }

    if nested.is_empty() {
        return Die::new(plain);
    }
    Die::mix(
        plain
            .into_iter()
            .map(|(outcome, weight)| (Die::single(outcome), weight))
            .chain(nested),
    )
}
