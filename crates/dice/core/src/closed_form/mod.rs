//! Direct algorithms for pools of identical dice.
//!
//! These compute the same distributions as the general engine with the
//! standard evaluators, for the common case of `n` copies of one die. They
//! walk the die's outcomes once, tracking how many dice have been placed so
//! far, and skip the generator and cache machinery entirely.

mod best_run;
mod best_set;
mod keep;

use core::hash::Hash;

use num::One;
use rustc_hash::FxHashMap;

use crate::die::Die;
use crate::generator::PopOrder;
use crate::outcome::Outcome;
use crate::weight::{Weight, binomial, power};

pub use best_run::best_run;
pub use best_set::best_set;
pub use keep::{keep_highest, keep_lowest};

/// Distributes `n` copies of `die` over `visits`, from the `order` end.
///
/// `visits` must list every outcome of the die in pop order; outcomes the die
/// lacks are visited with zero hits. `step` receives the state, the number of
/// dice placed before this outcome, the outcome and the number of dice that
/// rolled it. A state is finished once every die is placed or `settled`
/// returns true, at which point the unplaced dice are folded into its weight.
fn walk<T, S>(
    die: &Die<T>,
    n: u32,
    order: PopOrder,
    visits: impl IntoIterator<Item = T>,
    initial: S,
    step: impl Fn(&S, u32, &T, u32) -> S,
    settled: impl Fn(&S, u32) -> bool,
) -> FxHashMap<S, Weight>
where
    T: Outcome,
    S: Clone + Eq + Hash,
{
    let mut states: FxHashMap<(u32, S), Weight> = FxHashMap::default();
    states.insert((0, initial), Weight::one());
    let mut finished: FxHashMap<S, Weight> = FxHashMap::default();
    let mut current = die.clone();
    let mut visits = visits.into_iter();

    loop {
        let denominator = current.denominator().clone();
        states.retain(|(placed, state), weight| {
            if *placed < n && !settled(state, *placed) {
                return true;
            }
            *finished.entry(state.clone()).or_default() +=
                &*weight * power(&denominator, n - placed);
            false
        });
        if states.is_empty() {
            break;
        }
        let Some(outcome) = visits.next() else {
            break;
        };

        let split = if current.extreme(order) == Some(&outcome) {
            current.split(order)
        } else {
            None
        };

        let mut next: FxHashMap<(u32, S), Weight> = FxHashMap::default();
        for ((placed, state), weight) in states {
            let Some((rest, single)) = &split else {
                *next.entry((placed, step(&state, placed, &outcome, 0))).or_default() += weight;
                continue;
            };
            let left = n - placed;
            let hit_range = if rest.is_empty() { left..=left } else { 0..=left };
            for hits in hit_range {
                let branch = &weight * binomial(left, hits) * power(single, hits);
                let state = step(&state, placed, &outcome, hits);
                *next.entry((placed + hits, state)).or_default() += branch;
            }
        }
        states = next;
        if let Some((rest, _)) = split {
            current = rest;
        }
    }

    finished
}
