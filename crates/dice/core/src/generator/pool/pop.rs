//! The pool pop algorithm.
//!
//! Popping outcome `x` from one end of a pool: every die kind whose extreme is
//! `x` splits into `h` dice that rolled exactly `x` and `m - h` that rolled
//! past it, with weight `C(m, h) * w_x^h` where `w_x` is the weight of `x` on
//! one die. The `m - h` misses stay in the remaining pool as the die with `x`
//! removed, so their weight is carried by that pool's denominator. Kinds whose
//! extreme differs all miss with weight 1. Kinds combine by cartesian product,
//! summing hits and multiplying weights.
//!
//! The `h` dice that hit occupy the `h` ranks at the popped end, so the
//! reported count is the sum of those roll counts and the remaining pool keeps
//! the rest of the tuple. When none of the remaining ranks count, the
//! remaining pool's denominator is folded into the branch weight and the
//! branch continues with an empty pool. Either way, summing each branch weight
//! times the denominator of its remaining pool gives the denominator of the
//! pool that was popped.

use num::One;
use rustc_hash::FxHashMap;

use super::Pool;
use crate::die::Die;
use crate::generator::{MultisetGenerator, PopBranch, PopOrder};
use crate::outcome::Outcome;
use crate::weight::{Weight, binomial, power};

/// Partial cartesian product: surviving dice, total hits so far, weight.
struct Partial<T> {
    dice: Vec<(Die<T>, u32)>,
    hits: u32,
    weight: Weight,
}

pub(super) fn generate<T: Outcome>(
    pool: &Pool<T>,
    order: PopOrder,
    outcome: &T,
) -> Vec<PopBranch<Pool<T>>> {
    if !pool.is_resolvable() {
        return Vec::new();
    }
    if pool.dice().is_empty() {
        return vec![PopBranch::unchanged(pool.clone(), 1)];
    }

    let mut partials = vec![Partial {
        dice: Vec::with_capacity(pool.dice().len()),
        hits: 0,
        weight: Weight::one(),
    }];

    for (die, multiplicity) in pool.dice() {
        let split = die
            .extreme(order)
            .filter(|extreme| *extreme == outcome)
            .and_then(|_| die.split(order));

        let Some((rest, single)) = split else {
            for partial in &mut partials {
                partial.dice.push((die.clone(), *multiplicity));
            }
            continue;
        };

        let hit_weights = hit_distribution(*multiplicity, &single, rest.is_empty());
        let mut expanded = Vec::with_capacity(partials.len() * hit_weights.len());
        for partial in &partials {
            for (hits, weight) in &hit_weights {
                let mut dice = partial.dice.clone();
                let misses = multiplicity - hits;
                if misses > 0 {
                    dice.push((rest.clone(), misses));
                }
                expanded.push(Partial {
                    dice,
                    hits: partial.hits + hits,
                    weight: &partial.weight * weight,
                });
            }
        }
        partials = expanded;
    }

    let counts = pool.sorted_roll_counts();
    let mut merged: FxHashMap<(Pool<T>, i64), usize> = FxHashMap::default();
    let mut branches: Vec<PopBranch<Pool<T>>> = Vec::new();

    for partial in partials {
        let hits = partial.hits as usize;
        let (popped, remaining) = match order {
            PopOrder::Min => {
                let (popped, remaining) = counts.split_at(hits);
                (popped, remaining)
            }
            PopOrder::Max => {
                let (remaining, popped) = counts.split_at(counts.len() - hits);
                (popped, remaining)
            }
        };
        let count: i64 = popped.iter().sum();

        let (next, weight) = if !remaining.is_empty() && remaining.iter().all(|c| *c == 0) {
            // Nothing left counts: fold the remaining dice into the weight.
            let folded = dice_denominator(&partial.dice);
            (Pool::empty(), partial.weight * folded)
        } else {
            (
                Pool::from_parts(canonical_dice(partial.dice), remaining.to_vec()),
                partial.weight,
            )
        };

        match merged.get(&(next.clone(), count)) {
            Some(&idx) => branches[idx].weight += weight,
            None => {
                merged.insert((next.clone(), count), branches.len());
                branches.push(PopBranch::new(next, vec![count], weight));
            }
        }
    }

    branches
}

/// Weight of each possible hit count `h` in `0..=m`. A die with a single
/// outcome left cannot miss.
fn hit_distribution(multiplicity: u32, single: &Weight, exhausted: bool) -> Vec<(u32, Weight)> {
    if exhausted {
        return vec![(multiplicity, power(single, multiplicity))];
    }
    (0..=multiplicity)
        .map(|hits| (hits, binomial(multiplicity, hits) * power(single, hits)))
        .collect()
}

pub(super) fn dice_denominator<T: Outcome>(dice: &[(Die<T>, u32)]) -> Weight {
    dice.iter()
        .fold(Weight::one(), |acc, (die, m)| acc * power(die.denominator(), *m))
}

/// Sorts dice and merges equal kinds.
pub(super) fn canonical_dice<T: Outcome>(dice: Vec<(Die<T>, u32)>) -> Vec<(Die<T>, u32)> {
    let mut dice = dice;
    dice.sort_by(|a, b| a.0.cmp(&b.0));
    let mut merged: Vec<(Die<T>, u32)> = Vec::with_capacity(dice.len());
    for (die, multiplicity) in dice {
        if multiplicity == 0 {
            continue;
        }
        match merged.last_mut() {
            Some((last, m)) if *last == die => *m += multiplicity,
            _ => merged.push((die, multiplicity)),
        }
    }
    merged
}
