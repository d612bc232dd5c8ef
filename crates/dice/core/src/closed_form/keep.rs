use super::walk;
use crate::die::Die;
use crate::generator::PopOrder;
use crate::outcome::Integral;

/// Sum of the `keep` highest of `n` rolls of `die`.
pub fn keep_highest<T: Integral>(die: &Die<T>, n: u32, keep: u32) -> Die<T> {
    keep_from(die, n, keep, PopOrder::Max)
}

/// Sum of the `keep` lowest of `n` rolls of `die`.
pub fn keep_lowest<T: Integral>(die: &Die<T>, n: u32, keep: u32) -> Die<T> {
    keep_from(die, n, keep, PopOrder::Min)
}

fn keep_from<T: Integral>(die: &Die<T>, n: u32, keep: u32, order: PopOrder) -> Die<T> {
    let outcomes: Vec<T> = match order {
        PopOrder::Min => die.outcomes().copied().collect(),
        PopOrder::Max => die.iter().rev().map(|(outcome, _)| *outcome).collect(),
    };
    let sums = walk(
        die,
        n,
        order,
        outcomes,
        0i64,
        |sum, placed, outcome, hits| {
            let kept = hits.min(keep.saturating_sub(placed));
            sum + outcome.to_i64() * i64::from(kept)
        },
        // Once the kept ranks are filled the remaining dice do not matter.
        |_, placed| placed >= keep,
    );
    // Sums outside the range of `T` are dropped, matching `SumEvaluator`.
    Die::new(
        sums.into_iter()
            .filter_map(|(sum, weight)| Some((T::from_i64(sum)?, weight))),
    )
}
