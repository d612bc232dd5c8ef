use super::walk;
use crate::die::Die;
use crate::generator::PopOrder;
use crate::outcome::Integral;

/// Length and top outcome of the longest run of consecutive integers among
/// `n` rolls of `die`.
///
/// Ties go to the run ending higher. Zero dice give an empty die.
pub fn best_run<T: Integral>(die: &Die<T>, n: u32) -> Die<(i64, T)> {
    let (Some(low), Some(high)) = (die.min_outcome(), die.max_outcome()) else {
        return Die::empty();
    };
    let visits: Vec<T> = (low.to_i64()..=high.to_i64()).filter_map(T::from_i64).collect();

    let runs = walk(
        die,
        n,
        PopOrder::Min,
        visits,
        (0i64, None::<(i64, T)>),
        |(run, best), _, outcome, hits| {
            if hits == 0 {
                return (0, *best);
            }
            let candidate = (run + 1, *outcome);
            match best {
                Some(best) if *best > candidate => (run + 1, Some(*best)),
                _ => (run + 1, Some(candidate)),
            }
        },
        |_, _| false,
    );
    Die::new(
        runs.into_iter()
            .filter_map(|((_, best), weight)| best.map(|best| (best, weight))),
    )
}
