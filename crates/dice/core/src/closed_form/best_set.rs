use super::walk;
use crate::die::Die;
use crate::generator::PopOrder;
use crate::outcome::Outcome;

/// Size and outcome of the largest matching set among `n` rolls of `die`.
///
/// Ties go to the higher outcome. Zero dice give an empty die.
pub fn best_set<T: Outcome>(die: &Die<T>, n: u32) -> Die<(i64, T)> {
    let best = walk(
        die,
        n,
        PopOrder::Min,
        die.outcomes().cloned().collect::<Vec<_>>(),
        None::<(i64, T)>,
        |best, _, outcome, hits| {
            let candidate = (i64::from(hits), outcome.clone());
            match best {
                Some(best) if hits == 0 || *best > candidate => Some(best.clone()),
                _ if hits == 0 => None,
                _ => Some(candidate),
            }
        },
        |_, _| false,
    );
    Die::new(
        best.into_iter()
            .filter_map(|(best, weight)| best.map(|best| (best, weight))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::die::d;
    use crate::weight::Weight;

    #[test]
    fn three_d6_sets() {
        let die = best_set(&d(6), 3);
        assert_eq!(die.denominator(), &Weight::from(216u32));
        for outcome in 1..=6i64 {
            assert_eq!(die.weight(&(3, outcome)), Weight::from(1u32));
            // Pair of `outcome` and one other die, in any position.
            assert_eq!(die.weight(&(2, outcome)), Weight::from(15u32));
        }
        // All distinct: 120 rolls, grouped by their highest die.
        assert_eq!(die.weight(&(1, 6)), Weight::from(60u32));
        assert_eq!(die.weight(&(1, 3)), Weight::from(6u32));
    }

    #[test]
    fn no_dice_no_sets() {
        assert!(best_set(&d(6), 0).is_empty());
    }
}
