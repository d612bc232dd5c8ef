//! Closed-form algorithms against the general engine.

use dice_core::{
    Algorithm, Die, EvalConfig, EvaluationEngine, LargestMatchingSet, LargestStraight,
    best_run, best_set, d, keep_highest, keep_lowest,
};

fn engines<E: Clone>(evaluator: E) -> [EvaluationEngine<i64, E>; 2]
where
    E: dice_core::MultisetEvaluator<i64>,
{
    [Algorithm::Backward, Algorithm::Forward].map(|algorithm| {
        EvaluationEngine::with_config(
            evaluator.clone(),
            EvalConfig::new().with_algorithm(algorithm),
        )
    })
}

#[test]
fn keep_highest_two_of_five() {
    let pool = d(6).pool(5).highest(2, 0);
    assert_eq!(keep_highest(&d(6), 5, 2), pool.sum());
}

#[test]
fn keep_lowest_three_of_four() {
    let pool = d(8).pool(4).lowest(3, 0);
    assert_eq!(keep_lowest(&d(8), 4, 3), pool.sum());
}

#[test]
fn keep_on_irregular_die() {
    let die = Die::new([(-1i64, 1u32), (0, 2), (3, 5)]);
    assert_eq!(keep_highest(&die, 4, 2), die.pool(4).highest(2, 0).sum());
    assert_eq!(keep_lowest(&die, 4, 1), die.pool(4).lowest(1, 0).sum());
}

#[test]
fn best_set_matches_engine() {
    let expected = best_set(&d(6), 4);
    for mut engine in engines(LargestMatchingSet) {
        assert_eq!(engine.evaluate_pool(&d(6).pool(4)), expected);
    }
}

#[test]
fn best_run_matches_engine() {
    let expected = best_run(&d(6), 5);
    assert_eq!(expected.denominator(), &dice_core::Weight::from(7776u32));
    for mut engine in engines(LargestStraight) {
        assert_eq!(engine.evaluate_pool(&d(6).pool(5)), expected);
    }
}

#[test]
fn best_run_with_gaps_matches_engine() {
    let die = Die::uniform([1i64, 2, 4, 5, 6]);
    let expected = best_run(&die, 3);
    for mut engine in engines(LargestStraight) {
        assert_eq!(engine.evaluate_pool(&die.pool(3)), expected);
    }
}

#[test]
fn zero_dice_agree() {
    assert!(best_set(&d(6), 0).is_empty());
    assert!(best_run(&d(6), 0).is_empty());
    assert_eq!(keep_highest(&d(6), 0, 2), Die::single(0));
    assert_eq!(d(6).pool(0).sum(), Die::single(0));
}
