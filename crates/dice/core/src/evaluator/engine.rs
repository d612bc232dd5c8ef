//! The evaluation engine.
//!
//! Both algorithms walk the same tree. A node is the remaining alignment plus
//! the remaining generators; popping the node's extreme outcome from every
//! generator gives the cartesian product of their branches, each leading to a
//! child node with the combined counts and the product of the weights.
//!
//! - **Backward** computes `F(node) = {state: weight}` bottom-up over an
//!   explicit work stack: the child distributions are computed first and the
//!   popped outcome is applied on top, so states see outcomes in the reverse
//!   of the pop order. `F` depends
//!   only on the pop direction and the node, so results are kept across calls
//!   and structurally equal nodes share one entry.
//! - **Forward** starts from `{None: 1}` at the root and pushes a frontier of
//!   nodes towards the leaves, so states see outcomes in pop order. The
//!   frontier is rebuilt on every call.
//!
//! A node only visits the outcomes its own generators still hold. When a
//! forward step pops an outcome some frontier nodes no longer have, those
//! nodes carry over untouched, which keeps both algorithms visiting the same
//! outcome sequences.

use std::sync::Arc;

use num::One;
use rustc_hash::FxHashMap;

use super::finalize::finalize;
use super::select::Plan;
use super::{Algorithm, MultisetEvaluator, Order, Transition};
use crate::config::EvalConfig;
use crate::die::Die;
use crate::generator::{Alignment, Generator, MultisetGenerator, Pool, PopCost, PopOrder};
use crate::outcome::Outcome;
use crate::weight::Weight;

type StateMap<S> = FxHashMap<Option<S>, Weight>;

/// Remaining alignment and generators of one sub-problem.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Node<T: Outcome> {
    alignment: Alignment<T>,
    generators: Vec<Generator<T>>,
}

struct NodeBranch<T: Outcome> {
    node: Node<T>,
    counts: Vec<i64>,
    weight: Weight,
}

/// Work item of the backward pass.
enum Frame<T: Outcome> {
    Expand(Node<T>),
    /// Applies `outcome` on top of the already cached children.
    Combine {
        key: (PopOrder, Node<T>),
        outcome: T,
        branches: Vec<NodeBranch<T>>,
    },
}

impl<T: Outcome> Node<T> {
    fn extreme(&self, order: PopOrder) -> Option<&T> {
        self.generators
            .iter()
            .filter_map(|generator| generator.extreme(order))
            .chain(self.alignment.extreme(order))
            .reduce(|a, b| outer(order, a, b))
    }

    fn pop(&self, order: PopOrder, outcome: &T) -> Vec<NodeBranch<T>> {
        let arity = self.generators.len();
        let mut partials: Vec<NodeBranch<T>> = self
            .alignment
            .generate(order, outcome)
            .into_iter()
            .map(|branch| NodeBranch {
                node: Node {
                    alignment: branch.next,
                    generators: Vec::with_capacity(arity),
                },
                counts: Vec::with_capacity(arity),
                weight: branch.weight,
            })
            .collect();

        for generator in &self.generators {
            let branches = generator.generate(order, outcome);
            let mut expanded = Vec::with_capacity(partials.len() * branches.len());
            for partial in &partials {
                for branch in &branches {
                    let mut node = partial.node.clone();
                    node.generators.push(branch.next.clone());
                    let mut counts = partial.counts.clone();
                    counts.extend_from_slice(&branch.counts);
                    expanded.push(NodeBranch {
                        node,
                        counts,
                        weight: &partial.weight * &branch.weight,
                    });
                }
            }
            partials = expanded;
        }
        partials
    }
}

/// The extreme of `a` and `b` on the `order` end.
fn outer<'a, T: Ord>(order: PopOrder, a: &'a T, b: &'a T) -> &'a T {
    match order {
        PopOrder::Min => a.min(b),
        PopOrder::Max => a.max(b),
    }
}

fn merge_into<S: Clone + Eq + core::hash::Hash>(target: &mut StateMap<S>, source: StateMap<S>) {
    if target.is_empty() {
        *target = source;
        return;
    }
    for (state, weight) in source {
        *target.entry(state).or_default() += weight;
    }
}

/// Runs an evaluator over generators and keeps its backward cache.
///
/// Reuse one engine for repeated evaluations: the cache is keyed by
/// generator structure, so pools built independently but equal in value hit
/// the same entries.
pub struct EvaluationEngine<T: Outcome, E: MultisetEvaluator<T>> {
    evaluator: E,
    config: EvalConfig,
    cache: FxHashMap<(PopOrder, Node<T>), Arc<StateMap<E::State>>>,
}

impl<T: Outcome, E: MultisetEvaluator<T>> EvaluationEngine<T, E> {
    pub fn new(evaluator: E) -> Self {
        Self::with_config(evaluator, EvalConfig::default())
    }

    pub fn with_config(evaluator: E, config: EvalConfig) -> Self {
        Self {
            evaluator,
            config,
            cache: FxHashMap::default(),
        }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Replaces the config. Cached results stay valid.
    pub fn set_config(&mut self, config: EvalConfig) {
        self.config = config;
    }

    /// Number of cached backward sub-problems.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Evaluates a single pool.
    pub fn evaluate_pool(&mut self, pool: &Pool<T>) -> Die<E::Final> {
        self.evaluate(&[Generator::Pool(pool.clone())])
    }

    /// Evaluates the generators jointly.
    ///
    /// Each outcome step receives the counts of every generator in slice
    /// order, one per pool. An [`Alignment`] has arity zero: it only adds
    /// outcomes to visit and contributes no entry to `counts`.
    ///
    /// Returns an empty die if any generator is unresolvable.
    pub fn evaluate(&mut self, generators: &[Generator<T>]) -> Die<E::Final> {
        if let Some(generator) = generators.iter().find(|g| !g.is_resolvable()) {
            tracing::debug!("unresolvable generator {:?}; result is empty", generator);
            return Die::empty();
        }

        let mut outcomes: Vec<T> = generators.iter().flat_map(|g| g.outcomes()).collect();
        outcomes.sort();
        outcomes.dedup();
        let alignment = Alignment::new(self.evaluator.extra_outcomes(&outcomes));

        let cost: PopCost = generators.iter().map(|g| g.estimate_pop_cost()).sum();
        let plan = Plan::select(self.evaluator.order(), cost, &self.config);
        tracing::debug!(
            "evaluating {} generators over {} outcomes: {:?} pop from {} (cost {:?})",
            generators.len(),
            outcomes.len().max(alignment.len()),
            plan.algorithm,
            plan.pop_order,
            cost
        );

        let root = Node {
            alignment,
            generators: generators.to_vec(),
        };
        let die = match plan.algorithm {
            Algorithm::Backward => {
                let states = self.backward(plan.pop_order, &root);
                finalize::<T, E>(&self.evaluator, &states)
            }
            Algorithm::Forward => {
                let states = self.forward(plan.pop_order, root);
                finalize::<T, E>(&self.evaluator, &states)
            }
        };
        tracing::debug!(
            "evaluation produced {} outcomes; cache holds {} entries",
            die.len(),
            self.cache.len()
        );
        die
    }

    /// Fills the cache bottom-up from `root` with an explicit work stack, so
    /// dice with many outcomes do not deepen the call stack.
    fn backward(&mut self, order: PopOrder, root: &Node<T>) -> Arc<StateMap<E::State>> {
        let visit = Algorithm::Backward.visit_order(order);
        let mut stack = vec![Frame::Expand(root.clone())];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Expand(node) => {
                    let key = (order, node);
                    if let Some(hit) = self.cache.get(&key) {
                        tracing::trace!("cache hit: {} states", hit.len());
                        continue;
                    }
                    let Some(outcome) = key.1.extreme(order).cloned() else {
                        let leaf = StateMap::from_iter([(None, Weight::one())]);
                        self.cache.insert(key, Arc::new(leaf));
                        continue;
                    };
                    let branches = key.1.pop(order, &outcome);
                    let pending: Vec<Node<T>> = branches
                        .iter()
                        .filter(|branch| !self.cache.contains_key(&(order, branch.node.clone())))
                        .map(|branch| branch.node.clone())
                        .collect();
                    stack.push(Frame::Combine {
                        key,
                        outcome,
                        branches,
                    });
                    stack.extend(pending.into_iter().map(Frame::Expand));
                }
                Frame::Combine {
                    key,
                    outcome,
                    branches,
                } => {
                    let mut result = StateMap::default();
                    for branch in branches {
                        // Children are always resolved before their parent.
                        let Some(child) = self.cache.get(&(order, branch.node)).cloned() else {
                            continue;
                        };
                        for (state, weight) in child.iter() {
                            let step =
                                self.evaluator
                                    .step(visit, state.as_ref(), &outcome, &branch.counts);
                            if let Transition::Next(next) = step {
                                *result.entry(Some(next)).or_default() += weight * &branch.weight;
                            }
                        }
                    }
                    tracing::trace!("cache miss: computed {} states", result.len());
                    self.cache.insert(key, Arc::new(result));
                }
            }
        }

        self.cache
            .get(&(order, root.clone()))
            .cloned()
            .unwrap_or_default()
    }

    fn forward(&self, order: PopOrder, root: Node<T>) -> StateMap<E::State> {
        let visit: Order = Algorithm::Forward.visit_order(order);
        let mut finished: StateMap<E::State> = StateMap::default();
        let mut frontier: FxHashMap<Node<T>, StateMap<E::State>> = FxHashMap::default();
        frontier.insert(root, StateMap::from_iter([(None, Weight::one())]));

        loop {
            let mut active: FxHashMap<Node<T>, StateMap<E::State>> = FxHashMap::default();
            for (node, states) in frontier {
                if node.extreme(order).is_none() {
                    merge_into(&mut finished, states);
                } else {
                    active.insert(node, states);
                }
            }

            let Some(outcome) = active
                .keys()
                .filter_map(|node| node.extreme(order))
                .reduce(|a, b| outer(order, a, b))
                .cloned()
            else {
                break;
            };
            tracing::trace!("forward step at {:?}: {} frontier nodes", outcome, active.len());

            let mut next: FxHashMap<Node<T>, StateMap<E::State>> = FxHashMap::default();
            for (node, states) in active {
                if node.extreme(order) != Some(&outcome) {
                    merge_into(next.entry(node).or_default(), states);
                    continue;
                }
                for branch in node.pop(order, &outcome) {
                    let target = next.entry(branch.node).or_default();
                    for (state, weight) in &states {
                        let step =
                            self.evaluator
                                .step(visit, state.as_ref(), &outcome, &branch.counts);
                        if let Transition::Next(next_state) = step {
                            *target.entry(Some(next_state)).or_default() += weight * &branch.weight;
                        }
                    }
                }
            }
            frontier = next;
        }

        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::die::d;
    use crate::evaluator::{FinalOutcome, SumEvaluator};

    fn w(value: u32) -> Weight {
        Weight::from(value)
    }

    /// Sum, except that any die rolling a one rerolls the whole roll.
    struct NoOnes;

    impl MultisetEvaluator<i64> for NoOnes {
        type State = i64;
        type Final = i64;

        fn next_state(&self, state: Option<&i64>, outcome: &i64, counts: &[i64]) -> Transition<i64> {
            let count: i64 = counts.iter().sum();
            if *outcome == 1 && count > 0 {
                return Transition::Reroll;
            }
            Transition::Next(state.copied().unwrap_or(0) + outcome * count)
        }

        fn final_outcome(&self, state: Option<&i64>) -> FinalOutcome<i64> {
            FinalOutcome::Outcome(state.copied().unwrap_or(0))
        }
    }

    #[test]
    fn two_d6_sum() {
        let mut engine = EvaluationEngine::new(SumEvaluator);
        let sum = engine.evaluate_pool(&d(6).pool(2));
        assert_eq!(sum.denominator(), &w(36));
        assert_eq!(sum.weight(&7), w(6));
        assert_eq!(sum.weight(&2), w(1));
        assert_eq!(sum.weight(&12), w(1));
    }

    #[test]
    fn reroll_shrinks_denominator() {
        let mut engine = EvaluationEngine::new(NoOnes);
        let die = engine.evaluate_pool(&d(6).pool(1));
        assert_eq!(die.outcomes().copied().collect::<Vec<_>>(), vec![2, 3, 4, 5, 6]);
        assert!(die.weights().all(|weight| *weight == w(1)));
        assert_eq!(die.denominator(), &w(5));
    }

    #[test]
    fn forward_matches_backward() {
        let pool = Pool::new([d(4), d(6), d(8)]).highest(2, 0);
        let mut backward = EvaluationEngine::with_config(
            SumEvaluator,
            EvalConfig::new().with_algorithm(Algorithm::Backward),
        );
        let mut forward = EvaluationEngine::with_config(
            SumEvaluator,
            EvalConfig::new().with_algorithm(Algorithm::Forward),
        );
        assert_eq!(backward.evaluate_pool(&pool), forward.evaluate_pool(&pool));
        assert_eq!(forward.cache_len(), 0);
    }

    #[test]
    fn cache_is_shared_by_equal_pools() {
        let mut engine = EvaluationEngine::new(SumEvaluator);
        let first = engine.evaluate_pool(&d(6).pool(3));
        let filled = engine.cache_len();
        assert!(filled > 0);

        let rebuilt = Pool::new([d(6), Die::uniform(1..=6), d(6)]);
        let second = engine.evaluate_pool(&rebuilt);
        assert_eq!(first, second);
        assert_eq!(engine.cache_len(), filled);

        engine.clear_cache();
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn unresolvable_pool_evaluates_to_empty() {
        let mut engine = EvaluationEngine::new(SumEvaluator);
        let die = engine.evaluate_pool(&Pool::new([d(6), Die::empty()]));
        assert!(die.is_empty());
    }

    #[test]
    fn alignments_add_visits_but_no_counts() {
        /// Whether the aligned outcome was visited, and the widest `counts`.
        struct Widths;

        impl MultisetEvaluator<i64> for Widths {
            type State = (bool, usize);
            type Final = (bool, usize);

            fn next_state(
                &self,
                state: Option<&(bool, usize)>,
                outcome: &i64,
                counts: &[i64],
            ) -> Transition<(bool, usize)> {
                let (seen, width) = state.copied().unwrap_or((false, 0));
                Transition::Next((seen || *outcome == 5, width.max(counts.len())))
            }

            fn final_outcome(&self, state: Option<&(bool, usize)>) -> FinalOutcome<(bool, usize)> {
                FinalOutcome::Outcome(state.copied().unwrap_or((false, 0)))
            }
        }

        let mut engine = EvaluationEngine::new(Widths);
        let die = engine.evaluate(&[
            Generator::Pool(d(2).pool(1)),
            Generator::Alignment(Alignment::new([5])),
        ]);
        assert_eq!(die, Die::new([((true, 1usize), 2u32)]));
    }

    #[test]
    fn backward_handles_dice_with_many_outcomes() {
        let mut engine = EvaluationEngine::with_config(
            SumEvaluator,
            EvalConfig::new().with_algorithm(Algorithm::Backward),
        );
        let die = engine.evaluate_pool(&d(2000).pool(1));
        assert_eq!(die, d(2000));
    }

    #[test]
    fn empty_pool_sums_to_zero() {
        let mut engine = EvaluationEngine::new(SumEvaluator);
        let die = engine.evaluate_pool(&Pool::<i64>::empty());
        assert_eq!(die, Die::single(0));
    }
}
