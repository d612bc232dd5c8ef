//! Choice of pop direction and algorithm for one evaluation.
//!
//! The backward algorithm keeps its results across calls, so it is used
//! whenever the evaluator allows it. An evaluator with a mandatory order fixes
//! the backward pop direction; if the generators are much cheaper to pop from
//! the other end (by more than `pop_cost_factor`), the forward algorithm takes
//! over and pops from that end instead.

use super::{Algorithm, Order};
use crate::config::EvalConfig;
use crate::generator::{PopCost, PopOrder};

/// Pop direction and algorithm for one evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Plan {
    pub pop_order: PopOrder,
    pub algorithm: Algorithm,
}

impl Plan {
    pub const fn new(pop_order: PopOrder, algorithm: Algorithm) -> Self {
        Self {
            pop_order,
            algorithm,
        }
    }

    /// Order in which the evaluator sees outcomes under this plan.
    pub const fn visit_order(&self) -> Order {
        self.algorithm.visit_order(self.pop_order)
    }

    pub fn select(order: Order, cost: PopCost, config: &EvalConfig) -> Self {
        // Ties pop from the top.
        let preferred = cost.preferred().unwrap_or(PopOrder::Max);

        let Some(visit_first) = order.first_end() else {
            return Self::new(
                config.pop_order.unwrap_or(preferred),
                config.algorithm.unwrap_or(Algorithm::Backward),
            );
        };

        match (config.algorithm, config.pop_order) {
            (Some(algorithm), forced) => {
                let pop_order = algorithm.pop_order_for(visit_first);
                if forced.is_some_and(|forced| forced != pop_order) {
                    tracing::warn!(
                        "forced pop order {:?} contradicts {} evaluation with the {} algorithm; popping from {}",
                        forced,
                        order,
                        algorithm,
                        pop_order
                    );
                }
                Self::new(pop_order, algorithm)
            }
            (None, Some(pop_order)) => {
                let algorithm = if Algorithm::Backward.pop_order_for(visit_first) == pop_order {
                    Algorithm::Backward
                } else {
                    Algorithm::Forward
                };
                Self::new(pop_order, algorithm)
            }
            (None, None) => {
                let backward_pop = Algorithm::Backward.pop_order_for(visit_first);
                let backward_cost = cost.of(backward_pop);
                let forward_cost = cost.of(backward_pop.reverse());
                if backward_cost > forward_cost.saturating_mul(config.pop_cost_factor) {
                    Self::new(backward_pop.reverse(), Algorithm::Forward)
                } else {
                    Self::new(backward_pop, Algorithm::Backward)
                }
            }
        }
    }
}
