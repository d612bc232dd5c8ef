use crate::evaluator::Algorithm;
use crate::generator::PopOrder;

/// Evaluation tuning parameters.
///
/// None of these change results, only the amount of work done to reach them.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EvalConfig {
    /// For evaluators with a mandatory order, the backward (persistently
    /// cached) algorithm is kept unless the opposite pop direction is cheaper
    /// by more than this factor.
    pub pop_cost_factor: u64,

    /// Forces the pop direction. Evaluators without a mandatory order then
    /// visit outcomes in the order implied by the chosen algorithm.
    pub pop_order: Option<PopOrder>,

    /// Forces the evaluation algorithm.
    pub algorithm: Option<Algorithm>,
}

impl EvalConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_POP_COST_FACTOR: u64 = 2;

    pub fn new() -> Self {
        Self {
            pop_cost_factor: Self::DEFAULT_POP_COST_FACTOR,
            pop_order: None,
            algorithm: None,
        }
    }

    #[must_use]
    pub fn with_pop_cost_factor(mut self, pop_cost_factor: u64) -> Self {
        self.pop_cost_factor = pop_cost_factor;
        self
    }

    #[must_use]
    pub fn with_pop_order(mut self, pop_order: PopOrder) -> Self {
        self.pop_order = Some(pop_order);
        self
    }

    #[must_use]
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let config = EvalConfig::new()
            .with_pop_cost_factor(8)
            .with_pop_order(PopOrder::Min)
            .with_algorithm(Algorithm::Forward);
        assert_eq!(config.pop_cost_factor, 8);
        assert_eq!(config.pop_order, Some(PopOrder::Min));
        assert_eq!(config.algorithm, Some(Algorithm::Forward));
        assert_eq!(
            EvalConfig::default().pop_cost_factor,
            EvalConfig::DEFAULT_POP_COST_FACTOR
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn loads_partial_config_from_json() {
        let config: EvalConfig =
            serde_json::from_str(r#"{ "pop_order": "Max", "algorithm": "Backward" }"#)
                .expect("valid config");
        assert_eq!(config.pop_cost_factor, EvalConfig::DEFAULT_POP_COST_FACTOR);
        assert_eq!(config.pop_order, Some(PopOrder::Max));
        assert_eq!(config.algorithm, Some(Algorithm::Backward));
    }
}
