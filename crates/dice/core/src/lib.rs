//! Exact dice-pool probabilities without enumerating rolls.
//!
//! `dice-core` computes distributions as integer-weighted [`Die`] values. A
//! [`Pool`] describes an unordered collection of dice plus which sorted ranks
//! count; a [`MultisetEvaluator`] is a state machine folded over the pool's
//! outcomes by the [`EvaluationEngine`], which pops one outcome at a time and
//! memoizes sub-problems by pool structure. The [`closed_form`] functions
//! cover common identical-dice queries directly.
//!
//! ```
//! use dice_core::{d, keep_highest, Weight};
//!
//! // Highest of 4d6.
//! let pool = d(6).pool(4).highest(1, 0);
//! let highest = pool.sum();
//! assert_eq!(highest.weight(&6), Weight::from(671u32));
//! assert_eq!(highest, keep_highest(&d(6), 4, 1));
//! ```
pub mod closed_form;
pub mod config;
pub mod die;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod outcome;
pub mod weight;

pub use closed_form::{best_run, best_set, keep_highest, keep_lowest};
pub use config::EvalConfig;
pub use die::{Die, d};
pub use error::{DiceError, DiceResult, ErrorSeverity};
pub use evaluator::{
    Algorithm, CountEvaluator, EvaluationEngine, FinalOutcome, JointEvaluator,
    LargestMatchingSet, LargestStraight, MultisetEvaluator, Order, Plan, SortedEvaluator,
    StraightState, SumEvaluator, Transition,
};
pub use generator::pool::resolve_roll_counts;
pub use generator::{
    Alignment, CountItem, Generator, MiddleTie, MultisetGenerator, Pool, PopBranch, PopCost,
    PopOrder, RollCountSpec,
};
pub use outcome::{Integral, Outcome};
pub use weight::Weight;
