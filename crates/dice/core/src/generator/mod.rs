//! Multiset generators.
//!
//! A generator describes an unordered collection of rolled outcomes without
//! enumerating it. Evaluation proceeds by repeatedly *popping* the current
//! extreme outcome: the generator answers with every way the outcome can
//! occur, each as a [`PopBranch`] carrying the smaller generator left behind,
//! the counts reported for the outcome, and the exact weight of that branch.
//! Summed over the branches, weight times the denominator of the generator
//! left behind equals the denominator before the pop.
//!
//! # Generators
//!
//! - [`Pool`]: dice plus per-rank roll counts (keep/drop/difference queries)
//! - [`Alignment`]: no dice, only forces a set of outcomes to be visited
//! - [`Generator`]: closed sum of the two, used for heterogeneous generator
//!   lists and evaluation cache keys

mod alignment;
mod cost;
pub mod pool;

use core::fmt::Debug;
use core::hash::Hash;

use num::One;

use crate::outcome::Outcome;
use crate::weight::Weight;

pub use alignment::Alignment;
pub use cost::PopCost;
pub use pool::{CountItem, MiddleTie, Pool, RollCountSpec};

/// Which end of the outcome range a generator pops from.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PopOrder {
    Min,
    Max,
}

impl PopOrder {
    pub const fn reverse(self) -> Self {
        match self {
            Self::Min => Self::Max,
            Self::Max => Self::Min,
        }
    }
}

/// One way an outcome can be popped from a generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PopBranch<G> {
    /// Generator left after the pop.
    pub next: G,
    /// Counts reported for the popped outcome, one per generator output.
    pub counts: Vec<i64>,
    /// Number of ways the popped part occurs. The rolls still held by `next`
    /// are accounted for by its own denominator.
    pub weight: Weight,
}

impl<G> PopBranch<G> {
    pub fn new(next: G, counts: Vec<i64>, weight: Weight) -> Self {
        Self {
            next,
            counts,
            weight,
        }
    }

    /// Branch that leaves the generator untouched.
    pub(crate) fn unchanged(next: G, arity: usize) -> Self {
        Self::new(next, vec![0; arity], Weight::one())
    }

    pub fn map_next<H>(self, f: impl FnOnce(G) -> H) -> PopBranch<H> {
        PopBranch {
            next: f(self.next),
            counts: self.counts,
            weight: self.weight,
        }
    }
}

/// Common interface of everything an evaluator can consume.
///
/// Generators are immutable values; popping returns new generators. They
/// compare and hash structurally, which is what allows repeated
/// sub-problems to share evaluation cache entries.
pub trait MultisetGenerator<T: Outcome>: Clone + Eq + Hash + Debug {
    /// Number of counts reported per popped outcome.
    fn arity(&self) -> usize;

    /// Every outcome this generator can still produce, ascending.
    fn outcomes(&self) -> Vec<T>;

    fn min_outcome(&self) -> Option<&T>;

    fn max_outcome(&self) -> Option<&T>;

    /// `false` if the generator holds a die with no outcomes. Evaluating an
    /// unresolvable generator yields an empty die.
    fn is_resolvable(&self) -> bool;

    /// Total weight of all rolls this generator represents.
    fn denominator(&self) -> Weight;

    /// Pops `outcome` from the low end. `outcome` must not exceed
    /// [`min_outcome`](Self::min_outcome); a generator that does not hold it
    /// yields one unchanged branch.
    fn generate_min(&self, outcome: &T) -> Vec<PopBranch<Self>>;

    /// Pops `outcome` from the high end. Mirror of
    /// [`generate_min`](Self::generate_min).
    fn generate_max(&self, outcome: &T) -> Vec<PopBranch<Self>>;

    /// Heuristic cost of popping from each end.
    fn estimate_pop_cost(&self) -> PopCost;

    fn extreme(&self, order: PopOrder) -> Option<&T> {
        match order {
            PopOrder::Min => self.min_outcome(),
            PopOrder::Max => self.max_outcome(),
        }
    }

    fn generate(&self, order: PopOrder, outcome: &T) -> Vec<PopBranch<Self>> {
        match order {
            PopOrder::Min => self.generate_min(outcome),
            PopOrder::Max => self.generate_max(outcome),
        }
    }
}

/// Any generator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Generator<T: Outcome> {
    Pool(Pool<T>),
    Alignment(Alignment<T>),
}

macro_rules! dispatch {
    ($self:expr, $g:ident => $body:expr) => {
        match $self {
            Generator::Pool($g) => $body,
            Generator::Alignment($g) => $body,
        }
    };
}

macro_rules! dispatch_generate {
    ($self:expr, $method:ident, $outcome:expr) => {
        match $self {
            Generator::Pool(pool) => pool
                .$method($outcome)
                .into_iter()
                .map(|branch| branch.map_next(Generator::Pool))
                .collect(),
            Generator::Alignment(alignment) => alignment
                .$method($outcome)
                .into_iter()
                .map(|branch| branch.map_next(Generator::Alignment))
                .collect(),
        }
    };
}

impl<T: Outcome> MultisetGenerator<T> for Generator<T> {
    fn arity(&self) -> usize {
        dispatch!(self, g => g.arity())
    }

    fn outcomes(&self) -> Vec<T> {
        dispatch!(self, g => g.outcomes())
    }

    fn min_outcome(&self) -> Option<&T> {
        dispatch!(self, g => g.min_outcome())
    }

    fn max_outcome(&self) -> Option<&T> {
        dispatch!(self, g => g.max_outcome())
    }

    fn is_resolvable(&self) -> bool {
        dispatch!(self, g => g.is_resolvable())
    }

    fn denominator(&self) -> Weight {
        dispatch!(self, g => g.denominator())
    }

    fn generate_min(&self, outcome: &T) -> Vec<PopBranch<Self>> {
        dispatch_generate!(self, generate_min, outcome)
    }

    fn generate_max(&self, outcome: &T) -> Vec<PopBranch<Self>> {
        dispatch_generate!(self, generate_max, outcome)
    }

    fn estimate_pop_cost(&self) -> PopCost {
        dispatch!(self, g => g.estimate_pop_cost())
    }
}

impl<T: Outcome> From<Pool<T>> for Generator<T> {
    fn from(pool: Pool<T>) -> Self {
        Self::Pool(pool)
    }
}

impl<T: Outcome> From<Alignment<T>> for Generator<T> {
    fn from(alignment: Alignment<T>) -> Self {
        Self::Alignment(alignment)
    }
}
