//! Error infrastructure for dice-core.
//!
//! Most of the engine cannot fail: unresolvable generators evaluate to an
//! empty die and rerolled branches are discarded silently. The errors below
//! cover the remaining cases, which are all caller mistakes (popping an empty
//! die, malformed roll counts, an uneven middle split, incompatible evaluator
//! orders).
//!
//! Incomparable outcomes and unhashable evaluator states are excluded by the
//! [`Outcome`](crate::Outcome) and evaluator state bounds, so they have no
//! runtime variant.

use crate::evaluator::Order;

/// Severity level of an error.
///
/// - **Validation**: invalid input, reject without retry
/// - **Internal**: a broken invariant or misuse of a low-level API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    Validation,
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }
}

/// Errors surfaced by dice, pools and evaluator construction.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    #[error("cannot pop from an empty {what}")]
    PopFromEmpty { what: &'static str },

    #[error("roll counts have {actual} entries but the pool holds {expected} dice")]
    RollCountMismatch { expected: usize, actual: usize },

    #[error("roll counts may contain at most one ellipsis")]
    MultipleEllipsis,

    #[error("index {index} is out of range for a pool of {size} dice")]
    IndexOutOfRange { index: isize, size: usize },

    #[error("cannot keep the middle {keep} of {size} dice without a tie rule")]
    UnevenMiddle { size: usize, keep: usize },

    #[error("conflicting mandatory orders: {first} and {second}")]
    ConflictingOrder { first: Order, second: Order },
}

impl DiceError {
    /// Returns the severity level of this error.
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::PopFromEmpty { .. } => ErrorSeverity::Internal,
            Self::RollCountMismatch { .. }
            | Self::MultipleEllipsis
            | Self::IndexOutOfRange { .. }
            | Self::UnevenMiddle { .. }
            | Self::ConflictingOrder { .. } => ErrorSeverity::Validation,
        }
    }

    /// Returns a static identifier for this error variant.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::PopFromEmpty { .. } => "pop_from_empty",
            Self::RollCountMismatch { .. } => "roll_count_mismatch",
            Self::MultipleEllipsis => "multiple_ellipsis",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::UnevenMiddle { .. } => "uneven_middle",
            Self::ConflictingOrder { .. } => "conflicting_order",
        }
    }
}

pub type DiceResult<T> = Result<T, DiceError>;
