//! Outcome bounds shared by dice, generators and evaluators.

use core::fmt::Debug;
use core::hash::Hash;

/// A single roll value.
///
/// Outcomes must be totally ordered (generators pop them from either end) and
/// hashable (they appear in evaluation cache keys). Any type meeting the
/// bounds is an outcome, including tuples and vectors of outcomes.
pub trait Outcome: Clone + Ord + Hash + Debug + 'static {}

impl<T> Outcome for T where T: Clone + Ord + Hash + Debug + 'static {}

/// Integer outcomes that support sums, runs and explosion.
///
/// Arithmetic is carried out in `i64` and converted back. Results that do
/// not fit the narrower type are dropped rather than wrapped; use `i64`
/// outcomes when sums can leave the range of the die's own type.
pub trait Integral: Outcome + Copy {
    fn to_i64(self) -> i64;

    /// `None` when `value` is outside the range of `Self`.
    fn from_i64(value: i64) -> Option<Self>;
}

macro_rules! impl_integral {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Integral for $ty {
                #[inline]
                fn to_i64(self) -> i64 {
                    i64::from(self)
                }

                #[inline]
                fn from_i64(value: i64) -> Option<Self> {
                    <$ty>::try_from(value).ok()
                }
            }
        )+
    };
}

impl_integral!(i8, i16, i32, i64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_types_reject_out_of_range_values() {
        assert_eq!(i8::from_i64(127), Some(127));
        assert_eq!(i8::from_i64(128), None);
        assert_eq!(i16::from_i64(-40_000), None);
        assert_eq!(i64::from_i64(i64::MIN), Some(i64::MIN));
    }
}
