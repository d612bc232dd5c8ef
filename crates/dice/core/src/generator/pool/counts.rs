//! Roll-count specifications and their resolution against a pool size.
//!
//! A pool's `sorted_roll_counts` holds one entry per die, in ascending order
//! of the rolled value, giving how many times that rank counts towards the
//! aggregate. Specifications resolve to that tuple:
//!
//! - `Index(i)`: only rank `i` counts (negative indices from the top)
//! - `Slice { start, stop }`: ranks in `start..stop` count once
//! - `Counts(items)`: explicit counts with at most one [`CountItem::Ellipsis`]
//!
//! For explicit counts the ellipsis expands to as many zeros as needed. When
//! the fixed entries outnumber the dice, entries on the ellipsis side are
//! dropped. An interior ellipsis resolves each side independently and adds the
//! results, so `[-1, .., 1]` on a single die resolves to `[0]`.

use core::ops::{Range, RangeFrom, RangeFull, RangeTo};

use crate::error::{DiceError, DiceResult};

/// One entry of an explicit roll-count tuple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CountItem {
    Count(i64),
    Ellipsis,
}

impl From<i64> for CountItem {
    fn from(count: i64) -> Self {
        Self::Count(count)
    }
}

/// Which sorted ranks of a pool count, and how many times.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RollCountSpec {
    Index(isize),
    Slice {
        start: Option<isize>,
        stop: Option<isize>,
    },
    Counts(Vec<CountItem>),
}

impl From<isize> for RollCountSpec {
    fn from(index: isize) -> Self {
        Self::Index(index)
    }
}

impl From<Range<isize>> for RollCountSpec {
    fn from(range: Range<isize>) -> Self {
        Self::Slice {
            start: Some(range.start),
            stop: Some(range.end),
        }
    }
}

impl From<RangeFrom<isize>> for RollCountSpec {
    fn from(range: RangeFrom<isize>) -> Self {
        Self::Slice {
            start: Some(range.start),
            stop: None,
        }
    }
}

impl From<RangeTo<isize>> for RollCountSpec {
    fn from(range: RangeTo<isize>) -> Self {
        Self::Slice {
            start: None,
            stop: Some(range.end),
        }
    }
}

impl From<RangeFull> for RollCountSpec {
    fn from(_: RangeFull) -> Self {
        Self::Slice {
            start: None,
            stop: None,
        }
    }
}

impl From<Vec<CountItem>> for RollCountSpec {
    fn from(items: Vec<CountItem>) -> Self {
        Self::Counts(items)
    }
}

/// Builds a [`RollCountSpec::Counts`], with `..` standing for the ellipsis.
///
/// ```
/// use dice_core::{roll_counts, CountItem, RollCountSpec};
///
/// let spec = roll_counts![.., 1, 1];
/// assert_eq!(
///     spec,
///     RollCountSpec::Counts(vec![CountItem::Ellipsis, CountItem::Count(1), CountItem::Count(1)])
/// );
/// ```
#[macro_export]
macro_rules! roll_counts {
    (@acc [$($acc:expr),*]) => {
        $crate::RollCountSpec::Counts(::std::vec![$($acc),*])
    };
    (@acc [$($acc:expr),*] .. $(, $($rest:tt)*)?) => {
        $crate::roll_counts!(@acc [$($acc,)* $crate::CountItem::Ellipsis] $($($rest)*)?)
    };
    (@acc [$($acc:expr),*] $count:expr $(, $($rest:tt)*)?) => {
        $crate::roll_counts!(@acc [$($acc,)* $crate::CountItem::Count($count)] $($($rest)*)?)
    };
    ($($items:tt)*) => {
        $crate::roll_counts!(@acc [] $($items)*)
    };
}

/// Resolves `spec` into one count per die of a pool holding `size` dice.
pub fn resolve(size: usize, spec: &RollCountSpec) -> DiceResult<Vec<i64>> {
    match spec {
        RollCountSpec::Index(index) => {
            let resolved = if *index < 0 {
                size as isize + index
            } else {
                *index
            };
            if resolved < 0 || resolved as usize >= size {
                return Err(DiceError::IndexOutOfRange {
                    index: *index,
                    size,
                });
            }
            let mut counts = vec![0; size];
            counts[resolved as usize] = 1;
            Ok(counts)
        }
        RollCountSpec::Slice { start, stop } => {
            let start = clamp_slice_bound(*start, size, 0);
            let stop = clamp_slice_bound(*stop, size, size);
            Ok((0..size)
                .map(|i| i64::from(i >= start && i < stop))
                .collect())
        }
        RollCountSpec::Counts(items) => resolve_counts(size, items),
    }
}

fn clamp_slice_bound(bound: Option<isize>, size: usize, default: usize) -> usize {
    match bound {
        None => default,
        Some(b) if b < 0 => (size as isize + b).max(0) as usize,
        Some(b) => (b as usize).min(size),
    }
}

fn resolve_counts(size: usize, items: &[CountItem]) -> DiceResult<Vec<i64>> {
    let mut ellipses = items
        .iter()
        .enumerate()
        .filter(|(_, item)| matches!(item, CountItem::Ellipsis))
        .map(|(i, _)| i);
    let split = ellipses.next();
    if ellipses.next().is_some() {
        return Err(DiceError::MultipleEllipsis);
    }

    let fixed = |slice: &[CountItem]| -> Vec<i64> {
        slice
            .iter()
            .filter_map(|item| match item {
                CountItem::Count(c) => Some(*c),
                CountItem::Ellipsis => None,
            })
            .collect()
    };

    let Some(split) = split else {
        let counts = fixed(items);
        if counts.len() != size {
            return Err(DiceError::RollCountMismatch {
                expected: size,
                actual: counts.len(),
            });
        }
        return Ok(counts);
    };

    let left = fixed(&items[..split]);
    let right = fixed(&items[split + 1..]);
    let counts = match (left.is_empty(), right.is_empty()) {
        (true, _) => align_right(size, &right),
        (false, true) => align_left(size, &left),
        (false, false) => align_left(size, &left)
            .into_iter()
            .zip(align_right(size, &right))
            .map(|(a, b)| a + b)
            .collect(),
    };
    Ok(counts)
}

/// `fixed` followed by padding zeros; extra entries are dropped from the end.
fn align_left(size: usize, fixed: &[i64]) -> Vec<i64> {
    let mut counts: Vec<i64> = fixed.iter().take(size).copied().collect();
    counts.resize(size, 0);
    counts
}

/// Padding zeros followed by `fixed`; extra entries are dropped from the start.
fn align_right(size: usize, fixed: &[i64]) -> Vec<i64> {
    let kept = &fixed[fixed.len().saturating_sub(size)..];
    let mut counts = vec![0; size - kept.len()];
    counts.extend_from_slice(kept);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_ellipsis_pads_low_ranks() {
        assert_eq!(resolve(5, &roll_counts![.., 1, 1]), Ok(vec![0, 0, 0, 1, 1]));
    }

    #[test]
    fn interior_ellipsis_sums_sides() {
        assert_eq!(resolve(1, &roll_counts![-1, .., 1]), Ok(vec![0]));
        assert_eq!(resolve(4, &roll_counts![-1, .., 1]), Ok(vec![-1, 0, 0, 1]));
    }

    #[test]
    fn ellipsis_is_noop_at_exact_size() {
        assert_eq!(resolve(3, &roll_counts![1, 2, 3, ..]), Ok(vec![1, 2, 3]));
        assert_eq!(resolve(3, &roll_counts![.., 1, 2, 3]), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn overlong_side_drops_from_ellipsis_side() {
        assert_eq!(resolve(2, &roll_counts![.., 1, 2, 3]), Ok(vec![2, 3]));
        assert_eq!(resolve(2, &roll_counts![1, 2, 3, ..]), Ok(vec![1, 2]));
    }

    #[test]
    fn fixed_tuple_must_match_size() {
        assert_eq!(
            resolve(3, &roll_counts![1, 1]),
            Err(DiceError::RollCountMismatch {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(resolve(2, &roll_counts![1, 1]), Ok(vec![1, 1]));
    }

    #[test]
    fn two_ellipses_rejected() {
        assert_eq!(
            resolve(3, &roll_counts![.., 1, ..]),
            Err(DiceError::MultipleEllipsis)
        );
    }

    #[test]
    fn index_and_slice() {
        assert_eq!(resolve(4, &RollCountSpec::Index(-1)), Ok(vec![0, 0, 0, 1]));
        assert_eq!(resolve(4, &RollCountSpec::Index(0)), Ok(vec![1, 0, 0, 0]));
        assert_eq!(
            resolve(4, &RollCountSpec::Index(4)),
            Err(DiceError::IndexOutOfRange { index: 4, size: 4 })
        );
        assert_eq!(resolve(4, &(-2isize..).into()), Ok(vec![0, 0, 1, 1]));
        assert_eq!(resolve(4, &(..1isize).into()), Ok(vec![1, 0, 0, 0]));
        assert_eq!(resolve(4, &(1isize..-1).into()), Ok(vec![0, 1, 1, 0]));
        assert_eq!(resolve(3, &(..).into()), Ok(vec![1, 1, 1]));
    }
}
