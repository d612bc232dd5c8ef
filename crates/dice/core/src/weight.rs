//! Exact integer weights.
//!
//! Every probability in this crate is an unnormalized integer weight. Weights
//! multiply quickly (a pool of 50d6 has denominator 6^50, which no longer fits
//! in 128 bits), so they are arbitrary precision.

use num::{BigUint, One, Zero};

/// Arbitrary-precision, non-negative outcome weight.
pub type Weight = BigUint;

/// Binomial coefficient `C(n, k)`, zero when `k > n`.
pub fn binomial(n: u32, k: u32) -> Weight {
    if k > n {
        return Weight::zero();
    }
    let k = k.min(n - k);
    let mut acc = Weight::one();
    for i in 0..k {
        // acc == C(n, i) here, so the division is exact.
        acc *= n - i;
        acc /= i + 1;
    }
    acc
}

/// `base ^ exp`, with `0 ^ 0 == 1`.
#[inline]
pub fn power(base: &Weight, exp: u32) -> Weight {
    base.pow(exp)
}
