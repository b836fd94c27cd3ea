//! Constant-time comparison.

use subtle::ConstantTimeEq;

/// Constant-time byte comparison to prevent timing attacks
///
/// SECURITY: Runs in time independent of where the first differing byte is.
/// Inputs of different length are padded to the longer one with different
/// fill bytes, so the length difference does not short-circuit either.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());

    let mut left = vec![0x00u8; len];
    let mut right = vec![0xFFu8; len];
    left[..a.len()].copy_from_slice(a);
    right[..b.len()].copy_from_slice(b);

    let lengths_equal = (a.len() as u64).ct_eq(&(b.len() as u64));
    let contents_equal = left.ct_eq(&right);

    (lengths_equal & contents_equal).into()
}

/// [`constant_time_eq`] over UTF-8 strings
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}
