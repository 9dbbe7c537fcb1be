//! Trial-division prime utilities for the small orders seen in symmetry benchmarks.

use crate::errors::{ErrorInfo, SymmError};

/// Returns the prime factors of `n` in ascending order, with multiplicity.
///
/// The product of the returned factors equals `n`. Values below 2 have no
/// factorisation and yield [`SymmError::InvalidInput`].
pub fn prime_factors(n: u32) -> Result<Vec<u32>, SymmError> {
    if n < 2 {
        return Err(SymmError::InvalidInput(
            ErrorInfo::new("prime-factors-domain", "prime factorisation requires n >= 2")
                .with_context("n", n),
        ));
    }
    let mut factors = Vec::new();
    let mut remaining = n;
    let mut candidate = 2u32;
    while u64::from(candidate) * u64::from(candidate) <= u64::from(remaining) {
        while remaining % candidate == 0 {
            factors.push(candidate);
            remaining /= candidate;
        }
        candidate += if candidate == 2 { 1 } else { 2 };
    }
    if remaining > 1 {
        factors.push(remaining);
    }
    Ok(factors)
}

/// Returns true when `n` is prime. Values below 2 are never prime.
pub fn is_prime(n: u32) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut candidate = 3u32;
    while u64::from(candidate) * u64::from(candidate) <= u64::from(n) {
        if n % candidate == 0 {
            return false;
        }
        candidate += 2;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factors_with_multiplicity() {
        assert_eq!(prime_factors(12).unwrap(), vec![2, 2, 3]);
        assert_eq!(prime_factors(8).unwrap(), vec![2, 2, 2]);
        assert_eq!(prime_factors(7).unwrap(), vec![7]);
        assert_eq!(prime_factors(4999).unwrap(), vec![4999]);
    }

    #[test]
    fn rejects_values_below_two() {
        for n in [0, 1] {
            let err = prime_factors(n).unwrap_err();
            assert!(matches!(err, SymmError::InvalidInput(_)));
            assert_eq!(err.info().context.get("n"), Some(&n.to_string()));
        }
    }

    #[test]
    fn small_primes() {
        let primes: Vec<u32> = (0..20).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19]);
    }
}
