#![deny(missing_docs)]
#![doc = "Core types for modelling symmetry-order detection errors: benchmark cases, \
significance policies, structured errors and prime utilities."]

/// Benchmark case records and significance policies.
pub mod case;
pub mod errors;
pub mod primes;

pub use case::{AcceptAll, Case, ScoreThreshold, SignificancePolicy};
pub use errors::{ErrorInfo, SymmError};
pub use primes::{is_prime, prime_factors};

/// Number of order states modelled by the chain (orders 1 through 8).
pub const ORDER_STATES: usize = 8;
