use std::fmt;

use serde::{Deserialize, Serialize};
use symm_core::{
    is_prime, prime_factors, Case, ErrorInfo, SignificancePolicy, SymmError, ORDER_STATES,
};
use tracing::{debug, error};

use crate::render::format_decimal;

/// Direction of a divisor mistake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MistakeDirection {
    /// The known order is a multiple of the predicted order.
    Forward,
    /// The predicted order is a multiple of the known order.
    Inverse,
}

impl fmt::Display for MistakeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MistakeDirection::Forward => write!(f, "forward"),
            MistakeDirection::Inverse => write!(f, "inverse"),
        }
    }
}

/// Per-divisor single-step mistake rates for divisors 1 through 8.
///
/// Only prime divisors are ever populated; divisor 1 (no mistake) and
/// composite divisors stay at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateVector {
    rates: [f64; ORDER_STATES],
}

impl Default for RateVector {
    fn default() -> Self {
        Self::zeros()
    }
}

impl RateVector {
    /// All-zero rate vector.
    pub fn zeros() -> Self {
        Self {
            rates: [0.0; ORDER_STATES],
        }
    }

    /// Builds a vector from explicit prime rates; non-prime divisors are rejected.
    pub fn from_prime_rates(entries: &[(u32, f64)]) -> Result<Self, SymmError> {
        let mut vector = Self::zeros();
        for &(divisor, rate) in entries {
            check_divisor(divisor)?;
            if !is_prime(divisor) {
                return Err(SymmError::InvalidInput(
                    ErrorInfo::new("rate-composite-divisor", "only prime divisors carry rates")
                        .with_context("divisor", divisor),
                ));
            }
            if !(0.0..=1.0).contains(&rate) {
                return Err(SymmError::InvalidInput(
                    ErrorInfo::new("rate-out-of-bounds", "rates must lie in [0, 1]")
                        .with_context("divisor", divisor)
                        .with_context("rate", rate),
                ));
            }
            vector.rates[divisor as usize - 1] = rate;
        }
        Ok(vector)
    }

    /// Rate for the given divisor, validated to lie in `1..=8`.
    pub fn rate_for(&self, divisor: u32) -> Result<f64, SymmError> {
        check_divisor(divisor)?;
        Ok(self.rates[divisor as usize - 1])
    }

    /// Raw rates ordered by divisor, starting at divisor 1.
    pub fn as_slice(&self) -> &[f64] {
        &self.rates
    }
}

impl fmt::Display for RateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, rate) in self.rates.iter().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", format_decimal(*rate, 4))?;
        }
        write!(f, "]")
    }
}

fn check_divisor(divisor: u32) -> Result<(), SymmError> {
    if divisor == 0 || divisor as usize > ORDER_STATES {
        return Err(SymmError::Range(
            ErrorInfo::new("rate-divisor-range", "divisor outside the modelled order states")
                .with_context("divisor", divisor)
                .with_context("states", ORDER_STATES),
        ));
    }
    Ok(())
}

/// Forward and inverse mistake rates estimated from a benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MistakeRates {
    /// Rates of reporting a divisor of the true order.
    pub forward: RateVector,
    /// Rates of reporting a multiple of the true order.
    pub inverse: RateVector,
    /// Number of significant cases folded into the estimate.
    pub cases_used: usize,
}

impl fmt::Display for MistakeRates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.forward)?;
        writeln!(f, "{}", self.inverse)
    }
}

/// Raw mistake counts and their "possible mistake" denominators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MistakeTally {
    /// Forward mistakes observed per prime divisor.
    pub forward_counts: [u32; ORDER_STATES],
    /// Occurrences of each prime in known orders.
    pub forward_possible: [u32; ORDER_STATES],
    /// Inverse mistakes observed per prime divisor.
    pub inverse_counts: [u32; ORDER_STATES],
    /// Occurrences of each prime in predicted orders.
    pub inverse_possible: [u32; ORDER_STATES],
    /// Number of cases folded into the tally.
    pub cases: usize,
}

impl MistakeTally {
    /// Folds one significant case into the tally.
    pub fn record(mut self, case: &Case) -> Result<Self, SymmError> {
        let known = case.known()?;
        let predicted = case.predicted()?;

        if known > 1 {
            bump_factors(&mut self.forward_possible, known, case)?;
        }
        if predicted > 1 {
            bump_factors(&mut self.inverse_possible, predicted, case)?;
        }

        // A prediction of 1 for a known 12 is three single steps: 2, 2 and 3.
        if known % predicted == 0 {
            let divisor = known / predicted;
            if divisor > 1 {
                bump_factors(&mut self.forward_counts, divisor, case)?;
            }
        } else if predicted % known == 0 {
            let divisor = predicted / known;
            if divisor > 1 {
                bump_factors(&mut self.inverse_counts, divisor, case)?;
            }
        }

        self.cases += 1;
        Ok(self)
    }

    /// Divides each prime's count by how often that prime could have been a mistake.
    pub fn normalize(&self) -> Result<MistakeRates, SymmError> {
        Ok(MistakeRates {
            forward: normalize_direction(
                &self.forward_counts,
                &self.forward_possible,
                MistakeDirection::Forward,
            )?,
            inverse: normalize_direction(
                &self.inverse_counts,
                &self.inverse_possible,
                MistakeDirection::Inverse,
            )?,
            cases_used: self.cases,
        })
    }
}

fn bump_factors(
    vector: &mut [u32; ORDER_STATES],
    value: u32,
    case: &Case,
) -> Result<(), SymmError> {
    for factor in prime_factors(value)? {
        let Some(slot) = vector.get_mut(factor as usize - 1) else {
            error!(factor, case = %case.id, "prime factor exceeds the modelled order states");
            return Err(SymmError::Range(
                ErrorInfo::new("rate-prime-range", "prime factor too large for the order states")
                    .with_context("factor", factor)
                    .with_context("value", value)
                    .with_case(&case.id)
                    .with_hint("the benchmark contains orders the 8-state chain cannot model"),
            ));
        };
        *slot += 1;
    }
    Ok(())
}

fn normalize_direction(
    counts: &[u32; ORDER_STATES],
    possible: &[u32; ORDER_STATES],
    direction: MistakeDirection,
) -> Result<RateVector, SymmError> {
    let mut vector = RateVector::zeros();
    for divisor in 2..=ORDER_STATES as u32 {
        if !is_prime(divisor) {
            continue;
        }
        let idx = divisor as usize - 1;
        if possible[idx] == 0 {
            return Err(SymmError::InsufficientData(
                ErrorInfo::new(
                    "rate-no-evidence",
                    "no significant case could have made this prime mistake",
                )
                .with_mistake(divisor, direction),
            ));
        }
        vector.rates[idx] = f64::from(counts[idx]) / f64::from(possible[idx]);
    }
    Ok(vector)
}

/// Estimates forward and inverse single-step mistake rates from significant cases.
pub fn estimate_rates<'a, I, P>(cases: I, policy: &P) -> Result<MistakeRates, SymmError>
where
    I: IntoIterator<Item = &'a Case>,
    P: SignificancePolicy + ?Sized,
{
    let tally = cases
        .into_iter()
        .filter(|case| policy.is_significant(case))
        .try_fold(MistakeTally::default(), |tally, case| tally.record(case))?;
    debug!(cases = tally.cases, "folded significant cases into mistake tally");
    tally.normalize()
}
