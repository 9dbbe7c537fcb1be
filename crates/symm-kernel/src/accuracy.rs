use std::fmt;

use serde::{Deserialize, Serialize};
use symm_core::{Case, SignificancePolicy};

use crate::render::format_decimal;

/// Fraction of symmetric, significant cases whose order was predicted exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAccuracy {
    /// Cases whose predicted order equals the known order.
    pub correct: usize,
    /// Cases considered.
    pub total: usize,
}

impl OrderAccuracy {
    /// Counts exact order matches among significant cases with a known order above 1.
    pub fn measure<'a, I, P>(cases: I, policy: &P) -> Self
    where
        I: IntoIterator<Item = &'a Case>,
        P: SignificancePolicy + ?Sized,
    {
        cases
            .into_iter()
            .filter(|case| case.is_symmetric() && policy.is_significant(case))
            .fold(Self::default(), |acc, case| Self {
                correct: acc.correct + usize::from(case.is_exact()),
                total: acc.total + 1,
            })
    }

    /// Accuracy in `[0, 1]`, or `None` when no case qualified.
    pub fn accuracy(&self) -> Option<f64> {
        (self.total > 0).then(|| self.correct as f64 / self.total as f64)
    }
}

impl fmt::Display for OrderAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.accuracy() {
            Some(value) => write!(f, "{}%", format_decimal(value * 100.0, 2)),
            None => write!(f, "n/a"),
        }
    }
}
