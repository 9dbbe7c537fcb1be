use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, SymmError};

/// One labelled benchmark outcome pairing a known order with a predicted one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// Identifier of the benchmarked structure (e.g. a domain name).
    #[serde(default)]
    pub id: String,
    /// Ground-truth rotational symmetry order.
    pub known_order: i64,
    /// Order reported by the detector; absent when nothing was found.
    #[serde(default)]
    pub predicted_order: Option<i64>,
    /// Detector score consulted by score-based significance policies.
    #[serde(default)]
    pub score: Option<f64>,
}

impl Case {
    /// Creates a case without an identifier or score.
    pub fn new(known_order: i64, predicted_order: Option<i64>) -> Self {
        Self {
            id: String::new(),
            known_order,
            predicted_order,
            score: None,
        }
    }

    /// Attaches an identifier to the case.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Attaches a detector score to the case.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Known order clamped to at least 1.
    pub fn known(&self) -> Result<u32, SymmError> {
        self.order_state("known", Some(self.known_order))
    }

    /// Predicted order clamped to at least 1; a missing prediction means order 1.
    pub fn predicted(&self) -> Result<u32, SymmError> {
        self.order_state("predicted", self.predicted_order)
    }

    /// Whether the structure has a non-trivial known symmetry.
    pub fn is_symmetric(&self) -> bool {
        self.known_order > 1
    }

    /// Whether the detector reported exactly the known order.
    pub fn is_exact(&self) -> bool {
        self.known_order.max(1) == self.predicted_order.unwrap_or(1).max(1)
    }

    fn order_state(&self, role: &str, order: Option<i64>) -> Result<u32, SymmError> {
        match order {
            Some(value) if value > 1 => u32::try_from(value).map_err(|_| {
                SymmError::Range(
                    ErrorInfo::new("case-order-range", "order does not fit the order states")
                        .with_case(&self.id)
                        .with_context("role", role)
                        .with_context("order", value),
                )
            }),
            _ => Ok(1),
        }
    }
}

/// Decides whether a case's prediction is trusted enough to enter rate estimation.
pub trait SignificancePolicy {
    /// Returns true when the case should be counted.
    fn is_significant(&self, case: &Case) -> bool;
}

impl<F> SignificancePolicy for F
where
    F: Fn(&Case) -> bool,
{
    fn is_significant(&self, case: &Case) -> bool {
        self(case)
    }
}

/// Treats every case as significant, for pre-filtered benchmarks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptAll;

impl SignificancePolicy for AcceptAll {
    fn is_significant(&self, _case: &Case) -> bool {
        true
    }
}

/// Significant when the detector score reaches a minimum; unscored cases are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreThreshold {
    /// Inclusive lower bound on the detector score.
    pub min_score: f64,
}

impl SignificancePolicy for ScoreThreshold {
    fn is_significant(&self, case: &Case) -> bool {
        case.score.is_some_and(|score| score >= self.min_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_orders_clamp_to_one() {
        let case = Case::new(0, Some(-3));
        assert_eq!(case.known().unwrap(), 1);
        assert_eq!(case.predicted().unwrap(), 1);
        assert_eq!(Case::new(4, None).predicted().unwrap(), 1);
        assert_eq!(Case::new(4, Some(2)).predicted().unwrap(), 2);
    }

    #[test]
    fn oversized_orders_keep_their_value() {
        let huge = i64::from(u32::MAX) + 2;
        let case = Case::new(huge, Some(huge)).with_id("1abc");
        let err = case.known().unwrap_err();
        assert!(matches!(err, SymmError::Range(_)));
        let context = &err.info().context;
        assert_eq!(context["order"], huge.to_string());
        assert_eq!(context["role"], "known");
        assert_eq!(context["case"], "1abc");
        assert_eq!(case.predicted().unwrap_err().info().context["role"], "predicted");
    }

    #[test]
    fn exact_match_compares_clamped_orders() {
        assert!(Case::new(4, Some(4)).is_exact());
        assert!(Case::new(1, None).is_exact());
        assert!(!Case::new(4, Some(2)).is_exact());
        assert!(Case::new(i64::MAX, Some(i64::MAX)).is_exact());
        assert!(!Case::new(0, None).is_symmetric());
    }

    #[test]
    fn score_threshold_is_inclusive() {
        let policy = ScoreThreshold { min_score: 0.4 };
        assert!(policy.is_significant(&Case::new(2, Some(2)).with_score(0.4)));
        assert!(!policy.is_significant(&Case::new(2, Some(2)).with_score(0.39)));
        assert!(!policy.is_significant(&Case::new(2, Some(2))));
    }

    #[test]
    fn closures_act_as_policies() {
        let only_even = |case: &Case| case.known_order % 2 == 0;
        assert!(only_even.is_significant(&Case::new(4, Some(2))));
        assert!(!only_even.is_significant(&Case::new(3, Some(3))));
    }
}
