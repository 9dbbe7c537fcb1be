use std::fmt;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use symm_core::{is_prime, ErrorInfo, SymmError, ORDER_STATES};
use tracing::{debug, error};

use crate::rates::{MistakeRates, RateVector};
use crate::render::format_decimal;

/// Tolerance used when checking that kernel rows sum to one.
pub const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Row-stochastic matrix of one-step order transitions.
///
/// Row `i` is the true order `i + 1`; column `j` is the observed order `j + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawKernel")]
pub struct TransitionKernel {
    matrix: DMatrix<f64>,
}

/// Unchecked wire form; every deserialised kernel passes through `from_matrix`.
#[derive(Deserialize)]
struct RawKernel {
    matrix: DMatrix<f64>,
}

impl TryFrom<RawKernel> for TransitionKernel {
    type Error = SymmError;

    fn try_from(raw: RawKernel) -> Result<Self, Self::Error> {
        Self::from_matrix(raw.matrix)
    }
}

impl TransitionKernel {
    /// Wraps an explicit matrix after checking it is square and row-stochastic.
    pub fn from_matrix(matrix: DMatrix<f64>) -> Result<Self, SymmError> {
        if matrix.nrows() != matrix.ncols() || matrix.nrows() == 0 {
            return Err(SymmError::InvalidKernel(
                ErrorInfo::new("kernel-shape", "kernel must be a non-empty square matrix")
                    .with_context("rows", matrix.nrows())
                    .with_context("cols", matrix.ncols()),
            ));
        }
        for (row_idx, row) in matrix.row_iter().enumerate() {
            if let Some(value) = row.iter().copied().find(|v| entry_out_of_range(*v)) {
                return Err(SymmError::InvalidKernel(
                    ErrorInfo::new("kernel-entry-range", "kernel entries must lie in [0, 1]")
                        .with_context("row", row_idx + 1)
                        .with_context("value", value),
                ));
            }
            let sum: f64 = row.iter().sum();
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(SymmError::InvalidKernel(
                    ErrorInfo::new("kernel-row-sum", "kernel rows must sum to one")
                        .with_context("row", row_idx + 1)
                        .with_context("sum", sum),
                ));
            }
        }
        Ok(Self { matrix })
    }

    /// Builds a kernel from nested rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, SymmError> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != ncols) {
            return Err(SymmError::InvalidKernel(ErrorInfo::new(
                "kernel-ragged",
                "kernel rows must have equal length",
            )));
        }
        let matrix = DMatrix::from_fn(nrows, ncols, |i, j| rows[i][j]);
        Self::from_matrix(matrix)
    }

    /// Number of order states.
    pub fn states(&self) -> usize {
        self.matrix.nrows()
    }

    /// Underlying matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Transition probability from `true_order` to `observed_order` (both 1-based).
    pub fn get(&self, true_order: usize, observed_order: usize) -> Result<f64, SymmError> {
        let states = self.states();
        if !(1..=states).contains(&true_order) || !(1..=states).contains(&observed_order) {
            return Err(SymmError::Range(
                ErrorInfo::new("kernel-order-range", "order outside the kernel states")
                    .with_context("true_order", true_order)
                    .with_context("observed_order", observed_order)
                    .with_context("states", states),
            ));
        }
        Ok(self.matrix[(true_order - 1, observed_order - 1)])
    }

    /// Rows of the kernel as plain vectors.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.matrix
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }

    /// Sum of each row; every entry is one up to rounding.
    pub fn row_sums(&self) -> Vec<f64> {
        self.matrix.row_iter().map(|row| row.sum()).collect()
    }
}

impl fmt::Display for TransitionKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.matrix.row_iter() {
            for (idx, value) in row.iter().enumerate() {
                if idx > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", format_decimal(*value, 4))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Builds the 8-state kernel from estimated rates and a smoothing constant.
///
/// Off-diagonal cells get the single-step rate of the divisor relating the two
/// orders (forward when the true order is the multiple, inverse otherwise) plus
/// `epsilon`; unrelated pairs and composite divisors get `epsilon` alone. Each
/// diagonal cell then takes whatever mass the row has left.
pub fn build_kernel(rates: &MistakeRates, epsilon: f64) -> Result<TransitionKernel, SymmError> {
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(SymmError::InvalidInput(
            ErrorInfo::new("kernel-epsilon", "epsilon must be finite and non-negative")
                .with_context("epsilon", epsilon),
        ));
    }

    let states = ORDER_STATES;
    let mut matrix = DMatrix::<f64>::zeros(states, states);
    for i in 0..states {
        for j in 0..states {
            if i == j {
                continue;
            }
            let true_order = i as u32 + 1;
            let observed = j as u32 + 1;
            let flow = if true_order % observed == 0 {
                single_step_flow(&rates.forward, true_order / observed)?
            } else if observed % true_order == 0 {
                single_step_flow(&rates.inverse, observed / true_order)?
            } else {
                0.0
            };
            matrix[(i, j)] = flow + epsilon;
        }
    }

    for i in 0..states {
        let off_diagonal: f64 = matrix.row(i).sum();
        let diagonal = 1.0 - off_diagonal;
        if diagonal < -ROW_SUM_TOLERANCE {
            return Err(SymmError::InvalidKernel(
                ErrorInfo::new("kernel-negative-diagonal", "diagonal entry is negative")
                    .with_context("order", i + 1)
                    .with_context("diagonal", diagonal)
                    .with_context("epsilon", epsilon)
                    .with_hint("lower epsilon so each row's off-diagonal mass stays below one"),
            ));
        }
        matrix[(i, i)] = diagonal.max(0.0);
    }

    debug!(epsilon, "built transition kernel");
    TransitionKernel::from_matrix(matrix)
}

fn entry_out_of_range(value: f64) -> bool {
    !value.is_finite() || value < -ROW_SUM_TOLERANCE || value > 1.0 + ROW_SUM_TOLERANCE
}

fn single_step_flow(vector: &RateVector, divisor: u32) -> Result<f64, SymmError> {
    if divisor as usize <= vector.as_slice().len() {
        // Composite divisors are multi-step transitions and read as zero.
        return vector.rate_for(divisor);
    }
    if is_prime(divisor) {
        error!(divisor, "prime divisor outside the rate vector");
        return Err(SymmError::Range(
            ErrorInfo::new("kernel-divisor-range", "prime divisor outside the rate vector")
                .with_context("divisor", divisor),
        ));
    }
    Ok(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates(forward: &[(u32, f64)], inverse: &[(u32, f64)]) -> MistakeRates {
        MistakeRates {
            forward: RateVector::from_prime_rates(forward).unwrap(),
            inverse: RateVector::from_prime_rates(inverse).unwrap(),
            cases_used: 0,
        }
    }

    #[test]
    fn zero_rates_give_identity() {
        let kernel = build_kernel(&rates(&[], &[]), 0.0).unwrap();
        assert_eq!(kernel.matrix(), &DMatrix::<f64>::identity(8, 8));
    }

    #[test]
    fn forward_and_inverse_cells() {
        let kernel = build_kernel(&rates(&[(2, 0.2), (3, 0.1)], &[(2, 0.05)]), 0.0).unwrap();
        assert_eq!(kernel.get(4, 2).unwrap(), 0.2);
        assert_eq!(kernel.get(6, 2).unwrap(), 0.1);
        assert_eq!(kernel.get(2, 4).unwrap(), 0.05);
        // 8 -> 2 is a composite step
        assert_eq!(kernel.get(8, 2).unwrap(), 0.0);
        assert_eq!(kernel.get(3, 2).unwrap(), 0.0);
        assert!((kernel.get(4, 4).unwrap() - (1.0 - 0.2 - 0.05)).abs() < 1e-12);
    }

    #[test]
    fn epsilon_smooths_off_diagonal() {
        let kernel = build_kernel(&rates(&[(2, 0.2)], &[]), 0.01).unwrap();
        assert!((kernel.get(3, 2).unwrap() - 0.01).abs() < 1e-12);
        assert!((kernel.get(4, 2).unwrap() - 0.21).abs() < 1e-12);
        for sum in kernel.row_sums() {
            assert!((sum - 1.0).abs() < ROW_SUM_TOLERANCE);
        }
    }

    #[test]
    fn oversized_epsilon_is_invalid() {
        let err = build_kernel(&rates(&[], &[]), 0.2).unwrap_err();
        assert!(matches!(err, SymmError::InvalidKernel(_)));
        assert!(matches!(
            build_kernel(&rates(&[], &[]), -0.1),
            Err(SymmError::InvalidInput(_))
        ));
    }

    #[test]
    fn out_of_range_orders_are_rejected() {
        let kernel = build_kernel(&rates(&[], &[]), 0.0).unwrap();
        assert!(matches!(kernel.get(0, 1), Err(SymmError::Range(_))));
        assert!(matches!(kernel.get(1, 9), Err(SymmError::Range(_))));
    }

    #[test]
    fn deserialising_revalidates_rows() {
        let kernel = TransitionKernel::from_rows(&[vec![0.5, 0.5], vec![0.25, 0.75]]).unwrap();
        let json = serde_json::to_string(&kernel).unwrap();
        let restored: TransitionKernel = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, kernel);

        let tampered = json.replace("0.75", "5.0");
        let err = serde_json::from_str::<TransitionKernel>(&tampered).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("invalid kernel"), "{message}");
        assert!(message.contains("kernel-"), "{message}");
    }

    #[test]
    fn from_rows_checks_stochasticity() {
        assert!(TransitionKernel::from_rows(&[vec![0.5, 0.5], vec![0.2, 0.8]]).is_ok());
        assert!(matches!(
            TransitionKernel::from_rows(&[vec![0.5, 0.6], vec![0.2, 0.8]]),
            Err(SymmError::InvalidKernel(_))
        ));
        assert!(matches!(
            TransitionKernel::from_rows(&[vec![1.0], vec![0.2, 0.8]]),
            Err(SymmError::InvalidKernel(_))
        ));
    }

    #[test]
    fn display_renders_one_line_per_row() {
        let kernel = TransitionKernel::from_rows(&[vec![0.5, 0.5], vec![0.25, 0.75]]).unwrap();
        assert_eq!(kernel.to_string(), "0.5 0.5\n0.25 0.75\n");
    }
}
