use std::fmt;

use nalgebra::{DMatrix, DVector, Schur, SVD};
use serde::{Deserialize, Serialize};
use symm_core::{ErrorInfo, SymmError};
use tracing::{debug, info, warn};

use crate::kernel::TransitionKernel;
use crate::render::vector_to_string;

/// Iteration budget handed to the real Schur decomposition.
const SCHUR_MAX_ITERATIONS: usize = 10_000;

/// Outcome of repeated kernel self-multiplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerIteration {
    /// First row of the converged power of the kernel.
    pub distribution: Vec<f64>,
    /// Number of multiplications performed.
    pub iterations: usize,
    /// Maximum entry-wise change at the final step.
    pub delta: f64,
    /// Largest entry-wise difference between any two rows of the converged matrix.
    ///
    /// Non-zero spread means the stationary distribution depends on the starting
    /// order, i.e. the chain is not ergodic.
    pub row_spread: f64,
}

/// Iterates `M <- M * K` from `M = K` until the maximum entry-wise change drops
/// below `tolerance`.
pub fn power_iteration(
    kernel: &TransitionKernel,
    tolerance: f64,
    max_iterations: usize,
) -> Result<PowerIteration, SymmError> {
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(SymmError::InvalidInput(
            ErrorInfo::new("power-tolerance", "tolerance must be positive and finite")
                .with_context("tolerance", tolerance),
        ));
    }
    let k = kernel.matrix();
    let mut current = k.clone();
    let mut delta = f64::INFINITY;
    for iteration in 1..=max_iterations {
        let next = &current * k;
        delta = max_abs_diff(&next, &current);
        current = next;
        if delta < tolerance {
            let row_spread = row_spread(&current);
            info!(iterations = iteration, delta, row_spread, "steady state found");
            return Ok(PowerIteration {
                distribution: current.row(0).iter().copied().collect(),
                iterations: iteration,
                delta,
                row_spread,
            });
        }
    }
    Err(SymmError::NonConvergence(
        ErrorInfo::new("power-iteration-cap", "power iteration exceeded its iteration cap")
            .with_context("max_iterations", max_iterations)
            .with_context("delta", delta)
            .with_context("tolerance", tolerance)
            .with_hint("the kernel may be periodic or disconnected, or the tolerance too tight"),
    ))
}

/// First row of `K^power`, without any convergence check.
///
/// Uses exponentiation by squaring, so large powers cost `O(log power)` products.
pub fn fixed_power(kernel: &TransitionKernel, power: u32) -> Vec<f64> {
    kernel.matrix().pow(power).row(0).iter().copied().collect()
}

fn max_abs_diff(a: &DMatrix<f64>, b: &DMatrix<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn row_spread(matrix: &DMatrix<f64>) -> f64 {
    let first = matrix.row(0);
    matrix
        .row_iter()
        .skip(1)
        .map(|row| {
            row.iter()
                .zip(first.iter())
                .map(|(x, y)| (x - y).abs())
                .fold(0.0, f64::max)
        })
        .fold(0.0, f64::max)
}

/// A single eigenvalue with its (unnormalised) eigenvector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eigenpair {
    /// Real part of the eigenvalue.
    pub eigenvalue: f64,
    /// Eigenvector as returned by the decomposition, defined up to scale and sign.
    pub eigenvector: Vec<f64>,
}

impl Eigenpair {
    /// Eigenvector rescaled so that its components sum to one.
    pub fn distribution(&self) -> Result<Vec<f64>, SymmError> {
        let sum: f64 = self.eigenvector.iter().sum();
        let scale = self.eigenvector.iter().map(|v| v.abs()).fold(0.0, f64::max);
        if !sum.is_finite() || sum.abs() <= 1e-12 * scale.max(f64::MIN_POSITIVE) {
            return Err(SymmError::InvalidKernel(
                ErrorInfo::new(
                    "eigenvector-zero-sum",
                    "eigenvector components sum to zero and cannot be read as a distribution",
                )
                .with_context("eigenvalue", self.eigenvalue),
            ));
        }
        Ok(self.eigenvector.iter().map(|v| v / sum).collect())
    }
}

impl fmt::Display for Eigenpair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.eigenvalue, vector_to_string(&self.eigenvector))
    }
}

/// Dominant eigenpair of `Kᵀ`, whose eigenvector is the stationary distribution `π K = π`.
pub fn dominant_eigenpair(kernel: &TransitionKernel) -> Result<Eigenpair, SymmError> {
    dominant_of(kernel.matrix().transpose())
}

/// Dominant eigenpair of `K` itself.
///
/// For a stochastic matrix this is the constant vector, not the stationary
/// distribution; it is exposed so the two can be compared.
pub fn dominant_right_eigenpair(kernel: &TransitionKernel) -> Result<Eigenpair, SymmError> {
    dominant_of(kernel.matrix().clone())
}

fn dominant_of(matrix: DMatrix<f64>) -> Result<Eigenpair, SymmError> {
    let n = matrix.nrows();
    let schur = Schur::try_new(matrix.clone(), f64::EPSILON, SCHUR_MAX_ITERATIONS).ok_or_else(|| {
        SymmError::NonConvergence(ErrorInfo::new(
            "eigen-schur",
            "real Schur decomposition did not converge",
        ))
    })?;
    let eigenvalues = schur.complex_eigenvalues();
    // Largest modulus wins; ties go to the larger real part so a periodic
    // chain still reports the eigenvalue 1.
    let lambda = eigenvalues
        .iter()
        .copied()
        .max_by(|a, b| {
            a.norm_sqr()
                .partial_cmp(&b.norm_sqr())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.re.partial_cmp(&b.re).unwrap_or(std::cmp::Ordering::Equal))
        })
        .ok_or_else(|| {
            SymmError::InvalidKernel(ErrorInfo::new("eigen-empty", "kernel has no eigenvalues"))
        })?;
    if lambda.im.abs() > 1e-9 {
        warn!(re = lambda.re, im = lambda.im, "dominant eigenvalue is complex");
    }

    // The eigenvector spans the null space of (A - λI): take the right singular
    // vector belonging to the smallest singular value.
    let shifted = matrix - DMatrix::<f64>::identity(n, n) * lambda.re;
    let svd = SVD::new(shifted, false, true);
    let v_t = svd.v_t.ok_or_else(|| {
        SymmError::NonConvergence(ErrorInfo::new("eigen-svd", "SVD did not produce V^T"))
    })?;
    let (null_idx, smallest) = svd
        .singular_values
        .iter()
        .copied()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or_else(|| {
            SymmError::InvalidKernel(ErrorInfo::new("eigen-empty", "kernel has no singular values"))
        })?;
    debug!(eigenvalue = lambda.re, residual = smallest, "dominant eigenpair");
    let eigenvector: DVector<f64> = v_t.row(null_idx).transpose();
    Ok(Eigenpair {
        eigenvalue: lambda.re,
        eigenvector: eigenvector.iter().copied().collect(),
    })
}

/// Both steady-state estimates side by side with their discrepancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteadyStateComparison {
    /// Distribution from power iteration.
    pub power: Vec<f64>,
    /// Normalised dominant eigenvector.
    pub eigen: Vec<f64>,
    /// Largest component-wise absolute difference.
    pub max_abs_diff: f64,
    /// Whether the difference is within the requested tolerance.
    pub agrees: bool,
}

/// Compares the power-iteration and eigen distributions component by component.
pub fn compare_steady_states(
    power: &PowerIteration,
    eigen: &Eigenpair,
    tolerance: f64,
) -> Result<SteadyStateComparison, SymmError> {
    let eigen_distribution = eigen.distribution()?;
    if eigen_distribution.len() != power.distribution.len() {
        return Err(SymmError::InvalidInput(
            ErrorInfo::new("steady-state-dimension", "distributions differ in length")
                .with_context("power", power.distribution.len())
                .with_context("eigen", eigen_distribution.len()),
        ));
    }
    let max_abs_diff = power
        .distribution
        .iter()
        .zip(&eigen_distribution)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    let agrees = max_abs_diff <= tolerance;
    if !agrees {
        warn!(
            max_abs_diff,
            tolerance, "power iteration and eigendecomposition disagree"
        );
    }
    Ok(SteadyStateComparison {
        power: power.distribution.clone(),
        eigen: eigen_distribution,
        max_abs_diff,
        agrees,
    })
}
