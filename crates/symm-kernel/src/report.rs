use std::path::Path;

use serde::{Deserialize, Serialize};
use symm_core::{Case, ErrorInfo, SignificancePolicy, SymmError};
use tracing::info;

use crate::config::AnalysisConfig;
use crate::kernel::{build_kernel, TransitionKernel};
use crate::rates::{estimate_rates, MistakeRates};
use crate::steady::{
    compare_steady_states, dominant_eigenpair, fixed_power, power_iteration, Eigenpair,
    PowerIteration, SteadyStateComparison,
};

/// Everything derived from one benchmark: rates, kernel and both steady states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Smoothing constant used to build the kernel.
    pub epsilon: f64,
    /// Estimated single-step mistake rates.
    pub rates: MistakeRates,
    /// Transition kernel built from the rates.
    pub kernel: TransitionKernel,
    /// Power-iteration steady state.
    pub power_iteration: PowerIteration,
    /// First row of `K^power` when a fixed power was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_power: Option<FixedPowerRow>,
    /// Dominant eigenpair of the kernel's left eigenproblem.
    pub eigenpair: Eigenpair,
    /// Agreement between the two steady-state methods.
    pub comparison: SteadyStateComparison,
}

/// Finite-horizon distribution for an explicit power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedPowerRow {
    /// Exponent applied to the kernel.
    pub power: u32,
    /// First row of the powered kernel.
    pub distribution: Vec<f64>,
}

/// Runs rate estimation, kernel construction and both steady-state solvers.
pub fn analyze<P>(
    cases: &[Case],
    policy: &P,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, SymmError>
where
    P: SignificancePolicy + ?Sized,
{
    config.validate()?;
    let rates = estimate_rates(cases, policy)?;
    info!(
        cases = cases.len(),
        significant = rates.cases_used,
        "estimated mistake rates"
    );
    let kernel = build_kernel(&rates, config.epsilon)?;
    let power = power_iteration(&kernel, config.tolerance, config.max_iterations)?;
    let fixed = config.power.map(|power| FixedPowerRow {
        power,
        distribution: fixed_power(&kernel, power),
    });
    let eigenpair = dominant_eigenpair(&kernel)?;
    let comparison = compare_steady_states(&power, &eigenpair, config.comparison_tolerance)?;
    Ok(AnalysisReport {
        epsilon: config.epsilon,
        rates,
        kernel,
        power_iteration: power,
        fixed_power: fixed,
        eigenpair,
        comparison,
    })
}

/// Serialises an analysis report into indented JSON.
pub fn report_to_json(report: &AnalysisReport) -> Result<String, SymmError> {
    serde_json::to_string_pretty(report)
        .map_err(|err| SymmError::Serde(ErrorInfo::new("report-serialize", err.to_string())))
}

/// Deserialises an analysis report from JSON text.
pub fn report_from_json(json: &str) -> Result<AnalysisReport, SymmError> {
    serde_json::from_str(json)
        .map_err(|err| SymmError::Serde(ErrorInfo::new("report-deserialize", err.to_string())))
}

/// Reads a JSON array of cases from disk.
pub fn read_cases(path: &Path) -> Result<Vec<Case>, SymmError> {
    let text =
        std::fs::read_to_string(path).map_err(|err| SymmError::io("cases-read", path, &err))?;
    serde_json::from_str(&text).map_err(|err| {
        SymmError::Serde(
            ErrorInfo::new("cases-deserialize", err.to_string())
                .with_context("path", path.display()),
        )
    })
}

/// Writes a JSON payload to disk.
pub fn write_json(path: &Path, json: &str) -> Result<(), SymmError> {
    std::fs::write(path, json).map_err(|err| SymmError::io("json-write", path, &err))
}
