#![deny(missing_docs)]
#![doc = "Markov-chain model of symmetry-order detection errors: single-step mistake rates, \
the row-stochastic transition kernel built from them, and its steady state by power \
iteration and by eigendecomposition."]

/// Exact order accuracy over a benchmark.
pub mod accuracy;
/// YAML analysis configuration and defaults.
pub mod config;
/// Transition kernel construction.
pub mod kernel;
/// Forward and inverse mistake-rate estimation.
pub mod rates;
/// Text and TSV rendering of vectors and matrices.
pub mod render;
/// End-to-end analysis and JSON helpers.
pub mod report;
/// Steady-state solvers.
pub mod steady;

pub use accuracy::OrderAccuracy;
pub use config::{AnalysisConfig, SignificanceConfig};
pub use kernel::{build_kernel, TransitionKernel, ROW_SUM_TOLERANCE};
pub use rates::{estimate_rates, MistakeDirection, MistakeRates, MistakeTally, RateVector};
pub use report::{
    analyze, read_cases, report_from_json, report_to_json, write_json, AnalysisReport,
    FixedPowerRow,
};
pub use steady::{
    compare_steady_states, dominant_eigenpair, dominant_right_eigenpair, fixed_power,
    power_iteration, Eigenpair, PowerIteration, SteadyStateComparison,
};
