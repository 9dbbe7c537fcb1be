use std::path::Path;

use serde::{Deserialize, Serialize};
use symm_core::{ErrorInfo, ScoreThreshold, SymmError};

/// YAML-configurable parameters governing one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Uniform smoothing added to every off-diagonal kernel cell.
    #[serde(default)]
    pub epsilon: f64,
    /// Power iteration stops once the maximum entry-wise change drops below this.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Power iteration cap.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Optional finite horizon for the fixed-power distribution.
    #[serde(default)]
    pub power: Option<u32>,
    /// Maximum agreement gap tolerated between the two steady-state methods.
    #[serde(default = "default_comparison_tolerance")]
    pub comparison_tolerance: f64,
    /// Fraction digits used for matrix TSV dumps.
    #[serde(default = "default_matrix_fraction_digits")]
    pub matrix_fraction_digits: usize,
    /// Fraction digits used for vector TSV dumps.
    #[serde(default = "default_vector_fraction_digits")]
    pub vector_fraction_digits: usize,
    /// Significance policy applied to benchmark cases.
    #[serde(default)]
    pub significance: SignificanceConfig,
}

/// Score-threshold significance settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificanceConfig {
    /// Inclusive minimum detector score.
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
        }
    }
}

impl SignificanceConfig {
    /// Policy described by this configuration.
    pub fn policy(&self) -> ScoreThreshold {
        ScoreThreshold {
            min_score: self.min_score,
        }
    }
}

fn default_tolerance() -> f64 {
    1e-9
}

fn default_max_iterations() -> usize {
    100_000
}

fn default_comparison_tolerance() -> f64 {
    1e-4
}

fn default_matrix_fraction_digits() -> usize {
    6
}

fn default_vector_fraction_digits() -> usize {
    10
}

fn default_min_score() -> f64 {
    0.4
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.0,
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            power: None,
            comparison_tolerance: default_comparison_tolerance(),
            matrix_fraction_digits: default_matrix_fraction_digits(),
            vector_fraction_digits: default_vector_fraction_digits(),
            significance: SignificanceConfig::default(),
        }
    }
}

fn config_error(code: &str, message: impl Into<String>) -> SymmError {
    SymmError::Config(ErrorInfo::new(code, message.into()))
}

impl AnalysisConfig {
    /// Parses a YAML document; missing fields take their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, SymmError> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|err| config_error("config-parse", err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a YAML configuration file.
    pub fn from_path(path: &Path) -> Result<Self, SymmError> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| SymmError::io("config-read", path, &err))?;
        Self::from_yaml_str(&text).map_err(|err| match err {
            SymmError::Config(info) => {
                SymmError::Config(info.with_context("path", path.display()))
            }
            other => other,
        })
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), SymmError> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(SymmError::Config(
                ErrorInfo::new("config-epsilon", "epsilon must be finite and non-negative")
                    .with_context("epsilon", self.epsilon),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SymmError::Config(
                ErrorInfo::new("config-tolerance", "tolerance must be positive")
                    .with_context("tolerance", self.tolerance),
            ));
        }
        if self.max_iterations == 0 {
            return Err(config_error(
                "config-max-iterations",
                "max_iterations must be at least 1",
            ));
        }
        if !(self.comparison_tolerance.is_finite() && self.comparison_tolerance >= 0.0) {
            return Err(SymmError::Config(
                ErrorInfo::new(
                    "config-comparison-tolerance",
                    "comparison_tolerance must be non-negative",
                )
                .with_context("comparison_tolerance", self.comparison_tolerance),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AnalysisConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn partial_document_overrides() {
        let config = AnalysisConfig::from_yaml_str(
            "epsilon: 0.001\npower: 16\nsignificance:\n  min_score: 0.5\n",
        )
        .unwrap();
        assert_eq!(config.epsilon, 0.001);
        assert_eq!(config.power, Some(16));
        assert_eq!(config.significance.min_score, 0.5);
        assert_eq!(config.max_iterations, 100_000);
    }

    #[test]
    fn rejects_bad_ranges() {
        for text in ["epsilon: -1", "tolerance: 0", "max_iterations: 0"] {
            let err = AnalysisConfig::from_yaml_str(text).unwrap_err();
            assert!(matches!(err, SymmError::Config(_)), "{text}");
        }
    }
}
