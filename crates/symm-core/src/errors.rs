//! Structured error types shared across the symmetry-order crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`SymmError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (primes, orders, paths, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Names the benchmark case at fault; anonymous cases add nothing.
    pub fn with_case(mut self, id: &str) -> Self {
        if !id.is_empty() {
            self.context.insert("case".to_owned(), id.to_owned());
        }
        self
    }

    /// Records which single-step mistake (prime and direction) the error concerns.
    pub fn with_mistake(self, prime: u32, direction: impl ToString) -> Self {
        self.with_context("prime", prime)
            .with_context("direction", direction)
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for order-error modelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SymmError {
    /// A value outside the domain of an operation (e.g. factorising 1).
    #[error("invalid input: {0}")]
    InvalidInput(ErrorInfo),
    /// The benchmark offers no evidence for a prime's single-step rate.
    #[error("insufficient data: {0}")]
    InsufficientData(ErrorInfo),
    /// A divisor or prime factor falls outside the modelled order states.
    #[error("range error: {0}")]
    Range(ErrorInfo),
    /// The transition kernel is not row-stochastic.
    #[error("invalid kernel: {0}")]
    InvalidKernel(ErrorInfo),
    /// An iterative solver exhausted its iteration budget.
    #[error("non-convergence: {0}")]
    NonConvergence(ErrorInfo),
    /// Filesystem failures while reading inputs or writing outputs.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// JSON encoding and decoding errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        let mut entries = self.context.iter();
        if let Some((key, value)) = entries.next() {
            write!(f, " ({key}={value}")?;
            for (key, value) in entries {
                write!(f, " {key}={value}")?;
            }
            write!(f, ")")?;
        }
        match &self.hint {
            Some(hint) => write!(f, "; hint: {hint}"),
            None => Ok(()),
        }
    }
}

impl SymmError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SymmError::InvalidInput(info)
            | SymmError::InsufficientData(info)
            | SymmError::Range(info)
            | SymmError::InvalidKernel(info)
            | SymmError::NonConvergence(info)
            | SymmError::Io(info)
            | SymmError::Serde(info)
            | SymmError::Config(info) => info,
        }
    }

    /// Wraps a filesystem error, recording the offending path.
    pub fn io(code: &str, path: &std::path::Path, err: &std::io::Error) -> Self {
        SymmError::Io(
            ErrorInfo::new(code, err.to_string()).with_context("path", path.display()),
        )
    }
}
