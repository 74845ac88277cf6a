//! Error types for the harmonic analysis engine

use std::fmt;

/// Errors that can occur while loading configuration or running an analysis
///
/// Only load-time configuration problems halt the system. Per-analysis
/// problems degrade the result instead: a constraint that references
/// missing data fails that constraint, an unknown calibration bucket falls
/// back along bucket → GLOBAL → pass-through, and out-of-range arbitration
/// inputs are clamped.
#[derive(Debug, Clone)]
pub enum AnalysisError {
    /// Malformed pattern library, profile library, or calibration mapping.
    /// The message names the offending field path, e.g.
    /// `patterns[3].evidence.weight`.
    SchemaValidation(String),

    /// Invalid input parameters (non-finite confidence, inconsistent context)
    InvalidInput(String),

    /// I/O error while reading a configuration file
    Io(String),

    /// Numerical error (overflow, non-finite intermediate, etc.)
    NumericalError(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::SchemaValidation(msg) => write!(f, "Schema validation: {}", msg),
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::Io(msg) => write!(f, "I/O error: {}", msg),
            AnalysisError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        AnalysisError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::SchemaValidation(err.to_string())
    }
}
