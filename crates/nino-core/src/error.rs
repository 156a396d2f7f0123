//! Unified error types for the nino workspace
//!
//! This module provides a common error type [`NinoError`] shared by the data
//! model, the I/O wrappers and the feature transformer. I/O helpers that use
//! `anyhow` internally convert into `NinoError` at the crate boundary.
//!
//! # Example
//!
//! ```ignore
//! use nino_core::{NinoError, NinoResult};
//!
//! fn build(path: &str) -> NinoResult<()> {
//!     let field = load_temperature_csv(path)?;
//!     transformer.transform(&field, 120, 6, &EvalIndices::default())?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all nino operations.
#[derive(Error, Debug)]
pub enum NinoError {
    /// I/O errors (file access, rename, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors (axes, shapes, parameters)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The land-fraction reference could not be retrieved
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Burn-in and look-ahead leave no time steps to featurize
    #[error(
        "empty valid range: burn-in {burn_in} + look-ahead {lookahead} leaves no rows out of {total} time steps"
    )]
    EmptyValidRange {
        burn_in: usize,
        lookahead: usize,
        total: usize,
    },

    /// A latitude/longitude band selected no usable grid cells
    #[error("empty region: {0}")]
    EmptyRegion(String),

    /// Feature blocks disagree on their row count
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The assembled matrix contains NaN or infinite values
    #[error("missing values: {0}")]
    MissingValues(String),

    /// A file format needs a cargo feature that was not compiled in
    #[error("{0} support is disabled; rebuild with the '{1}' feature")]
    FeatureDisabled(&'static str, &'static str),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using NinoError.
pub type NinoResult<T> = Result<T, NinoError>;

// Conversion from anyhow::Error
impl From<anyhow::Error> for NinoError {
    fn from(err: anyhow::Error) -> Self {
        NinoError::Other(format!("{err:#}"))
    }
}

impl From<String> for NinoError {
    fn from(s: String) -> Self {
        NinoError::Other(s)
    }
}

impl From<&str> for NinoError {
    fn from(s: &str) -> Self {
        NinoError::Other(s.to_string())
    }
}

impl From<toml::de::Error> for NinoError {
    fn from(err: toml::de::Error) -> Self {
        NinoError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for NinoError {
    fn from(err: toml::ser::Error) -> Self {
        NinoError::Config(err.to_string())
    }
}

impl From<ndarray::ShapeError> for NinoError {
    fn from(err: ndarray::ShapeError) -> Self {
        NinoError::ShapeMismatch(err.to_string())
    }
}
