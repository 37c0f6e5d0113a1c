//! Gas property errors.

use cx_core::CxError;
use thiserror::Error;

/// Result type for gas property operations.
pub type GasResult<T> = Result<T, GasError>;

/// Errors that can occur during gas property calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GasError {
    /// Species not covered by the queried model.
    #[error("Unsupported species: {species}")]
    UnsupportedSpecies { species: String },

    /// Non-physical values (negative fraction, non-finite coefficient, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl From<CxError> for GasError {
    fn from(err: CxError) -> Self {
        match err {
            CxError::NonFinite { what, .. } => GasError::NonPhysical { what },
        }
    }
}
