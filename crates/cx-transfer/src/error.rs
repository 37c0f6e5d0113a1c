//! Error types for transfer calculations.

use cx_core::CxError;
use cx_gas::{GasError, Species};
use thiserror::Error;

/// Errors that can occur while computing tubing mass transfer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    #[error("Gas property error: {0}")]
    Gas(#[from] GasError),

    #[error("Invalid geometry: {what}")]
    InvalidGeometry { what: &'static str },

    #[error("Permeability missing for species: {species}")]
    MissingPermeability { species: Species },

    #[error("{what} must be > 0 (got {value})")]
    NonPositiveFlow { what: &'static str, value: f64 },

    #[error("hco3_mmol_l must be > 0 for bicarbonate pH calculation (got {hco3_mmol_l})")]
    DegeneratePh { hco3_mmol_l: f64 },

    #[error("Non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type TransferResult<T> = Result<T, TransferError>;

impl From<CxError> for TransferError {
    fn from(e: CxError) -> Self {
        match e {
            CxError::NonFinite { what, value } => TransferError::NonFinite { what, value },
        }
    }
}
