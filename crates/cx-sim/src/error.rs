//! Error types for simulation runs.

use cx_project::ValidationError;
use cx_transfer::TransferError;
use thiserror::Error;

/// Errors encountered while running a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid inputs: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type SimResult<T> = Result<T, SimError>;
