//! cx-core: stable foundation for carboxyflow.
//!
//! Contains:
//! - units (uom SI types + constructors in the working units of tubing models)
//! - numeric (Real + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CxError, CxResult};
pub use numeric::*;
pub use units::*;
