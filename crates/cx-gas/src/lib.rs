//! cx-gas: gas-phase and dissolved-gas property helpers for carboxyflow.
//!
//! Provides:
//! - Transferring species definitions (O2, N2, CO2)
//! - Gas composition handling (normalized mole fractions)
//! - `SolubilityModel` capability for Henry-type coefficients
//! - Ideal-gas molar concentration and molar supply rates
//!
//! # Architecture
//!
//! Solver code only sees the `SolubilityModel` trait. A constant-coefficient
//! table is the reference implementation; any `Fn(Species, f64) -> GasResult<f64>`
//! closure can be substituted for a temperature-dependent model.
//!
//! # Example
//!
//! ```
//! use cx_gas::{ConstantSolubility, SolubilityModel, Species};
//!
//! let model = ConstantSolubility::default();
//! let s_o2 = model.solubility(Species::O2, 37.0).unwrap();
//! let cstar = s_o2 * 0.21 * 101.325;
//! assert!(cstar > 0.0);
//! ```

pub mod composition;
pub mod error;
pub mod ideal_gas;
pub mod solubility;
pub mod species;

// Re-exports for ergonomics
pub use composition::Composition;
pub use error::{GasError, GasResult};
pub use ideal_gas::{molar_concentration_mmol_l, species_molar_flow_mmol_min, total_molar_flow_mmol_min};
pub use solubility::{ConstantSolubility, SolubilityModel};
pub use species::Species;
