//! cx-transfer: dissolved-gas transfer through semi-permeable tubing.
//!
//! Provides:
//! - Hold-up volumes, residence times and transport delay
//! - Equilibrium concentrations and permeability-derived transfer rates
//! - Single-pass steady outlet, lumped (closed form) or segmented counterflow
//! - Gas-supply limiting of uptake
//! - Two-stage CO2/pH conditioning and bicarbonate buffer pH
//!
//! Every function is a pure computation over a borrowed
//! [`SimulationInputs`](cx_project::SimulationInputs); nothing is cached
//! between calls, so evaluations may run concurrently.
//!
//! # Example
//!
//! ```
//! use cx_gas::ConstantSolubility;
//! use cx_project::SimulationInputs;
//! use cx_transfer::{DissolvedGas, compute_single_pass_steady_outlet};
//!
//! let inputs = SimulationInputs::default();
//! let solubility = ConstantSolubility::default();
//! let result =
//!     compute_single_pass_steady_outlet(&inputs, &solubility, DissolvedGas::initial(&inputs))
//!         .unwrap();
//! assert!(result.outlet.o2 > inputs.c_o2_init_mmol_l);
//! ```

pub mod co2;
pub mod counterflow;
pub mod equilibrium;
pub mod error;
pub mod geometry;
pub mod lumped;
pub mod single_pass;

pub use co2::{
    Co2Conditioner, Co2ConditioningOutlet, Co2StageProfiles, bicarbonate_ph, co2_stage_profiles,
    compute_co2_conditioning_outlet, two_stage_co2_outlet,
};
pub use counterflow::{CounterflowSolution, CounterflowSolver, CounterflowSpecies};
pub use equilibrium::{
    DissolvedGas, effective_kla_from_permeability, equilibrium_concentration,
    equilibrium_concentrations, gas_molar_supply_rate, percent_of_reference,
    reference_concentrations,
};
pub use error::{TransferError, TransferResult};
pub use geometry::{
    annulus_volume_ml, holdup_volume_ml, residence_time_s, transport_delay_s, tube_volume_ml,
};
pub use lumped::{CappedOutlet, apply_supply_cap, plug_flow_outlet};
pub use single_pass::{AxialProfiles, PassMetadata, SteadyOutletResult, compute_single_pass_steady_outlet};
