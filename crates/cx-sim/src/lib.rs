//! Time-domain simulation of tubing gas exchange.
//!
//! Provides:
//! - Fixed-duration outlet simulation with a residence-time step delay
//! - Transport delay line for recirculating loops
//! - Perfectly mixed vessel coupling: O2/N2 trajectory, time-to-target, pH series
//! - Parallel liquid-flow sweeps and cell-demand flow recommendation

pub mod delay_line;
pub mod error;
pub mod recirculation;
pub mod simulate;
pub mod sweep;

pub use delay_line::{DelayLine, delay_steps};
pub use error::{SimError, SimResult};
pub use recirculation::{
    TimeToTarget, VesselOptions, VesselPhSeries, VesselTrajectory, estimate_time_to_target,
    simulate_vessel, simulate_vessel_ph, target_search_dt_s,
};
pub use simulate::{Co2Summary, RunMetadata, SimulationOutputs, simulate};
pub use sweep::{CellDemand, FlowSweep, SweepRow, recommended_flow, run_flow_sweep};
