//! Liquid-flow sweeps.
//!
//! Each flow point is an independent [`simulate`] call, so points are
//! evaluated in parallel with rayon and gathered back in flow order.

use crate::error::{SimError, SimResult};
use crate::simulate::simulate;
use cx_core::units::constants::ATM_KPA;
use cx_gas::SolubilityModel;
use cx_project::{PressureMode, SimulationInputs};
use cx_transfer::{percent_of_reference, reference_concentrations};
use rayon::prelude::*;
use serde::Serialize;

/// Linearly spaced liquid flows [mL/min].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSweep {
    min_ml_min: f64,
    max_ml_min: f64,
    points: usize,
}

impl FlowSweep {
    pub fn new(min_ml_min: f64, max_ml_min: f64, points: usize) -> SimResult<Self> {
        if points < 2 {
            return Err(SimError::InvalidArg {
                what: "sweep needs at least 2 points",
            });
        }
        if !(min_ml_min.is_finite() && max_ml_min.is_finite()) || min_ml_min >= max_ml_min {
            return Err(SimError::InvalidArg {
                what: "sweep min must be below max",
            });
        }
        Ok(Self {
            min_ml_min,
            max_ml_min,
            points,
        })
    }

    /// Flow values, with the last point exactly at `max`.
    pub fn flows(&self) -> Vec<f64> {
        let delta = (self.max_ml_min - self.min_ml_min) / (self.points - 1) as f64;
        let mut flows: Vec<f64> = (0..self.points)
            .map(|i| self.min_ml_min + i as f64 * delta)
            .collect();
        flows[self.points - 1] = self.max_ml_min;
        flows
    }
}

/// One evaluated flow point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepRow {
    pub flow_ml_min: f64,
    pub p_total_kpa: f64,
    pub delta_p_mbar: f64,
    pub c_o2_out_mmol_l: f64,
    pub c_n2_out_mmol_l: f64,
    /// O2 leaving the tubing in the liquid [mmol/min].
    pub o2_outflow_mmol_min: f64,
    /// O2 added relative to the inlet [mmol/min].
    pub net_o2_added_mmol_min: f64,
    pub do_percent: f64,
    pub o2_transfer_limited: bool,
}

/// Run [`simulate`] across a flow sweep.
///
/// `pressure` re-resolves the gas pressure from the configured gas flow;
/// without it the configured total pressure is kept.
pub fn run_flow_sweep(
    inputs: &SimulationInputs,
    solubility: &dyn SolubilityModel,
    sweep: &FlowSweep,
    pressure: Option<PressureMode>,
) -> SimResult<Vec<SweepRow>> {
    let mode = pressure.unwrap_or(PressureMode::Manual {
        p_total_kpa: inputs.p_total_kpa,
    });
    // Pressure follows the gas stream; the swept liquid flow must not drive it
    let resolved = mode.resolve(inputs.gas_flow_ml_min, ATM_KPA);
    let reference_o2 = reference_concentrations(inputs.temperature_c, solubility)?.o2;

    let rows = sweep
        .flows()
        .into_par_iter()
        .map(|flow_ml_min| {
            let point = SimulationInputs {
                flow_ml_min,
                p_total_kpa: resolved.p_total_kpa,
                ..inputs.clone()
            };
            let out = simulate(&point, solubility)?;
            let outlet = out.final_outlet();
            let q_l_min = point.liquid_flow_l_min();
            Ok(SweepRow {
                flow_ml_min,
                p_total_kpa: resolved.p_total_kpa,
                delta_p_mbar: resolved.delta_p_mbar,
                c_o2_out_mmol_l: outlet.o2,
                c_n2_out_mmol_l: outlet.n2,
                o2_outflow_mmol_min: outlet.o2 * q_l_min,
                net_o2_added_mmol_min: (outlet.o2 - point.c_o2_init_mmol_l) * q_l_min,
                do_percent: percent_of_reference(outlet.o2, reference_o2),
                o2_transfer_limited: out.metadata.pass.o2_transfer_limited,
            })
        })
        .collect::<SimResult<Vec<_>>>()?;

    tracing::debug!(points = rows.len(), mode = mode.label(), "flow sweep complete");
    Ok(rows)
}

/// Oxygen demand of a cell population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellDemand {
    pub total_cells: f64,
    /// Specific uptake per cell [mol/s].
    pub q_o2_cell_mol_s: f64,
    /// Safety factor applied to the demand.
    pub margin: f64,
}

impl CellDemand {
    /// Demand including margin [mmol/min].
    pub fn o2_demand_mmol_min(&self) -> f64 {
        self.total_cells * self.q_o2_cell_mol_s * 60.0 * 1000.0 * self.margin
    }
}

/// Lowest swept flow whose net O2 addition covers `demand`.
pub fn recommended_flow<'a>(rows: &'a [SweepRow], demand: &CellDemand) -> Option<&'a SweepRow> {
    let needed = demand.o2_demand_mmol_min();
    rows.iter().find(|row| row.net_o2_added_mmol_min >= needed)
}
