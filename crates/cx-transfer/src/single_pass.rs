//! Steady outlet of one tubing pass.

use crate::counterflow::{CounterflowSolver, CounterflowSpecies};
use crate::equilibrium::{DissolvedGas, effective_kla, equilibrium_concentrations, gas_molar_supply_rate};
use crate::error::TransferResult;
use crate::geometry::{annulus_volume_ml, residence_time_s, tube_volume_ml};
use crate::lumped::{apply_supply_cap, plug_flow_outlet};
use cx_gas::{SolubilityModel, Species, total_molar_flow_mmol_min};
use cx_project::{GasLiquidModel, SimulationInputs, TransferModel};
use serde::Serialize;

/// Axial detail of a segmented pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxialProfiles {
    pub gas_out_y_o2: f64,
    pub gas_out_y_n2: f64,
    /// Liquid O2 at each segment boundary (n + 1) [mmol/L].
    pub liq_profile_o2_mmol_l: Vec<f64>,
    /// Liquid N2 at each segment boundary (n + 1) [mmol/L].
    pub liq_profile_n2_mmol_l: Vec<f64>,
    /// O2 mole fraction of the gas feeding each segment (n).
    pub gas_profile_y_o2: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
}

/// Geometry, rates and limiting state of one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassMetadata {
    pub model: &'static str,
    pub solver: &'static str,
    pub transfer_model: TransferModel,
    pub gas_liquid_model: GasLiquidModel,
    pub n_segments: usize,
    pub tube_volume_ml: f64,
    pub annulus_volume_ml: f64,
    pub residence_time_s: f64,
    pub gas_residence_time_s: f64,
    pub effective_kla_o2_s_inv: f64,
    pub effective_kla_n2_s_inv: f64,
    pub o2_supply_rate_mmol_min: f64,
    pub o2_transfer_limited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles: Option<AxialProfiles>,
}

/// Steady outlet concentrations plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SteadyOutletResult {
    pub outlet: DissolvedGas,
    pub metadata: PassMetadata,
}

/// Compute the steady outlet of one tubing pass for an inlet state.
///
/// Selects the kLa or permeability-derived rates and the lumped or segmented
/// coupling from `inputs`. Pure function of its arguments.
pub fn compute_single_pass_steady_outlet(
    inputs: &SimulationInputs,
    solubility: &dyn SolubilityModel,
    inlet: DissolvedGas,
) -> TransferResult<SteadyOutletResult> {
    let tube_ml = tube_volume_ml(inputs.tube_id_mm, inputs.tube_length_cm);
    let annulus_ml = annulus_volume_ml(inputs.shell_id_mm, inputs.tube_od_mm, inputs.tube_length_cm);
    let tau_s = residence_time_s(inputs.flow_ml_min, tube_ml)?;
    let gas_tau_s = residence_time_s(inputs.gas_flow_ml_min, annulus_ml)?;

    let kla_o2 = effective_kla(
        Species::O2,
        inputs.transfer_model,
        inputs.kla_o2_s_inv,
        inputs,
        solubility,
    )?;
    let kla_n2 = effective_kla(
        Species::N2,
        inputs.transfer_model,
        inputs.kla_n2_s_inv,
        inputs,
        solubility,
    )?;

    let o2_supply_rate_mmol_min = gas_molar_supply_rate(
        inputs.gas_flow_ml_min,
        inputs.y_o2,
        inputs.p_total_kpa,
        inputs.temperature_c,
    );
    let liquid_flow_l_min = inputs.liquid_flow_l_min();

    let (outlet, o2_transfer_limited, profiles) = match inputs.gas_liquid_model {
        GasLiquidModel::Lumped => {
            let cstar = equilibrium_concentrations(inputs, solubility)?;
            let o2 = plug_flow_outlet(inlet.o2, cstar.o2, kla_o2, tau_s);
            let n2 = plug_flow_outlet(inlet.n2, cstar.n2, kla_n2, tau_s);
            let capped = apply_supply_cap(inlet.o2, o2, o2_supply_rate_mmol_min, liquid_flow_l_min);
            (DissolvedGas::new(capped.outlet_mmol_l, n2), capped.limited, None)
        }
        GasLiquidModel::Segmented => {
            let total_gas = total_molar_flow_mmol_min(
                inputs.gas_flow_ml_min,
                inputs.p_total_kpa,
                inputs.temperature_c,
            );
            let pure = |species| {
                solubility.equilibrium(species, inputs.temperature_c, inputs.p_total_kpa)
            };
            let species = [
                CounterflowSpecies {
                    cstar_pure_mmol_l: pure(Species::O2)?,
                    kla_s_inv: kla_o2,
                    gas_inlet_mmol_min: total_gas * inputs.y_o2,
                    liquid_inlet_mmol_l: inlet.o2,
                },
                CounterflowSpecies {
                    cstar_pure_mmol_l: pure(Species::N2)?,
                    kla_s_inv: kla_n2,
                    gas_inlet_mmol_min: total_gas * inputs.y_n2,
                    liquid_inlet_mmol_l: inlet.n2,
                },
            ];
            let solution = CounterflowSolver::new(inputs.n_segments).solve(
                &species,
                tau_s,
                liquid_flow_l_min,
            )?;

            let outlet = DissolvedGas::new(solution.outlet(0), solution.outlet(1));
            let limited = solution.limited;
            let profiles = AxialProfiles {
                gas_out_y_o2: solution.gas_outlet_fraction(0),
                gas_out_y_n2: solution.gas_outlet_fraction(1),
                gas_profile_y_o2: solution.gas_fraction_profile(0),
                iterations: solution.iterations,
                converged: solution.converged,
                liq_profile_n2_mmol_l: solution.liquid_mmol_l[1].clone(),
                liq_profile_o2_mmol_l: solution.liquid_mmol_l[0].clone(),
            };
            (outlet, limited, Some(profiles))
        }
    };

    Ok(SteadyOutletResult {
        outlet,
        metadata: PassMetadata {
            model: inputs.transfer_model.model_name(),
            solver: inputs.gas_liquid_model.solver_name(),
            transfer_model: inputs.transfer_model,
            gas_liquid_model: inputs.gas_liquid_model,
            n_segments: inputs.n_segments,
            tube_volume_ml: tube_ml,
            annulus_volume_ml: annulus_ml,
            residence_time_s: tau_s,
            gas_residence_time_s: gas_tau_s,
            effective_kla_o2_s_inv: kla_o2,
            effective_kla_n2_s_inv: kla_n2,
            o2_supply_rate_mmol_min,
            o2_transfer_limited,
            profiles,
        },
    })
}
