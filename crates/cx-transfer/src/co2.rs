//! CO2/pH conditioning stage.
//!
//! An optional upstream section equilibrates the liquid against a CO2-rich
//! gas. The O2/N2 section downstream sees CO2-free gas and strips CO2. The
//! order of the two sections is configurable.

use crate::counterflow::{CounterflowSolver, CounterflowSpecies};
use crate::equilibrium::{effective_kla, gas_molar_supply_rate};
use crate::error::{TransferError, TransferResult};
use crate::geometry::{residence_time_s, tube_volume_ml};
use crate::lumped::{apply_supply_cap, plug_flow_outlet};
use cx_gas::{Composition, SolubilityModel, Species, total_molar_flow_mmol_min};
use cx_project::SimulationInputs;
use serde::Serialize;

/// Smallest dissolved CO2 used in the pH logarithm [mmol/L].
pub const CO2_FLOOR_MMOL_L: f64 = 1e-12;

/// Bicarbonate buffer pH (Henderson-Hasselbalch, concentration form).
pub fn bicarbonate_ph(hco3_mmol_l: f64, c_co2_mmol_l: f64, pka_app: f64) -> TransferResult<f64> {
    if hco3_mmol_l.is_nan() || hco3_mmol_l <= 0.0 {
        return Err(TransferError::DegeneratePh { hco3_mmol_l });
    }
    let c_co2 = if c_co2_mmol_l > 0.0 {
        c_co2_mmol_l
    } else {
        CO2_FLOOR_MMOL_L
    };
    Ok(pka_app + (hco3_mmol_l / c_co2).log10())
}

/// CO2 after two serial plug-flow stages, returned as (after stage 1, after stage 2).
pub fn two_stage_co2_outlet(
    c_in_mmol_l: f64,
    cstar_stage1_mmol_l: f64,
    cstar_stage2_mmol_l: f64,
    kla_s_inv: f64,
    tau_stage1_s: f64,
    tau_stage2_s: f64,
) -> (f64, f64) {
    let after_1 = plug_flow_outlet(c_in_mmol_l, cstar_stage1_mmol_l, kla_s_inv, tau_stage1_s);
    let after_2 = plug_flow_outlet(after_1, cstar_stage2_mmol_l, kla_s_inv, tau_stage2_s);
    (after_1, after_2)
}

/// CO2 at each point of the two-stage pathway [mmol/L].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Co2ConditioningOutlet {
    pub co2_after_ph_stage_mmol_l: f64,
    pub co2_after_o2_stage_mmol_l: f64,
    pub co2_final_outlet_mmol_l: f64,
    /// The pH stage's gas-supply cap engaged.
    pub ph_stage_limited: bool,
}

/// Rates and constants shared by every evaluation of the two-stage pathway.
#[derive(Debug, Clone, Copy)]
struct Co2Pathway {
    enabled: bool,
    reverse: bool,
    kla_s_inv: f64,
    cstar_ph_stage_mmol_l: f64,
    tau_ph_stage_s: f64,
    tau_o2_stage_s: f64,
    supply_mmol_min: f64,
    liquid_flow_l_min: f64,
}

impl Co2Pathway {
    fn new(inputs: &SimulationInputs, solubility: &dyn SolubilityModel) -> TransferResult<Self> {
        let co2 = &inputs.co2;
        let kla_s_inv = effective_kla(
            Species::CO2,
            co2.co2_transfer_model,
            co2.kla_co2_s_inv,
            inputs,
            solubility,
        )?;
        let gas = Composition::co2_in_carrier(co2.ph_gas_co2_percent)?;
        let cstar_ph_stage_mmol_l = solubility.equilibrium(
            Species::CO2,
            inputs.temperature_c,
            gas.partial_pressure(Species::CO2, inputs.p_total_kpa),
        )?;
        let tau_ph_stage_s = residence_time_s(
            inputs.flow_ml_min,
            tube_volume_ml(inputs.tube_id_mm, co2.ph_tube_length_cm),
        )?;
        let tau_o2_stage_s = residence_time_s(
            inputs.flow_ml_min,
            tube_volume_ml(inputs.tube_id_mm, inputs.tube_length_cm),
        )?;
        let supply_mmol_min = gas_molar_supply_rate(
            co2.ph_gas_flow_ml_min,
            co2.y_co2(),
            inputs.p_total_kpa,
            inputs.temperature_c,
        );

        Ok(Self {
            enabled: co2.enabled,
            reverse: co2.reverse_stage_order,
            kla_s_inv,
            cstar_ph_stage_mmol_l,
            tau_ph_stage_s,
            tau_o2_stage_s,
            supply_mmol_min,
            liquid_flow_l_min: inputs.liquid_flow_l_min(),
        })
    }

    fn ph_stage(&self, c_in: f64) -> (f64, bool) {
        if !self.enabled {
            return (c_in, false);
        }
        let (after, _) = two_stage_co2_outlet(
            c_in,
            self.cstar_ph_stage_mmol_l,
            self.cstar_ph_stage_mmol_l,
            self.kla_s_inv,
            self.tau_ph_stage_s,
            0.0,
        );
        let capped = apply_supply_cap(c_in, after, self.supply_mmol_min, self.liquid_flow_l_min);
        (capped.outlet_mmol_l, capped.limited)
    }

    fn o2_stage(&self, c_in: f64) -> f64 {
        let (_, after) = two_stage_co2_outlet(c_in, 0.0, 0.0, self.kla_s_inv, 0.0, self.tau_o2_stage_s);
        after
    }

    fn evaluate(&self, c_in: f64) -> Co2ConditioningOutlet {
        if self.reverse {
            let after_o2 = self.o2_stage(c_in);
            let (after_ph, limited) = self.ph_stage(after_o2);
            Co2ConditioningOutlet {
                co2_after_ph_stage_mmol_l: after_ph,
                co2_after_o2_stage_mmol_l: after_o2,
                co2_final_outlet_mmol_l: after_ph,
                ph_stage_limited: limited,
            }
        } else {
            let (after_ph, limited) = self.ph_stage(c_in);
            let after_o2 = self.o2_stage(after_ph);
            Co2ConditioningOutlet {
                co2_after_ph_stage_mmol_l: after_ph,
                co2_after_o2_stage_mmol_l: after_o2,
                co2_final_outlet_mmol_l: after_o2,
                ph_stage_limited: limited,
            }
        }
    }
}

/// Dissolved CO2 through the pH and O2 sections in the configured order.
///
/// With the stage disabled the pH section passes CO2 through unchanged and
/// only the stripping in the O2 section remains.
pub fn compute_co2_conditioning_outlet(
    inputs: &SimulationInputs,
    solubility: &dyn SolubilityModel,
    c_co2_in_mmol_l: f64,
) -> TransferResult<Co2ConditioningOutlet> {
    Ok(Co2Pathway::new(inputs, solubility)?.evaluate(c_co2_in_mmol_l))
}

/// Reusable evaluator for repeated pathway calls with fixed inputs.
#[derive(Debug, Clone, Copy)]
pub struct Co2Conditioner {
    pathway: Co2Pathway,
}

impl Co2Conditioner {
    pub fn new(inputs: &SimulationInputs, solubility: &dyn SolubilityModel) -> TransferResult<Self> {
        Ok(Self {
            pathway: Co2Pathway::new(inputs, solubility)?,
        })
    }

    pub fn outlet(&self, c_co2_in_mmol_l: f64) -> Co2ConditioningOutlet {
        self.pathway.evaluate(c_co2_in_mmol_l)
    }
}

/// Axial profiles of the pH section solved as counterflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Co2StageProfiles {
    /// Liquid CO2 at each segment boundary (n + 1) [mmol/L].
    pub liq_profile_co2_mmol_l: Vec<f64>,
    /// CO2 equilibrium of the gas feeding each segment (n) [mmol/L].
    pub gas_profile_cstar_co2_mmol_l: Vec<f64>,
    /// Liquid pH at each segment boundary (n + 1).
    pub liq_profile_ph: Vec<f64>,
    pub co2_transfer_limited: bool,
    pub iterations: usize,
    pub converged: bool,
}

/// Segmented counterflow profiles of the pH section.
///
/// The balance of the conditioning gas is an inert carrier. At least two
/// segments are always used.
pub fn co2_stage_profiles(
    inputs: &SimulationInputs,
    solubility: &dyn SolubilityModel,
    c_co2_in_mmol_l: f64,
    n_segments: usize,
) -> TransferResult<Co2StageProfiles> {
    let co2 = &inputs.co2;
    let n = n_segments.max(2);
    let tau_s = residence_time_s(
        inputs.flow_ml_min,
        tube_volume_ml(inputs.tube_id_mm, co2.ph_tube_length_cm),
    )?;
    let kla_s_inv = effective_kla(
        Species::CO2,
        co2.co2_transfer_model,
        co2.kla_co2_s_inv,
        inputs,
        solubility,
    )?;
    let cstar_pure = solubility.equilibrium(Species::CO2, inputs.temperature_c, inputs.p_total_kpa)?;
    let total_gas = total_molar_flow_mmol_min(co2.ph_gas_flow_ml_min, inputs.p_total_kpa, inputs.temperature_c);
    let y_co2 = co2.y_co2();

    let species = [
        CounterflowSpecies {
            cstar_pure_mmol_l: cstar_pure,
            kla_s_inv,
            gas_inlet_mmol_min: total_gas * y_co2,
            liquid_inlet_mmol_l: c_co2_in_mmol_l,
        },
        CounterflowSpecies::inert(total_gas * (1.0 - y_co2)),
    ];
    let solution = CounterflowSolver::new(n).solve(&species, tau_s, inputs.liquid_flow_l_min())?;

    let liq_profile_ph = solution.liquid_mmol_l[0]
        .iter()
        .map(|c| bicarbonate_ph(co2.hco3_mmol_l, c.max(CO2_FLOOR_MMOL_L), co2.pka_app))
        .collect::<TransferResult<Vec<_>>>()?;
    let gas_profile_cstar_co2_mmol_l = solution
        .gas_fraction_profile(0)
        .into_iter()
        .map(|y| cstar_pure * y)
        .collect();

    Ok(Co2StageProfiles {
        liq_profile_co2_mmol_l: solution.liquid_mmol_l[0].clone(),
        gas_profile_cstar_co2_mmol_l,
        liq_profile_ph,
        co2_transfer_limited: solution.limited,
        iterations: solution.iterations,
        converged: solution.converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_gas::ConstantSolubility;
    use cx_project::{Co2StageInputs, TransferModel};

    fn co2_inputs(reverse: bool) -> SimulationInputs {
        SimulationInputs {
            co2: Co2StageInputs {
                enabled: true,
                kla_co2_s_inv: 0.05,
                co2_transfer_model: TransferModel::Kla,
                c_co2_init_mmol_l: 1.0,
                reverse_stage_order: reverse,
                ..Co2StageInputs::default()
            },
            ..SimulationInputs::default()
        }
    }

    #[test]
    fn ph_of_normal_plasma() {
        // 24 mmol/L HCO3-, 1.2 mmol/L CO2 -> pH ≈ 7.4
        let ph = bicarbonate_ph(24.0, 1.2, 6.1).unwrap();
        assert!((ph - (6.1 + 20.0f64.log10())).abs() < 1e-12);
    }

    #[test]
    fn ph_floors_dissolved_co2() {
        let ph = bicarbonate_ph(24.0, 0.0, 6.1).unwrap();
        assert!((ph - (6.1 + (24.0 / 1e-12f64).log10())).abs() < 1e-9);
        assert!(bicarbonate_ph(24.0, -1.0, 6.1).unwrap().is_finite());
    }

    #[test]
    fn ph_rejects_non_positive_bicarbonate() {
        assert_eq!(
            bicarbonate_ph(0.0, 1.2, 6.1),
            Err(TransferError::DegeneratePh { hco3_mmol_l: 0.0 })
        );
        assert!(bicarbonate_ph(-3.0, 1.2, 6.1).is_err());
    }

    #[test]
    fn two_stage_composes_plug_flow() {
        let (a, b) = two_stage_co2_outlet(1.0, 3.0, 0.0, 0.01, 50.0, 100.0);
        assert_eq!(a, plug_flow_outlet(1.0, 3.0, 0.01, 50.0));
        assert_eq!(b, plug_flow_outlet(a, 0.0, 0.01, 100.0));
    }

    #[test]
    fn disabled_stage_only_strips() {
        let sol = ConstantSolubility::default();
        let inputs = SimulationInputs {
            co2: Co2StageInputs {
                enabled: false,
                ..co2_inputs(false).co2
            },
            ..co2_inputs(false)
        };
        let out = compute_co2_conditioning_outlet(&inputs, &sol, 1.0).unwrap();
        assert_eq!(out.co2_after_ph_stage_mmol_l, 1.0);
        assert!(out.co2_final_outlet_mmol_l < 1.0);
        assert!(!out.ph_stage_limited);
    }

    #[test]
    fn stage_order_matters() {
        let sol = ConstantSolubility::default();
        let normal = compute_co2_conditioning_outlet(&co2_inputs(false), &sol, 1.0).unwrap();
        let reversed = compute_co2_conditioning_outlet(&co2_inputs(true), &sol, 1.0).unwrap();
        assert_eq!(normal.co2_final_outlet_mmol_l, normal.co2_after_o2_stage_mmol_l);
        assert_eq!(reversed.co2_final_outlet_mmol_l, reversed.co2_after_ph_stage_mmol_l);
        assert!((normal.co2_final_outlet_mmol_l - reversed.co2_final_outlet_mmol_l).abs() > 1e-6);
        // pH section last leaves more CO2 in the liquid
        assert!(reversed.co2_final_outlet_mmol_l > normal.co2_final_outlet_mmol_l);
    }

    #[test]
    fn conditioner_matches_one_shot() {
        let sol = ConstantSolubility::default();
        let inputs = co2_inputs(false);
        let conditioner = Co2Conditioner::new(&inputs, &sol).unwrap();
        assert_eq!(
            conditioner.outlet(0.7),
            compute_co2_conditioning_outlet(&inputs, &sol, 0.7).unwrap()
        );
    }

    #[test]
    fn starved_ph_gas_is_capped() {
        let sol = ConstantSolubility::default();
        let mut inputs = co2_inputs(false);
        inputs.co2.ph_gas_flow_ml_min = 1e-4;
        let out = compute_co2_conditioning_outlet(&inputs, &sol, 0.0).unwrap();
        assert!(out.ph_stage_limited);
    }

    #[test]
    fn profiles_have_expected_shape() {
        let sol = ConstantSolubility::default();
        let p = co2_stage_profiles(&co2_inputs(false), &sol, 1.0, 30).unwrap();
        assert_eq!(p.liq_profile_co2_mmol_l.len(), 31);
        assert_eq!(p.gas_profile_cstar_co2_mmol_l.len(), 30);
        assert_eq!(p.liq_profile_ph.len(), 31);
        assert_eq!(p.liq_profile_co2_mmol_l[0], 1.0);
        // CO2 rises toward the CO2-rich gas, pH falls
        assert!(p.liq_profile_co2_mmol_l[30] > 1.0);
        assert!(p.liq_profile_ph[30] < p.liq_profile_ph[0]);
    }

    #[test]
    fn profiles_use_at_least_two_segments() {
        let sol = ConstantSolubility::default();
        let p = co2_stage_profiles(&co2_inputs(false), &sol, 1.0, 0).unwrap();
        assert_eq!(p.liq_profile_co2_mmol_l.len(), 3);
    }
}
