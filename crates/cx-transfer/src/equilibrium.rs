//! Equilibrium concentrations, gas supply rates and permeability conversion.

use crate::error::{TransferError, TransferResult};
use crate::geometry::tube_volume_ml;
use cx_core::floored_div;
use cx_core::units::constants::ATM_KPA;
use cx_core::units::{cm, ml, mm};
use cx_gas::{Composition, SolubilityModel, Species, species_molar_flow_mmol_min};
use cx_project::{SimulationInputs, TransferModel};
use serde::Serialize;
use std::f64::consts::PI;

/// Air composition used as the dissolved-gas reference.
pub const REFERENCE_Y_O2: f64 = 0.21;
pub const REFERENCE_Y_N2: f64 = 0.79;

/// Dissolved O2/N2 pair [mmol/L].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DissolvedGas {
    pub o2: f64,
    pub n2: f64,
}

impl DissolvedGas {
    pub fn new(o2: f64, n2: f64) -> Self {
        Self { o2, n2 }
    }

    /// Initial vessel concentrations of a configuration.
    pub fn initial(inputs: &SimulationInputs) -> Self {
        Self::new(inputs.c_o2_init_mmol_l, inputs.c_n2_init_mmol_l)
    }
}

/// Equilibrium concentration against the O2/N2 sweep gas [mmol/L].
///
/// The sweep gas carries no CO2, so CO2 equilibrates to zero here.
pub fn equilibrium_concentration(
    species: Species,
    inputs: &SimulationInputs,
    solubility: &dyn SolubilityModel,
) -> TransferResult<f64> {
    let gas = inputs.gas_composition()?;
    let partial_kpa = gas.partial_pressure(species, inputs.p_total_kpa);
    Ok(solubility.equilibrium(species, inputs.temperature_c, partial_kpa)?)
}

/// O2 and N2 equilibrium concentrations [mmol/L].
pub fn equilibrium_concentrations(
    inputs: &SimulationInputs,
    solubility: &dyn SolubilityModel,
) -> TransferResult<DissolvedGas> {
    Ok(DissolvedGas::new(
        equilibrium_concentration(Species::O2, inputs, solubility)?,
        equilibrium_concentration(Species::N2, inputs, solubility)?,
    ))
}

/// Concentrations in equilibrium with air at one standard atmosphere [mmol/L].
pub fn reference_concentrations(
    temperature_c: f64,
    solubility: &dyn SolubilityModel,
) -> TransferResult<DissolvedGas> {
    let air = Composition::oxygen_nitrogen(REFERENCE_Y_O2, REFERENCE_Y_N2)?;
    let at = |species| {
        solubility.equilibrium(
            species,
            temperature_c,
            air.partial_pressure(species, ATM_KPA),
        )
    };
    Ok(DissolvedGas::new(at(Species::O2)?, at(Species::N2)?))
}

/// Concentration as a percentage of a reference concentration.
pub fn percent_of_reference(c_mmol_l: f64, reference_mmol_l: f64) -> f64 {
    floored_div(c_mmol_l, reference_mmol_l) * 100.0
}

/// Molar supply of one species carried by a gas stream [mmol/min].
pub fn gas_molar_supply_rate(
    gas_flow_ml_min: f64,
    mole_fraction: f64,
    p_total_kpa: f64,
    temperature_c: f64,
) -> f64 {
    species_molar_flow_mmol_min(gas_flow_ml_min, mole_fraction, p_total_kpa, temperature_c)
}

fn permeability_of(species: Species, inputs: &SimulationInputs) -> Option<f64> {
    match species {
        Species::O2 => inputs.perm_o2_mmol_m_per_m2_s_kpa,
        Species::N2 => inputs.perm_n2_mmol_m_per_m2_s_kpa,
        Species::CO2 => inputs.co2.perm_co2_mmol_m_per_m2_s_kpa,
    }
}

/// Convert wall permeability into an equivalent first-order rate [1/s].
///
/// `rate = (permeability / wall_thickness) * (area / volume) / solubility`,
/// with the outer wall area and the lumen liquid volume.
pub fn effective_kla_from_permeability(
    species: Species,
    inputs: &SimulationInputs,
    solubility: &dyn SolubilityModel,
) -> TransferResult<f64> {
    let od_mm = inputs.wall_od_mm();
    if od_mm <= inputs.tube_id_mm {
        return Err(TransferError::InvalidGeometry {
            what: "tube_od_mm must be greater than tube_id_mm in permeability mode",
        });
    }
    let perm = permeability_of(species, inputs)
        .ok_or(TransferError::MissingPermeability { species })?;

    let wall_thickness = (mm(od_mm) - mm(inputs.tube_id_mm)) / 2.0;
    let area = mm(od_mm) * cm(inputs.tube_length_cm) * PI;
    let volume = ml(tube_volume_ml(inputs.tube_id_mm, inputs.tube_length_cm));
    // mmol/(L·kPa) -> mmol/(m³·kPa)
    let solubility_m3 = solubility.solubility(species, inputs.temperature_c)? * 1000.0;

    let flux_per_volume = (perm / wall_thickness.value) * (area.value / volume.value);
    Ok(flux_per_volume / solubility_m3)
}

/// First-order rate for a species under the selected transfer model [1/s].
pub fn effective_kla(
    species: Species,
    model: TransferModel,
    kla_s_inv: f64,
    inputs: &SimulationInputs,
    solubility: &dyn SolubilityModel,
) -> TransferResult<f64> {
    match model {
        TransferModel::Kla => Ok(kla_s_inv),
        TransferModel::Permeability => effective_kla_from_permeability(species, inputs, solubility),
    }
}
