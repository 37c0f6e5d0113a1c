//! Ideal-gas molar concentrations and molar flows of the sweep gas.

use cx_core::units::celsius_to_kelvin;
use cx_core::units::constants::R_KPA_L_PER_MOL_K;

/// Total molar concentration of an ideal gas [mmol/L].
pub fn molar_concentration_mmol_l(p_total_kpa: f64, temperature_c: f64) -> f64 {
    let temperature_k = celsius_to_kelvin(temperature_c);
    (p_total_kpa / (R_KPA_L_PER_MOL_K * temperature_k)) * 1000.0
}

/// Total molar flow carried by a gas stream [mmol/min].
pub fn total_molar_flow_mmol_min(gas_flow_ml_min: f64, p_total_kpa: f64, temperature_c: f64) -> f64 {
    (gas_flow_ml_min / 1000.0) * molar_concentration_mmol_l(p_total_kpa, temperature_c)
}

/// Molar supply rate of one species in a gas stream [mmol/min].
pub fn species_molar_flow_mmol_min(
    gas_flow_ml_min: f64,
    mole_fraction: f64,
    p_total_kpa: f64,
    temperature_c: f64,
) -> f64 {
    (gas_flow_ml_min / 1000.0) * mole_fraction * molar_concentration_mmol_l(p_total_kpa, temperature_c)
}
