//! Simulation input schema.

use crate::validate::ValidationIssue;
use cx_core::units::constants::ATM_KPA;
use cx_gas::{Composition, GasResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Conversion from Barrer to mmol·m/(m²·s·kPa).
pub const BARRER_TO_MMOL_M_PER_M2_S_KPA: f64 = 3.35e-10;

/// How the wall transfer rate is specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferModel {
    /// First-order kLa coefficients given directly.
    #[default]
    Kla,
    /// kLa derived from wall permeability and tube geometry.
    Permeability,
}

impl TransferModel {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Kla => "kla",
            Self::Permeability => "permeability",
        }
    }

    /// Model label reported in run metadata.
    pub fn model_name(&self) -> &'static str {
        match self {
            Self::Kla => "single_pass_tubing_kLa_Henry",
            Self::Permeability => "single_pass_tubing_permeability_Henry",
        }
    }
}

impl fmt::Display for TransferModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TransferModel {
    type Err = ValidationIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "kla" => Ok(Self::Kla),
            "permeability" => Ok(Self::Permeability),
            other => Err(ValidationIssue::InvalidSelector {
                selector: "transfer_model",
                value: other.to_string(),
                allowed: "'kla' or 'permeability'",
            }),
        }
    }
}

/// How gas and liquid phases are coupled along the tube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasLiquidModel {
    /// Uniform gas composition, closed-form plug flow.
    #[default]
    Lumped,
    /// Axially resolved counterflow with gas depletion.
    Segmented,
}

impl GasLiquidModel {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Lumped => "lumped",
            Self::Segmented => "segmented",
        }
    }

    /// Solver label reported in run metadata.
    pub fn solver_name(&self) -> &'static str {
        match self {
            Self::Lumped => "analytical_plug_flow",
            Self::Segmented => "segmented_gas_liquid",
        }
    }
}

impl fmt::Display for GasLiquidModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GasLiquidModel {
    type Err = ValidationIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "lumped" => Ok(Self::Lumped),
            "segmented" => Ok(Self::Segmented),
            other => Err(ValidationIssue::InvalidSelector {
                selector: "gas_liquid_model",
                value: other.to_string(),
                allowed: "'lumped' or 'segmented'",
            }),
        }
    }
}

/// Upstream CO2/pH conditioning section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Co2StageInputs {
    pub enabled: bool,
    pub ph_tube_length_cm: f64,
    pub ph_gas_co2_percent: f64,
    pub ph_gas_flow_ml_min: f64,
    pub kla_co2_s_inv: f64,
    pub co2_transfer_model: TransferModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perm_co2_mmol_m_per_m2_s_kpa: Option<f64>,
    pub c_co2_init_mmol_l: f64,
    pub hco3_mmol_l: f64,
    pub pka_app: f64,
    /// Run the O2 section before the pH section.
    pub reverse_stage_order: bool,
}

impl Default for Co2StageInputs {
    fn default() -> Self {
        let co2_to_o2_perm_ratio = 3250.0 / 600.0;
        Self {
            enabled: false,
            ph_tube_length_cm: 16.0,
            ph_gas_co2_percent: 99.0,
            ph_gas_flow_ml_min: 20.0,
            kla_co2_s_inv: 0.01 * co2_to_o2_perm_ratio,
            co2_transfer_model: TransferModel::Permeability,
            perm_co2_mmol_m_per_m2_s_kpa: Some(3250.0 * BARRER_TO_MMOL_M_PER_M2_S_KPA),
            c_co2_init_mmol_l: 1.2,
            hco3_mmol_l: 24.0,
            pka_app: 6.1,
            reverse_stage_order: false,
        }
    }
}

impl Co2StageInputs {
    /// CO2 mole fraction of the conditioning gas.
    pub fn y_co2(&self) -> f64 {
        self.ph_gas_co2_percent / 100.0
    }
}

/// Complete, immutable configuration of one tubing simulation.
///
/// Values are in the working units named by each field suffix. Derived
/// computations take the record by reference and never mutate it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationInputs {
    pub y_o2: f64,
    pub y_n2: f64,
    pub p_total_kpa: f64,
    pub temperature_c: f64,
    /// Recirculating vessel volume.
    pub volume_l: f64,
    pub flow_ml_min: f64,
    pub tube_id_mm: f64,
    pub tube_od_mm: f64,
    pub shell_id_mm: f64,
    pub tube_length_cm: f64,
    pub gas_flow_ml_min: f64,
    pub kla_o2_s_inv: f64,
    pub kla_n2_s_inv: f64,
    pub c_o2_init_mmol_l: f64,
    pub c_n2_init_mmol_l: f64,
    pub t_end_s: f64,
    pub dt_s: f64,
    pub transfer_model: TransferModel,
    /// Wall OD used for the permeability conversion instead of `tube_od_mm`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tube_od_override_mm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perm_o2_mmol_m_per_m2_s_kpa: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perm_n2_mmol_m_per_m2_s_kpa: Option<f64>,
    pub gas_liquid_model: GasLiquidModel,
    pub n_segments: usize,
    /// Liquid hold-up between tubing outlet and vessel; tube volume when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_hold_up_volume_ml: Option<f64>,
    pub co2: Co2StageInputs,
}

impl Default for SimulationInputs {
    fn default() -> Self {
        Self {
            y_o2: 1.0,
            y_n2: 0.0,
            p_total_kpa: ATM_KPA,
            temperature_c: 37.0,
            volume_l: 1.0,
            flow_ml_min: 4.0,
            tube_id_mm: 3.2,
            tube_od_mm: 4.76,
            shell_id_mm: 5.0,
            tube_length_cm: 160.0,
            gas_flow_ml_min: 2.0,
            kla_o2_s_inv: 0.01,
            kla_n2_s_inv: 0.008,
            c_o2_init_mmol_l: 0.0,
            c_n2_init_mmol_l: 0.0,
            t_end_s: 1800.0,
            dt_s: 1.0,
            transfer_model: TransferModel::Kla,
            tube_od_override_mm: None,
            perm_o2_mmol_m_per_m2_s_kpa: None,
            perm_n2_mmol_m_per_m2_s_kpa: None,
            gas_liquid_model: GasLiquidModel::Lumped,
            n_segments: 40,
            total_hold_up_volume_ml: None,
            co2: Co2StageInputs::default(),
        }
    }
}

impl SimulationInputs {
    /// Liquid flow [L/min].
    pub fn liquid_flow_l_min(&self) -> f64 {
        self.flow_ml_min / 1000.0
    }

    /// Wall OD used for permeability conversions [mm].
    pub fn wall_od_mm(&self) -> f64 {
        self.tube_od_override_mm.unwrap_or(self.tube_od_mm)
    }

    /// Sweep gas of the O2/N2 section.
    pub fn gas_composition(&self) -> GasResult<Composition> {
        Composition::oxygen_nitrogen(self.y_o2, self.y_n2)
    }
}
