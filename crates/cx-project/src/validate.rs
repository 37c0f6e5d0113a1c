//! Input validation logic.
//!
//! Every check runs; violations are collected into one [`ValidationError`] so a
//! caller sees all of them at once.

use crate::schema::{GasLiquidModel, SimulationInputs, TransferModel};

/// Tolerance on `y_o2 + y_n2 == 1`.
pub const FRACTION_SUM_TOLERANCE: f64 = 1e-9;

/// One violated configuration rule.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error("{field} must be {requirement}")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
    },

    #[error("{field} is required for {context}")]
    Missing {
        field: &'static str,
        context: &'static str,
    },

    #[error("{selector} must be either {allowed} (got '{value}')")]
    InvalidSelector {
        selector: &'static str,
        value: String,
        allowed: &'static str,
    },

    #[error("{what}")]
    Inconsistent { what: &'static str },
}

/// Aggregated validation failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// True when any issue message contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.issues.iter().any(|i| i.to_string().contains(needle))
    }
}

impl From<ValidationIssue> for ValidationError {
    fn from(issue: ValidationIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Collects issues while checks run.
#[derive(Default)]
struct Checks {
    issues: Vec<ValidationIssue>,
}

impl Checks {
    fn out_of_range(&mut self, field: &'static str, requirement: &'static str) {
        self.issues
            .push(ValidationIssue::OutOfRange { field, requirement });
    }

    fn positive(&mut self, field: &'static str, value: f64) {
        if value.is_nan() || value <= 0.0 {
            self.out_of_range(field, "> 0");
        }
    }

    fn non_negative(&mut self, field: &'static str, value: f64) {
        if value.is_nan() || value < 0.0 {
            self.out_of_range(field, ">= 0");
        }
    }

    fn within(&mut self, field: &'static str, value: f64, lo: f64, hi: f64, requirement: &'static str) {
        if !(lo..=hi).contains(&value) {
            self.out_of_range(field, requirement);
        }
    }

    fn inconsistent(&mut self, cond: bool, what: &'static str) {
        if cond {
            self.issues.push(ValidationIssue::Inconsistent { what });
        }
    }

    fn permeability(&mut self, field: &'static str, value: Option<f64>, context: &'static str) {
        match value {
            None => self.issues.push(ValidationIssue::Missing { field, context }),
            Some(v) => self.non_negative(field, v),
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                issues: self.issues,
            })
        }
    }
}

/// Validate simulation inputs, reporting every violation.
pub fn validate_inputs(inputs: &SimulationInputs) -> Result<(), ValidationError> {
    let mut checks = Checks::default();

    checks.within("y_o2", inputs.y_o2, 0.0, 1.0, "between 0 and 1");
    checks.within("y_n2", inputs.y_n2, 0.0, 1.0, "between 0 and 1");
    checks.inconsistent(
        ((inputs.y_o2 + inputs.y_n2) - 1.0).abs() > FRACTION_SUM_TOLERANCE
            || (inputs.y_o2 + inputs.y_n2).is_nan(),
        "y_o2 + y_n2 must equal 1 within tolerance 1e-9",
    );

    checks.positive("p_total_kpa", inputs.p_total_kpa);
    checks.positive("volume_l", inputs.volume_l);
    checks.positive("flow_ml_min", inputs.flow_ml_min);
    checks.positive("tube_id_mm", inputs.tube_id_mm);
    checks.inconsistent(
        inputs.tube_od_mm <= inputs.tube_id_mm,
        "tube_od_mm must be greater than tube_id_mm",
    );
    checks.inconsistent(
        inputs.shell_id_mm <= inputs.tube_od_mm,
        "shell_id_mm must be greater than tube_od_mm",
    );
    checks.positive("tube_length_cm", inputs.tube_length_cm);
    checks.positive("gas_flow_ml_min", inputs.gas_flow_ml_min);
    if let Some(holdup) = inputs.total_hold_up_volume_ml {
        checks.positive("total_hold_up_volume_ml", holdup);
    }
    checks.positive("t_end_s", inputs.t_end_s);
    checks.positive("dt_s", inputs.dt_s);
    checks.inconsistent(inputs.dt_s > inputs.t_end_s, "dt_s must be <= t_end_s");

    checks.non_negative("kla_o2_s_inv", inputs.kla_o2_s_inv);
    checks.non_negative("kla_n2_s_inv", inputs.kla_n2_s_inv);
    checks.non_negative("kla_co2_s_inv", inputs.co2.kla_co2_s_inv);
    checks.non_negative("c_o2_init_mmol_l", inputs.c_o2_init_mmol_l);
    checks.non_negative("c_n2_init_mmol_l", inputs.c_n2_init_mmol_l);
    checks.non_negative("c_co2_init_mmol_l", inputs.co2.c_co2_init_mmol_l);
    checks.positive("hco3_mmol_l", inputs.co2.hco3_mmol_l);
    checks.within(
        "ph_gas_co2_percent",
        inputs.co2.ph_gas_co2_percent,
        0.0,
        100.0,
        "between 0 and 100",
    );
    checks.positive("ph_gas_flow_ml_min", inputs.co2.ph_gas_flow_ml_min);
    checks.positive("ph_tube_length_cm", inputs.co2.ph_tube_length_cm);

    if inputs.gas_liquid_model == GasLiquidModel::Segmented && inputs.n_segments < 2 {
        checks.out_of_range("n_segments", ">= 2 when gas_liquid_model='segmented'");
    }

    if inputs.transfer_model == TransferModel::Permeability {
        if let Some(od) = inputs.tube_od_override_mm {
            checks.inconsistent(
                od <= inputs.tube_id_mm,
                "tube_od_override_mm must be greater than tube_id_mm in permeability mode",
            );
        }
        checks.permeability(
            "perm_o2_mmol_m_per_m2_s_kpa",
            inputs.perm_o2_mmol_m_per_m2_s_kpa,
            "permeability mode",
        );
        checks.permeability(
            "perm_n2_mmol_m_per_m2_s_kpa",
            inputs.perm_n2_mmol_m_per_m2_s_kpa,
            "permeability mode",
        );
    }
    if inputs.co2.co2_transfer_model == TransferModel::Permeability {
        checks.permeability(
            "perm_co2_mmol_m_per_m2_s_kpa",
            inputs.co2.perm_co2_mmol_m_per_m2_s_kpa,
            "co2_transfer_model='permeability'",
        );
    }

    checks.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> SimulationInputs {
        SimulationInputs {
            y_o2: 0.21,
            y_n2: 0.79,
            p_total_kpa: 101.325,
            temperature_c: 25.0,
            flow_ml_min: 10.0,
            gas_flow_ml_min: 100.0,
            ..SimulationInputs::default()
        }
    }

    #[test]
    fn accepts_baseline_and_defaults() {
        validate_inputs(&baseline()).unwrap();
        validate_inputs(&SimulationInputs::default()).unwrap();
    }

    #[test]
    fn accepts_fraction_sum_within_tolerance() {
        let inputs = SimulationInputs {
            y_n2: 0.79 + 5e-10,
            ..baseline()
        };
        validate_inputs(&inputs).unwrap();
    }

    #[test]
    fn rejects_fraction_sum_outside_tolerance() {
        let inputs = SimulationInputs {
            y_n2: 0.79000001,
            ..baseline()
        };
        let err = validate_inputs(&inputs).unwrap_err();
        assert!(err.mentions("y_o2 + y_n2 must equal 1"));
        assert_eq!(err.len(), 1);
    }

    #[test]
    fn rejects_negative_kla() {
        let inputs = SimulationInputs {
            kla_o2_s_inv: -0.01,
            ..baseline()
        };
        let err = validate_inputs(&inputs).unwrap_err();
        assert!(err.mentions("kla_o2_s_inv must be >= 0"));
    }

    #[test]
    fn rejects_non_positive_pressure() {
        let inputs = SimulationInputs {
            p_total_kpa: 0.0,
            ..baseline()
        };
        let err = validate_inputs(&inputs).unwrap_err();
        assert!(err.mentions("p_total_kpa must be > 0"));
    }

    #[test]
    fn rejects_bad_geometry_ordering() {
        let inputs = SimulationInputs {
            tube_od_mm: 3.0,
            shell_id_mm: 2.9,
            ..baseline()
        };
        let err = validate_inputs(&inputs).unwrap_err();
        assert!(err.mentions("tube_od_mm must be greater than tube_id_mm"));
        assert!(err.mentions("shell_id_mm must be greater than tube_od_mm"));
    }

    #[test]
    fn rejects_time_step_exceeding_horizon() {
        let inputs = SimulationInputs {
            t_end_s: 1.0,
            dt_s: 2.0,
            ..baseline()
        };
        let err = validate_inputs(&inputs).unwrap_err();
        assert!(err.mentions("dt_s must be <= t_end_s"));
    }

    #[test]
    fn segmented_requires_two_segments() {
        let inputs = SimulationInputs {
            gas_liquid_model: GasLiquidModel::Segmented,
            n_segments: 1,
            ..baseline()
        };
        let err = validate_inputs(&inputs).unwrap_err();
        assert!(err.mentions("n_segments must be >= 2"));

        // Segment count is irrelevant in lumped mode.
        let lumped = SimulationInputs {
            n_segments: 1,
            ..baseline()
        };
        validate_inputs(&lumped).unwrap();
    }

    #[test]
    fn permeability_mode_requires_values() {
        let inputs = SimulationInputs {
            transfer_model: TransferModel::Permeability,
            perm_o2_mmol_m_per_m2_s_kpa: None,
            perm_n2_mmol_m_per_m2_s_kpa: Some(-1.0),
            tube_od_override_mm: Some(3.0),
            ..baseline()
        };
        let err = validate_inputs(&inputs).unwrap_err();
        assert!(err.mentions("perm_o2_mmol_m_per_m2_s_kpa is required for permeability mode"));
        assert!(err.mentions("perm_n2_mmol_m_per_m2_s_kpa must be >= 0"));
        assert!(err.mentions("tube_od_override_mm must be greater than tube_id_mm"));
        assert_eq!(err.len(), 3);
    }

    #[test]
    fn co2_stage_checks() {
        let mut inputs = baseline();
        inputs.co2.hco3_mmol_l = 0.0;
        inputs.co2.ph_gas_co2_percent = 120.0;
        inputs.co2.co2_transfer_model = TransferModel::Permeability;
        inputs.co2.perm_co2_mmol_m_per_m2_s_kpa = None;
        let err = validate_inputs(&inputs).unwrap_err();
        assert!(err.mentions("hco3_mmol_l must be > 0"));
        assert!(err.mentions("ph_gas_co2_percent must be between 0 and 100"));
        assert!(err.mentions("perm_co2_mmol_m_per_m2_s_kpa is required"));
    }

    #[test]
    fn collects_every_violation() {
        let inputs = SimulationInputs {
            p_total_kpa: -1.0,
            flow_ml_min: 0.0,
            gas_flow_ml_min: 0.0,
            c_o2_init_mmol_l: -0.1,
            ..baseline()
        };
        let err = validate_inputs(&inputs).unwrap_err();
        assert_eq!(err.len(), 4);
        let msg = err.to_string();
        assert_eq!(msg.matches("; ").count(), 3);
    }

    #[test]
    fn nan_values_are_rejected() {
        let inputs = SimulationInputs {
            flow_ml_min: f64::NAN,
            ..baseline()
        };
        let err = validate_inputs(&inputs).unwrap_err();
        assert!(err.mentions("flow_ml_min must be > 0"));
    }
}
