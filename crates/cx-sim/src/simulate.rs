//! Fixed-duration single-pass simulation.

use crate::error::SimResult;
use cx_gas::SolubilityModel;
use cx_project::{SimulationInputs, validate_inputs};
use cx_transfer::{
    Co2ConditioningOutlet, DissolvedGas, PassMetadata, bicarbonate_ph, compute_co2_conditioning_outlet,
    compute_single_pass_steady_outlet, equilibrium_concentrations,
};
use serde::Serialize;

/// Run bookkeeping plus the pass metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    pub n_steps: usize,
    pub dt_s: f64,
    pub t_end_s: f64,
    #[serde(flatten)]
    pub pass: PassMetadata,
}

/// Dissolved CO2 and pH across the conditioning pathway.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Co2Summary {
    pub co2_in_mmol_l: f64,
    pub ph_in: f64,
    #[serde(flatten)]
    pub outlet: Co2ConditioningOutlet,
    pub ph_out: f64,
}

/// Result of one [`simulate`] call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutputs {
    pub time_s: Vec<f64>,
    pub c_o2_mmol_l: Vec<f64>,
    pub c_n2_mmol_l: Vec<f64>,
    pub cstar_o2_mmol_l: f64,
    pub cstar_n2_mmol_l: f64,
    pub metadata: RunMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co2: Option<Co2Summary>,
}

impl SimulationOutputs {
    /// Last sampled outlet concentrations.
    pub fn final_outlet(&self) -> DissolvedGas {
        DissolvedGas::new(
            self.c_o2_mmol_l.last().copied().unwrap_or_default(),
            self.c_n2_mmol_l.last().copied().unwrap_or_default(),
        )
    }

    pub fn len(&self) -> usize {
        self.time_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_s.is_empty()
    }
}

/// Simulate the tubing outlet over a uniform time grid.
///
/// The outlet steps from the inlet value to the steady outlet once the
/// liquid residence time has elapsed. Identical inputs give bit-identical
/// outputs.
pub fn simulate(inputs: &SimulationInputs, solubility: &dyn SolubilityModel) -> SimResult<SimulationOutputs> {
    validate_inputs(inputs)?;

    let cstar = equilibrium_concentrations(inputs, solubility)?;
    let inlet = DissolvedGas::initial(inputs);
    let steady = compute_single_pass_steady_outlet(inputs, solubility, inlet)?;
    let residence_time_s = steady.metadata.residence_time_s;

    let n_steps = (inputs.t_end_s / inputs.dt_s).floor() as usize + 1;
    let time_s: Vec<f64> = (0..n_steps).map(|i| i as f64 * inputs.dt_s).collect();
    let sample = |t: f64| {
        if t < residence_time_s {
            inlet
        } else {
            steady.outlet
        }
    };
    let c_o2_mmol_l = time_s.iter().map(|&t| sample(t).o2).collect();
    let c_n2_mmol_l = time_s.iter().map(|&t| sample(t).n2).collect();

    let co2 = if inputs.co2.enabled {
        let stage = &inputs.co2;
        let outlet = compute_co2_conditioning_outlet(inputs, solubility, stage.c_co2_init_mmol_l)?;
        Some(Co2Summary {
            co2_in_mmol_l: stage.c_co2_init_mmol_l,
            ph_in: bicarbonate_ph(stage.hco3_mmol_l, stage.c_co2_init_mmol_l, stage.pka_app)?,
            ph_out: bicarbonate_ph(stage.hco3_mmol_l, outlet.co2_final_outlet_mmol_l, stage.pka_app)?,
            outlet,
        })
    } else {
        None
    };

    tracing::debug!(
        n_steps,
        solver = steady.metadata.solver,
        limited = steady.metadata.o2_transfer_limited,
        "simulation complete"
    );

    Ok(SimulationOutputs {
        time_s,
        c_o2_mmol_l,
        c_n2_mmol_l,
        cstar_o2_mmol_l: cstar.o2,
        cstar_n2_mmol_l: cstar.n2,
        metadata: RunMetadata {
            n_steps,
            dt_s: inputs.dt_s,
            t_end_s: inputs.t_end_s,
            pass: steady.metadata,
        },
        co2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use cx_gas::ConstantSolubility;

    #[test]
    fn grid_size_and_spacing() {
        let inputs = SimulationInputs {
            t_end_s: 10.0,
            dt_s: 3.0,
            ..SimulationInputs::default()
        };
        let out = simulate(&inputs, &ConstantSolubility::default()).unwrap();
        assert_eq!(out.time_s, vec![0.0, 3.0, 6.0, 9.0]);
        assert_eq!(out.metadata.n_steps, 4);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn inlet_is_held_until_residence_time() {
        let inputs = SimulationInputs::default();
        let out = simulate(&inputs, &ConstantSolubility::default()).unwrap();
        let tau = out.metadata.pass.residence_time_s;
        for (i, t) in out.time_s.iter().enumerate() {
            if *t < tau {
                assert_eq!(out.c_o2_mmol_l[i], inputs.c_o2_init_mmol_l);
            } else {
                assert_eq!(out.c_o2_mmol_l[i], out.final_outlet().o2);
            }
        }
    }

    #[test]
    fn invalid_inputs_are_rejected_before_solving() {
        let inputs = SimulationInputs {
            y_o2: 1.5,
            dt_s: 0.0,
            ..SimulationInputs::default()
        };
        match simulate(&inputs, &ConstantSolubility::default()) {
            Err(SimError::Validation(v)) => assert!(v.len() >= 3),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn co2_summary_only_when_enabled() {
        let sol = ConstantSolubility::default();
        let mut inputs = SimulationInputs::default();
        assert!(simulate(&inputs, &sol).unwrap().co2.is_none());

        inputs.co2.enabled = true;
        let summary = simulate(&inputs, &sol).unwrap().co2.unwrap();
        assert!((summary.ph_in - (6.1 + (24.0f64 / 1.2).log10())).abs() < 1e-12);
        assert!(summary.ph_out.is_finite());
    }

    #[test]
    fn outputs_serialize_flat_metadata() {
        let out = simulate(&SimulationInputs::default(), &ConstantSolubility::default()).unwrap();
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["metadata"]["solver"], "analytical_plug_flow");
        assert_eq!(json["metadata"]["n_steps"], 1801);
        assert!(json["metadata"].get("profiles").is_none());
    }
}
