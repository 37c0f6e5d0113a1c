//! Tubing hold-up volumes and residence times.

use crate::error::{TransferError, TransferResult};
use cx_core::units::{Area, Volume, cm, mm, to_ml};
use cx_project::SimulationInputs;
use std::f64::consts::PI;

fn circle_area(diameter_mm: f64) -> Area {
    let radius = mm(diameter_mm) / 2.0;
    radius * radius * PI
}

/// Liquid hold-up volume of the tube lumen [mL].
pub fn tube_volume_ml(tube_id_mm: f64, tube_length_cm: f64) -> f64 {
    let volume: Volume = circle_area(tube_id_mm) * cm(tube_length_cm);
    to_ml(volume)
}

/// Gas hold-up volume between the shell and the tube wall [mL].
///
/// Shell ID must exceed tube OD; this is not re-checked here.
pub fn annulus_volume_ml(shell_id_mm: f64, tube_od_mm: f64, tube_length_cm: f64) -> f64 {
    let area: Area = circle_area(shell_id_mm) - circle_area(tube_od_mm);
    to_ml(area * cm(tube_length_cm))
}

/// Time for a stream to sweep a hold-up volume [s].
pub fn residence_time_s(flow_ml_min: f64, volume_ml: f64) -> TransferResult<f64> {
    if flow_ml_min.is_nan() || flow_ml_min <= 0.0 {
        return Err(TransferError::NonPositiveFlow {
            what: "flow",
            value: flow_ml_min,
        });
    }
    Ok((volume_ml / flow_ml_min) * 60.0)
}

/// Liquid volume between tubing outlet and vessel return [mL].
pub fn holdup_volume_ml(inputs: &SimulationInputs) -> f64 {
    inputs
        .total_hold_up_volume_ml
        .unwrap_or_else(|| tube_volume_ml(inputs.tube_id_mm, inputs.tube_length_cm))
}

/// Liquid transport delay through the hold-up volume [s].
pub fn transport_delay_s(inputs: &SimulationInputs) -> TransferResult<f64> {
    residence_time_s(inputs.flow_ml_min, holdup_volume_ml(inputs))
}
