//! Perfectly mixed vessel recirculating through the tubing.
//!
//! Each step the single-pass solver treats the current vessel concentration,
//! the treated outlet enters a delay line, and the vessel relaxes toward the
//! delayed outlet: `dC/dt = (Q/V) * (C_delayed - C)`, integrated with
//! explicit Euler.

use crate::delay_line::{DelayLine, delay_steps};
use crate::error::{SimError, SimResult};
use cx_gas::SolubilityModel;
use cx_project::{SimulationInputs, validate_inputs};
use cx_transfer::{
    Co2Conditioner, DissolvedGas, bicarbonate_ph, compute_single_pass_steady_outlet,
    percent_of_reference, transport_delay_s,
};
use serde::Serialize;

/// Upper bound on trajectory samples; the step is coarsened to fit.
pub const MAX_TRAJECTORY_POINTS: usize = 1200;

/// Simulated horizon of the time-to-target search [s].
pub const TARGET_SEARCH_HORIZON_S: f64 = 8.0 * 3600.0;

/// Concentration offset treated as already on target [mmol/L].
pub const TARGET_TOLERANCE_MMOL_L: f64 = 1e-9;

/// Horizon and requested step of a vessel run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VesselOptions {
    pub t_end_s: f64,
    pub dt_s: f64,
}

impl VesselOptions {
    /// Step actually used: coarsened so the run has at most
    /// [`MAX_TRAJECTORY_POINTS`] intervals.
    pub fn effective_dt_s(&self) -> f64 {
        self.dt_s.max(self.t_end_s / MAX_TRAJECTORY_POINTS as f64)
    }

    fn check(&self) -> SimResult<()> {
        if !(self.dt_s > 0.0) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if !(self.t_end_s > 0.0) {
            return Err(SimError::InvalidArg {
                what: "t_end must be positive",
            });
        }
        Ok(())
    }
}

/// Vessel volume, liquid flow and delay shared by every vessel run.
struct Vessel {
    flow_l_min: f64,
    volume_l: f64,
    delay_s: f64,
}

impl Vessel {
    fn new(inputs: &SimulationInputs) -> SimResult<Self> {
        Ok(Self {
            flow_l_min: inputs.liquid_flow_l_min(),
            volume_l: inputs.volume_l,
            delay_s: transport_delay_s(inputs)?,
        })
    }

    fn delay_line<T: Copy>(&self, dt_s: f64, seed: T) -> DelayLine<T> {
        DelayLine::new(delay_steps(self.delay_s, dt_s), seed)
    }

    /// One explicit Euler step of the mixing balance.
    fn step(&self, c: f64, delayed_outlet: f64, dt_s: f64) -> f64 {
        let rate_per_min = (self.flow_l_min / self.volume_l) * (delayed_outlet - c);
        c + rate_per_min * (dt_s / 60.0)
    }
}

fn time_grid(opts: &VesselOptions) -> (f64, usize) {
    let dt = opts.effective_dt_s();
    let n = (opts.t_end_s / dt).floor() as usize + 1;
    (dt, n)
}

/// Vessel O2/N2 trajectory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VesselTrajectory {
    pub effective_dt_s: f64,
    pub delay_steps: usize,
    pub time_s: Vec<f64>,
    pub c_o2_mmol_l: Vec<f64>,
    pub c_n2_mmol_l: Vec<f64>,
    /// O2 as a percentage of the reference concentration.
    pub do_percent: Vec<f64>,
}

/// Simulate the recirculating vessel's dissolved O2/N2.
pub fn simulate_vessel(
    inputs: &SimulationInputs,
    solubility: &dyn SolubilityModel,
    reference_o2_mmol_l: f64,
    opts: VesselOptions,
) -> SimResult<VesselTrajectory> {
    validate_inputs(inputs)?;
    opts.check()?;

    let vessel = Vessel::new(inputs)?;
    let (dt_s, n_steps) = time_grid(&opts);
    let mut c = DissolvedGas::initial(inputs);
    let mut delay = vessel.delay_line(dt_s, c);

    let mut out = VesselTrajectory {
        effective_dt_s: dt_s,
        delay_steps: delay.delay_steps(),
        time_s: Vec::with_capacity(n_steps),
        c_o2_mmol_l: Vec::with_capacity(n_steps),
        c_n2_mmol_l: Vec::with_capacity(n_steps),
        do_percent: Vec::with_capacity(n_steps),
    };
    let mut record = |t: f64, c: DissolvedGas| {
        out.time_s.push(t);
        out.c_o2_mmol_l.push(c.o2);
        out.c_n2_mmol_l.push(c.n2);
        out.do_percent.push(percent_of_reference(c.o2, reference_o2_mmol_l));
    };

    record(0.0, c);
    for step in 1..n_steps {
        let treated = compute_single_pass_steady_outlet(inputs, solubility, c)?.outlet;
        let delayed = delay.advance(treated);
        c = DissolvedGas::new(
            vessel.step(c.o2, delayed.o2, dt_s),
            vessel.step(c.n2, delayed.n2, dt_s),
        );
        record(step as f64 * dt_s, c);
    }

    tracing::debug!(n_steps, dt_s, delay_steps = out.delay_steps, "vessel trajectory complete");
    Ok(out)
}

/// Outcome of a time-to-target search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeToTarget {
    pub reached: bool,
    pub time_s: Option<f64>,
    /// Vessel O2 at the end of the search, percent of reference.
    pub final_percent: f64,
}

/// Step of the time-to-target search [s].
///
/// A tenth of the vessel turnover time, clamped to 1..30 s, and never finer
/// than 1/4000 of the search horizon.
pub fn target_search_dt_s(volume_l: f64, flow_l_min: f64) -> f64 {
    let turnover_s = (volume_l / flow_l_min) * 60.0;
    (TARGET_SEARCH_HORIZON_S / 4000.0).max((turnover_s / 10.0).clamp(1.0, 30.0))
}

/// Time for the vessel O2 to reach `target_percent` of the reference.
///
/// The search runs up to eight simulated hours and stops at the first step
/// that crosses the target in the direction of the initial offset.
pub fn estimate_time_to_target(
    inputs: &SimulationInputs,
    solubility: &dyn SolubilityModel,
    target_percent: f64,
    reference_o2_mmol_l: f64,
) -> SimResult<TimeToTarget> {
    let percent = |c: f64| percent_of_reference(c, reference_o2_mmol_l);
    let target_c = (target_percent / 100.0) * reference_o2_mmol_l;
    let mut c = DissolvedGas::initial(inputs);
    let flow_l_min = inputs.liquid_flow_l_min();

    if inputs.volume_l <= 0.0 || flow_l_min <= 0.0 {
        return Ok(TimeToTarget {
            reached: false,
            time_s: None,
            final_percent: percent(c.o2),
        });
    }
    if (c.o2 - target_c).abs() <= TARGET_TOLERANCE_MMOL_L {
        return Ok(TimeToTarget {
            reached: true,
            time_s: Some(0.0),
            final_percent: percent(c.o2),
        });
    }
    validate_inputs(inputs)?;

    let vessel = Vessel::new(inputs)?;
    let dt_s = target_search_dt_s(inputs.volume_l, flow_l_min);
    let n_steps = (TARGET_SEARCH_HORIZON_S / dt_s) as usize;
    let rising = target_c > c.o2;
    let mut delay = vessel.delay_line(dt_s, c);

    for step in 1..=n_steps {
        let treated = compute_single_pass_steady_outlet(inputs, solubility, c)?.outlet;
        let delayed = delay.advance(treated);
        c = DissolvedGas::new(
            vessel.step(c.o2, delayed.o2, dt_s),
            vessel.step(c.n2, delayed.n2, dt_s),
        );

        let crossed = if rising { c.o2 >= target_c } else { c.o2 <= target_c };
        if crossed {
            let t = step as f64 * dt_s;
            tracing::debug!(t, step, "target reached");
            return Ok(TimeToTarget {
                reached: true,
                time_s: Some(t),
                final_percent: percent(c.o2),
            });
        }
    }

    Ok(TimeToTarget {
        reached: false,
        time_s: None,
        final_percent: percent(c.o2),
    })
}

/// Vessel dissolved CO2 and bicarbonate pH.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VesselPhSeries {
    pub effective_dt_s: f64,
    pub time_s: Vec<f64>,
    pub c_co2_mmol_l: Vec<f64>,
    pub ph: Vec<f64>,
}

/// Simulate vessel CO2 and pH through the two-stage conditioning pathway.
pub fn simulate_vessel_ph(
    inputs: &SimulationInputs,
    solubility: &dyn SolubilityModel,
    opts: VesselOptions,
) -> SimResult<VesselPhSeries> {
    validate_inputs(inputs)?;
    opts.check()?;

    let stage = &inputs.co2;
    let conditioner = Co2Conditioner::new(inputs, solubility)?;
    let vessel = Vessel::new(inputs)?;
    let (dt_s, n_steps) = time_grid(&opts);
    let mut c = stage.c_co2_init_mmol_l;
    let mut delay = vessel.delay_line(dt_s, c);

    let mut series = VesselPhSeries {
        effective_dt_s: dt_s,
        time_s: Vec::with_capacity(n_steps),
        c_co2_mmol_l: Vec::with_capacity(n_steps),
        ph: Vec::with_capacity(n_steps),
    };
    series.time_s.push(0.0);
    series.c_co2_mmol_l.push(c);
    series.ph.push(bicarbonate_ph(stage.hco3_mmol_l, c, stage.pka_app)?);

    for step in 1..n_steps {
        let treated = conditioner.outlet(c).co2_final_outlet_mmol_l;
        let delayed = delay.advance(treated);
        c = vessel.step(c, delayed, dt_s);

        series.time_s.push(step as f64 * dt_s);
        series.c_co2_mmol_l.push(c);
        series.ph.push(bicarbonate_ph(stage.hco3_mmol_l, c, stage.pka_app)?);
    }

    Ok(series)
}
