//! Closed-form plug-flow transfer and the gas-supply cap.

use cx_core::floored_div;

/// Outlet of first-order plug-flow transfer toward a constant equilibrium.
///
/// `outlet = cstar + (inlet - cstar) * exp(-kla * tau)`; a zero rate returns
/// the inlet unchanged.
#[inline]
pub fn plug_flow_outlet(c_in_mmol_l: f64, cstar_mmol_l: f64, kla_s_inv: f64, residence_time_s: f64) -> f64 {
    if kla_s_inv * residence_time_s == 0.0 {
        return c_in_mmol_l;
    }
    cstar_mmol_l + (c_in_mmol_l - cstar_mmol_l) * (-kla_s_inv * residence_time_s).exp()
}

/// Outlet after limiting uptake to what the gas stream supplies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CappedOutlet {
    pub outlet_mmol_l: f64,
    pub limited: bool,
}

/// Clip absorption to the molar supply of the gas stream.
///
/// Only uptake (outlet above inlet) is limited; stripping passes through.
pub fn apply_supply_cap(
    c_in_mmol_l: f64,
    c_out_mmol_l: f64,
    supply_mmol_min: f64,
    liquid_flow_l_min: f64,
) -> CappedOutlet {
    let required_mmol_min = ((c_out_mmol_l - c_in_mmol_l) * liquid_flow_l_min).max(0.0);
    if required_mmol_min > supply_mmol_min {
        CappedOutlet {
            outlet_mmol_l: c_in_mmol_l + floored_div(supply_mmol_min, liquid_flow_l_min),
            limited: true,
        }
    } else {
        CappedOutlet {
            outlet_mmol_l: c_out_mmol_l,
            limited: false,
        }
    }
}
