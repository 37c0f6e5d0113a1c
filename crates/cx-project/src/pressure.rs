//! Gas-side total pressure selection.

use cx_core::units::{kpa, mbar, to_kpa, to_mbar};
use serde::{Deserialize, Serialize};

/// How the gas-side total pressure is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PressureMode {
    /// Fixed absolute pressure.
    Manual { p_total_kpa: f64 },
    /// Empirical pressure drop, 4.0 mbar per mL/min of gas.
    ConservativeCurve,
    /// Empirical pressure drop, 6.4 mbar per mL/min of gas.
    OptimisticCurve,
}

/// Resolved gas pressure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureResolution {
    pub p_total_kpa: f64,
    /// Overpressure relative to atmosphere [mbar].
    pub delta_p_mbar: f64,
}

impl PressureMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Manual { .. } => "Manual",
            Self::ConservativeCurve => "Conservative curve",
            Self::OptimisticCurve => "Optimistic curve",
        }
    }

    pub fn resolve(&self, gas_flow_ml_min: f64, p_atm_kpa: f64) -> PressureResolution {
        let from_drop = |mbar_per_ml_min: f64| {
            let delta_p_mbar = mbar_per_ml_min * gas_flow_ml_min;
            PressureResolution {
                p_total_kpa: to_kpa(kpa(p_atm_kpa) + mbar(delta_p_mbar)),
                delta_p_mbar,
            }
        };

        match *self {
            Self::Manual { p_total_kpa } => PressureResolution {
                p_total_kpa,
                delta_p_mbar: to_mbar(kpa(p_total_kpa) - kpa(p_atm_kpa)).max(0.0),
            },
            Self::ConservativeCurve => from_drop(4.0),
            Self::OptimisticCurve => from_drop(6.4),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_core::units::constants::ATM_KPA;

    #[test]
    fn manual_reports_overpressure() {
        let r = PressureMode::Manual { p_total_kpa: 105.0 }.resolve(20.0, ATM_KPA);
        assert_eq!(r.p_total_kpa, 105.0);
        assert!((r.delta_p_mbar - 36.75).abs() < 1e-9);
    }

    #[test]
    fn manual_below_atmosphere_clamps_drop() {
        let r = PressureMode::Manual { p_total_kpa: 90.0 }.resolve(20.0, ATM_KPA);
        assert_eq!(r.delta_p_mbar, 0.0);
    }

    #[test]
    fn curves_scale_with_gas_flow() {
        let c = PressureMode::ConservativeCurve.resolve(10.0, 100.0);
        assert!((c.delta_p_mbar - 40.0).abs() < 1e-12);
        assert!((c.p_total_kpa - 104.0).abs() < 1e-12);

        let o = PressureMode::OptimisticCurve.resolve(10.0, 100.0);
        assert!((o.delta_p_mbar - 64.0).abs() < 1e-12);
        assert!((o.p_total_kpa - 106.4).abs() < 1e-12);
    }

    #[test]
    fn serde_tagged_form() {
        let mode: PressureMode = serde_yaml::from_str("type: optimistic_curve\n").unwrap();
        assert_eq!(mode, PressureMode::OptimisticCurve);
        let mode: PressureMode =
            serde_yaml::from_str("type: manual\np_total_kpa: 110.0\n").unwrap();
        assert_eq!(mode.label(), "Manual");
    }
}
