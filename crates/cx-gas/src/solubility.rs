//! Solubility model trait and the constant-coefficient reference model.

use crate::error::{GasError, GasResult};
use crate::species::Species;
use cx_core::numeric::ensure_finite;

/// Trait for Henry-type solubility models.
///
/// Maps (species, temperature [°C]) to a coefficient in mmol/(L·kPa). The
/// equilibrium dissolved concentration is `coefficient * partial_pressure`.
///
/// Implementations must be thread-safe (Send + Sync) so sweeps can evaluate
/// the solver in parallel. Any `Fn(Species, f64) -> GasResult<f64>` closure
/// implements this trait.
pub trait SolubilityModel: Send + Sync {
    /// Henry-type solubility coefficient [mmol/(L·kPa)].
    fn solubility(&self, species: Species, temperature_c: f64) -> GasResult<f64>;

    /// Equilibrium dissolved concentration [mmol/L] for a partial pressure [kPa].
    fn equilibrium(&self, species: Species, temperature_c: f64, partial_kpa: f64) -> GasResult<f64> {
        Ok(self.solubility(species, temperature_c)? * partial_kpa)
    }
}

impl<F> SolubilityModel for F
where
    F: Fn(Species, f64) -> GasResult<f64> + Send + Sync,
{
    fn solubility(&self, species: Species, temperature_c: f64) -> GasResult<f64> {
        self(species, temperature_c)
    }
}

/// Constant Henry-like coefficients, independent of temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantSolubility {
    coefficients: Vec<(Species, f64)>,
}

impl ConstantSolubility {
    /// Reference coefficients [mmol/(L·kPa)].
    pub const O2: f64 = 0.0128;
    pub const N2: f64 = 0.0061;
    pub const CO2: f64 = 0.0307;

    /// Build a table from explicit coefficients.
    ///
    /// Coefficients must be finite and non-negative. Species left out of the
    /// table are reported as unsupported when queried.
    pub fn new(coefficients: Vec<(Species, f64)>) -> GasResult<Self> {
        for (_, coeff) in &coefficients {
            let coeff = ensure_finite(*coeff, "solubility coefficient")?;
            if coeff < 0.0 {
                return Err(GasError::NonPhysical {
                    what: "negative solubility coefficient",
                });
            }
        }
        Ok(Self { coefficients })
    }
}

impl Default for ConstantSolubility {
    fn default() -> Self {
        Self {
            coefficients: vec![
                (Species::O2, Self::O2),
                (Species::N2, Self::N2),
                (Species::CO2, Self::CO2),
            ],
        }
    }
}

impl SolubilityModel for ConstantSolubility {
    fn solubility(&self, species: Species, _temperature_c: f64) -> GasResult<f64> {
        self.coefficients
            .iter()
            .find(|(s, _)| *s == species)
            .map(|(_, c)| *c)
            .ok_or_else(|| GasError::UnsupportedSpecies {
                species: species.key().to_string(),
            })
    }
}
