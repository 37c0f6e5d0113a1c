//! Gas-phase composition (normalized mole fractions).

use crate::error::{GasError, GasResult};
use crate::species::Species;

/// Gas composition defined by normalized mole fractions.
///
/// The composition is always normalized (mole fractions sum to 1.0). Species
/// that are absent report a mole fraction of zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Species and their mole fractions (always normalized to sum=1).
    items: Vec<(Species, f64)>,
}

impl Composition {
    /// Create a composition from mole fractions.
    ///
    /// Validates that all fractions are finite, non-negative, and have a positive sum,
    /// then normalizes to sum=1.
    pub fn new_mole_fractions(fractions: Vec<(Species, f64)>) -> GasResult<Self> {
        if fractions.is_empty() {
            return Err(GasError::InvalidArg {
                what: "empty composition",
            });
        }

        let mut sum = 0.0;
        for (_, frac) in &fractions {
            if !frac.is_finite() {
                return Err(GasError::NonPhysical {
                    what: "non-finite mole fraction",
                });
            }
            if *frac < 0.0 {
                return Err(GasError::NonPhysical {
                    what: "negative mole fraction",
                });
            }
            sum += frac;
        }

        if sum <= 0.0 || !sum.is_finite() {
            return Err(GasError::NonPhysical {
                what: "mole fractions sum to zero or non-finite",
            });
        }

        let normalized: Vec<(Species, f64)> = fractions
            .into_iter()
            .map(|(s, f)| (s, f / sum))
            .filter(|(_, f)| *f > 1e-15) // Drop negligible species
            .collect();

        if normalized.is_empty() {
            return Err(GasError::NonPhysical {
                what: "all mole fractions negligible",
            });
        }

        Ok(Self { items: normalized })
    }

    /// Binary O2/N2 sweep gas.
    pub fn oxygen_nitrogen(y_o2: f64, y_n2: f64) -> GasResult<Self> {
        Self::new_mole_fractions(vec![(Species::O2, y_o2), (Species::N2, y_n2)])
    }

    /// CO2-enriched conditioning gas; the balance is treated as N2 carrier.
    pub fn co2_in_carrier(co2_percent: f64) -> GasResult<Self> {
        if !(0.0..=100.0).contains(&co2_percent) {
            return Err(GasError::InvalidArg {
                what: "CO2 percentage must be between 0 and 100",
            });
        }
        let y_co2 = co2_percent / 100.0;
        Self::new_mole_fractions(vec![(Species::CO2, y_co2), (Species::N2, 1.0 - y_co2)])
    }

    /// Get mole fraction of a species (0.0 if not present).
    pub fn mole_fraction(&self, species: Species) -> f64 {
        self.items
            .iter()
            .find(|(s, _)| *s == species)
            .map(|(_, f)| *f)
            .unwrap_or(0.0)
    }

    /// Partial pressure of a species [same unit as `p_total`].
    pub fn partial_pressure(&self, species: Species, p_total: f64) -> f64 {
        self.mole_fraction(species) * p_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn air_like_mixture() {
        let comp = Composition::oxygen_nitrogen(0.21, 0.79).unwrap();
        assert!(close(comp.mole_fraction(Species::O2), 0.21));
        assert!(close(comp.mole_fraction(Species::N2), 0.79));
        assert_eq!(comp.mole_fraction(Species::CO2), 0.0);
        assert!(close(
            comp.partial_pressure(Species::O2, 101.325),
            0.21 * 101.325
        ));
    }

    #[test]
    fn pure_oxygen_drops_zero_nitrogen() {
        let comp = Composition::oxygen_nitrogen(1.0, 0.0).unwrap();
        assert_eq!(comp.mole_fraction(Species::O2), 1.0);
        assert_eq!(comp.mole_fraction(Species::N2), 0.0);
        assert_eq!(comp.partial_pressure(Species::N2, 101.325), 0.0);
    }

    #[test]
    fn co2_carrier_mixture() {
        let comp = Composition::co2_in_carrier(5.0).unwrap();
        assert!(close(comp.mole_fraction(Species::CO2), 0.05));
        assert!(close(comp.mole_fraction(Species::N2), 0.95));
        assert!(Composition::co2_in_carrier(101.0).is_err());
        assert!(Composition::co2_in_carrier(-1.0).is_err());
    }

    #[test]
    fn mixture_normalization_non_unit_sum() {
        let comp =
            Composition::new_mole_fractions(vec![(Species::O2, 2.0), (Species::N2, 8.0)]).unwrap();
        assert!(close(comp.mole_fraction(Species::O2), 0.2));
        assert!(close(comp.mole_fraction(Species::N2), 0.8));
    }

    #[test]
    fn invalid_inputs() {
        assert!(Composition::new_mole_fractions(vec![(Species::O2, -0.5), (Species::N2, 1.5)]).is_err());
        assert!(Composition::new_mole_fractions(vec![(Species::O2, 0.0), (Species::N2, 0.0)]).is_err());
        assert!(Composition::new_mole_fractions(vec![(Species::O2, f64::NAN)]).is_err());
        assert!(Composition::new_mole_fractions(vec![]).is_err());
    }
}
