//! Dissolved-gas species definitions.

use crate::error::GasError;
use std::fmt;
use std::str::FromStr;

/// Species exchanged across the tubing wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// Oxygen (O₂)
    O2,
    /// Nitrogen (N₂)
    N2,
    /// Carbon dioxide (CO₂)
    CO2,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::O2, Species::N2, Species::CO2];

    pub fn key(&self) -> &'static str {
        match self {
            Species::O2 => "O2",
            Species::N2 => "N2",
            Species::CO2 => "CO2",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Species {
    type Err = GasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Species::ALL
            .iter()
            .copied()
            .find(|sp| sp.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GasError::UnsupportedSpecies {
                species: s.to_string(),
            })
    }
}
