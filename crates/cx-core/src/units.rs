// cx-core/src/units.rs

use uom::si::f64::{
    Area as UomArea, Length as UomLength, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature, Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Length = UomLength;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Volume = UomVolume;

#[inline]
pub fn mm(v: f64) -> Length {
    use uom::si::length::millimeter;
    Length::new::<millimeter>(v)
}

#[inline]
pub fn cm(v: f64) -> Length {
    use uom::si::length::centimeter;
    Length::new::<centimeter>(v)
}

#[inline]
pub fn ml(v: f64) -> Volume {
    use uom::si::volume::milliliter;
    Volume::new::<milliliter>(v)
}

#[inline]
pub fn kpa(v: f64) -> Pressure {
    use uom::si::pressure::kilopascal;
    Pressure::new::<kilopascal>(v)
}

#[inline]
pub fn celsius(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn mbar(v: f64) -> Pressure {
    use uom::si::pressure::millibar;
    Pressure::new::<millibar>(v)
}

/// Pressure in kilopascal.
#[inline]
pub fn to_kpa(v: Pressure) -> f64 {
    use uom::si::pressure::kilopascal;
    v.get::<kilopascal>()
}

/// Pressure in millibar.
#[inline]
pub fn to_mbar(v: Pressure) -> f64 {
    use uom::si::pressure::millibar;
    v.get::<millibar>()
}

/// Volume in millilitres.
#[inline]
pub fn to_ml(v: Volume) -> f64 {
    use uom::si::volume::milliliter;
    v.get::<milliliter>()
}

pub mod constants {
    /// Universal gas constant [kPa·L/(mol·K)].
    pub const R_KPA_L_PER_MOL_K: f64 = 8.314_462_618;

    /// Standard atmosphere [kPa].
    pub const ATM_KPA: f64 = 101.325;

}

/// Absolute temperature [K] of a Celsius reading.
#[inline]
pub fn celsius_to_kelvin(t_c: f64) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    celsius(t_c).get::<kelvin>()
}
