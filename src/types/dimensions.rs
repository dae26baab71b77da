//! `Dimensions` and `Unit`: dimensional analysis over numeric channels.

use serde::{Deserialize, Serialize};

/// Dimension exponents for dimensional analysis, using SI base dimensions plus
/// pragmatic extensions for hardware telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Length (meters, m).
    pub length: i8,
    /// Mass (kilograms, kg).
    pub mass: i8,
    /// Time (seconds, s).
    pub time: i8,
    /// Electric current (amperes, A).
    pub current: i8,
    /// Temperature (kelvin, K).
    pub temperature: i8,
    /// Angle (radians/degrees).
    pub angle: i8,
    /// Count (samples, items, cycles).
    pub count: i8,
    /// Data (bits, bytes).
    pub data: i8,
}

impl Dimensions {
    /// Dimensions with every exponent zero (a dimensionless quantity).
    pub const ZERO: Self = Self {
        length: 0,
        mass: 0,
        time: 0,
        current: 0,
        temperature: 0,
        angle: 0,
        count: 0,
        data: 0,
    };

    /// Dimensions for a pure time quantity (`time = 1`, everything else zero) —
    /// the shape required for a timestamp unit.
    pub const TIME: Self = Self {
        time: 1,
        ..Self::ZERO
    };

    /// True if every exponent is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.length == 0
            && self.mass == 0
            && self.time == 0
            && self.current == 0
            && self.temperature == 0
            && self.angle == 0
            && self.count == 0
            && self.data == 0
    }
}

/// Unit metadata attached to a numeric [`super::Type`]: the dimension exponents,
/// a scale factor relative to the dimension's SI base unit, and a display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// The physical dimensions this unit measures.
    pub dimensions: Dimensions,
    /// Scale factor relative to the base unit for `dimensions`.
    pub scale: f64,
    /// Display name, e.g. `"ns"`, `"psi"`, `"rpm"`.
    pub name: String,
}

impl Unit {
    /// The canonical nanosecond time unit: `dimensions = TIME`, `scale = 1.0`,
    /// `name = "ns"`.
    #[must_use]
    pub fn nanoseconds() -> Self {
        Self {
            dimensions: Dimensions::TIME,
            scale: 1.0,
            name: "ns".to_string(),
        }
    }

    /// True if this is a time unit with nanosecond scale: `dimensions.time == 1`,
    /// every other dimension zero, `scale == 1.0`, and `name == "ns"`.
    #[must_use]
    pub fn is_timestamp(&self) -> bool {
        self.dimensions.time == 1
            && self.dimensions.length == 0
            && self.dimensions.mass == 0
            && self.dimensions.current == 0
            && self.dimensions.temperature == 0
            && self.dimensions.angle == 0
            && self.dimensions.count == 0
            && self.dimensions.data == 0
            && self.name == "ns"
            && self.scale == 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_is_zero() {
        assert!(Dimensions::ZERO.is_zero());
        assert!(!Dimensions::TIME.is_zero());
    }

    #[test]
    fn nanoseconds_unit_is_timestamp() {
        assert!(Unit::nanoseconds().is_timestamp());
    }

    #[test]
    fn wrong_scale_is_not_timestamp() {
        let mut u = Unit::nanoseconds();
        u.scale = 1000.0;
        assert!(!u.is_timestamp());
    }

    #[test]
    fn wrong_name_is_not_timestamp() {
        let mut u = Unit::nanoseconds();
        u.name = "us".to_string();
        assert!(!u.is_timestamp());
    }

    #[test]
    fn extra_dimension_is_not_timestamp() {
        let mut u = Unit::nanoseconds();
        u.dimensions.length = 1;
        assert!(!u.is_timestamp());
    }
}
