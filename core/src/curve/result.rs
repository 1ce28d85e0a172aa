use serde::{Deserialize, Serialize};

/// Sample with the largest `voltage * current_density` product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxPowerPoint {
    pub voltage: f64,
    pub current_density: f64,
    /// Power density in mW/cm², rounded to two decimals.
    pub power: f64,
}

/// Figures of merit extracted from one current channel.
///
/// Every field except the maximum-power point is NaN when the curve does not
/// cross both axes; the resistances are NaN on their own when the local line
/// fit fails.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JvResult {
    /// V, five decimals.
    pub open_circuit_voltage: f64,
    /// mA/cm², two decimals.
    pub short_circuit_current_density: f64,
    /// Percent, two decimals.
    pub fill_factor: f64,
    /// Power conversion efficiency in percent, two decimals.
    pub efficiency: f64,
    pub max_power_point: MaxPowerPoint,
    /// Ω·cm², integer.
    pub series_resistance: f64,
    /// Ω·cm², integer.
    pub shunt_resistance: f64,
}

impl JvResult {
    pub(crate) fn degenerate(max_power_point: MaxPowerPoint) -> Self {
        Self {
            open_circuit_voltage: f64::NAN,
            short_circuit_current_density: f64::NAN,
            fill_factor: f64::NAN,
            efficiency: f64::NAN,
            max_power_point,
            series_resistance: f64::NAN,
            shunt_resistance: f64::NAN,
        }
    }

    /// True when the curve crossed both axes and the axis-derived figures exist.
    pub fn crosses_both_axes(&self) -> bool {
        !self.open_circuit_voltage.is_nan() && !self.short_circuit_current_density.is_nan()
    }

    /// Bitwise comparison, NaN fields included.
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }

    fn bits(&self) -> [u64; 9] {
        [
            self.open_circuit_voltage.to_bits(),
            self.short_circuit_current_density.to_bits(),
            self.fill_factor.to_bits(),
            self.efficiency.to_bits(),
            self.max_power_point.voltage.to_bits(),
            self.max_power_point.current_density.to_bits(),
            self.max_power_point.power.to_bits(),
            self.series_resistance.to_bits(),
            self.shunt_resistance.to_bits(),
        ]
    }
}
