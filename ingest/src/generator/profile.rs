use anyhow::{ensure, Context};
use jvcore::math::linspace;
use jvcore::JvTable;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Single-diode model for generating synthetic JV sweeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub points: usize,
    pub v_start: f64,
    pub v_end: f64,
    /// mA/cm².
    pub jsc: f64,
    /// V.
    pub voc: f64,
    /// Ideality-scaled thermal voltage, V.
    pub thermal_voltage: f64,
    /// Ω·cm².
    pub series_resistance: f64,
    /// (mA/cm²)/V of linear leakage.
    pub shunt_conductance: f64,
    /// Uniform noise amplitude on the current, mA/cm².
    pub noise: f64,
    pub seed: u64,
    /// cm².
    pub cell_area: f64,
    /// Emit rows from `v_end` down to `v_start`.
    pub descending: bool,
    /// Report voltage and current with flipped signs, as some rigs do.
    pub inverted: bool,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            points: 200,
            v_start: -0.2,
            v_end: 1.1,
            jsc: 20.0,
            voc: 1.0,
            thermal_voltage: 0.025852,
            series_resistance: 2.0,
            shunt_conductance: 0.0,
            noise: 0.0,
            seed: 0,
            cell_area: 0.105,
            descending: false,
            inverted: false,
        }
    }
}

pub const VOLTAGE_COLUMN: &str = "Voltage";
pub const CURRENT_COLUMN: &str = "CurrentDensity";

/// Current density at terminal voltage `v`, solving the implicit series
/// resistance term by bisection.
pub fn diode_current_density(v: f64, config: &SyntheticConfig) -> f64 {
    let drop_per_ma = config.series_resistance * 1e-3;
    let residual = |j: f64| {
        config.jsc * (1.0 - ((v + j * drop_per_ma - config.voc) / config.thermal_voltage).exp())
            - config.shunt_conductance * (v + j * drop_per_ma)
            - j
    };

    // Root lies above the resistance-free solution and below photocurrent plus leakage.
    let ideal = config.jsc * (1.0 - ((v - config.voc) / config.thermal_voltage).exp())
        - config.shunt_conductance * v;
    let mut lo = ideal.min(0.0) - 1.0;
    let mut hi = config.jsc + config.shunt_conductance * v.abs() + 1.0;
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if residual(mid) > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

pub fn build_curve_table(config: &SyntheticConfig) -> anyhow::Result<JvTable> {
    ensure!(config.points >= 2, "synthetic curve needs at least two points");
    ensure!(
        config.thermal_voltage > 0.0,
        "thermal voltage must be positive"
    );

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut voltage = linspace(config.v_start, config.v_end, config.points);
    let mut current: Vec<f64> = voltage
        .iter()
        .map(|&v| {
            let jitter = if config.noise > 0.0 {
                rng.gen_range(-config.noise..config.noise)
            } else {
                0.0
            };
            diode_current_density(v, config) + jitter
        })
        .collect();

    if config.descending {
        voltage.reverse();
        current.reverse();
    }
    if config.inverted {
        voltage.iter_mut().for_each(|v| *v = -*v);
        current.iter_mut().for_each(|j| *j = -*j);
    }

    JvTable::from_columns(
        vec![VOLTAGE_COLUMN.to_string(), CURRENT_COLUMN.to_string()],
        vec![voltage, current],
    )
    .context("assembling synthetic curve table")
}
