//! Series and shunt resistance from local line fits on the resampled curve.

use crate::math::{RoundTo, StatsHelper};
use crate::prelude::AnalysisConfig;

/// Ω·cm² from a current-density slope in (mA/cm²)/V.
pub fn resistance_from_slope(slope: f64, cell_area: f64) -> f64 {
    let resistance = ((-1.0 / slope) / cell_area) / 1e-3;
    if resistance.is_finite() {
        resistance.round_to(0)
    } else {
        f64::NAN
    }
}

/// Slope of the line through `[center - half_width + shift, center + half_width + shift)`.
///
/// The upper bound is clipped to the data; a window starting before the data
/// or holding fewer than two points yields `None`.
fn window_slope(
    voltage: &[f64],
    current: &[f64],
    center: usize,
    half_width: usize,
    shift: usize,
) -> Option<f64> {
    let len = voltage.len().min(current.len());
    let start = center.checked_sub(half_width)?.checked_add(shift)?;
    let end = center
        .saturating_add(half_width)
        .saturating_add(shift)
        .min(len);
    if start >= end {
        return None;
    }
    StatsHelper::linear_fit(&voltage[start..end], &current[start..end]).map(|fit| fit.slope)
}

/// Series resistance from the slope around the open-circuit crossing.
pub fn series_resistance(
    voltage: &[f64],
    current: &[f64],
    voc_index: usize,
    config: &AnalysisConfig,
    cell_area: f64,
) -> f64 {
    window_slope(voltage, current, voc_index, config.fit_window, 0)
        .map_or(f64::NAN, |slope| resistance_from_slope(slope, cell_area))
}

/// Shunt resistance from the slope around the short-circuit crossing.
///
/// Near short circuit the current must fall with voltage. While the fitted
/// slope is not negative the window moves forward one sample and is refit, at
/// most `config.max_shunt_shift` times.
pub fn shunt_resistance(
    voltage: &[f64],
    current: &[f64],
    jsc_index: usize,
    config: &AnalysisConfig,
    cell_area: f64,
) -> f64 {
    shunt_slope(voltage, current, jsc_index, config)
        .map_or(f64::NAN, |slope| resistance_from_slope(slope, cell_area))
}

fn shunt_slope(
    voltage: &[f64],
    current: &[f64],
    jsc_index: usize,
    config: &AnalysisConfig,
) -> Option<f64> {
    let half_width = config.fit_window.checked_mul(config.shunt_factor)?;
    let mut slope = window_slope(voltage, current, jsc_index, half_width, 0)?;
    let mut shift = 0;
    while slope >= 0.0 {
        shift += 1;
        if shift > config.max_shunt_shift {
            return None;
        }
        slope = window_slope(voltage, current, jsc_index, half_width, shift)?;
    }
    Some(slope)
}
