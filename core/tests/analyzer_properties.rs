use approx::assert_abs_diff_eq;
use jvcore::math::linspace;
use jvcore::{AnalysisConfig, JvAnalyzer, JvResult, JvTable};
use rand::{rngs::StdRng, Rng, SeedableRng};

const THERMAL_VOLTAGE: f64 = 0.025852;

/// Single-diode current density in mA/cm² with series resistance in Ω·cm²,
/// solved by bisection on the implicit equation.
fn diode_current(v: f64, jsc0: f64, voc0: f64, series_ohm_cm2: f64) -> f64 {
    let residual =
        |j: f64| jsc0 * (1.0 - ((v + j * series_ohm_cm2 * 1e-3 - voc0) / THERMAL_VOLTAGE).exp()) - j;
    // The root lies between the zero-resistance solution and jsc0.
    let ideal = jsc0 * (1.0 - ((v - voc0) / THERMAL_VOLTAGE).exp());
    let (mut lo, mut hi) = (ideal.min(0.0) - 1.0, jsc0 + 1.0);
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

fn diode_curve(points: usize, jsc0: f64, voc0: f64, series_ohm_cm2: f64) -> (Vec<f64>, Vec<f64>) {
    diode_sweep(1.1, points, jsc0, voc0, series_ohm_cm2)
}

/// Sweep from -0.2 V up to `v_end`.
fn diode_sweep(
    v_end: f64,
    points: usize,
    jsc0: f64,
    voc0: f64,
    series_ohm_cm2: f64,
) -> (Vec<f64>, Vec<f64>) {
    let voltage = linspace(-0.2, v_end, points);
    let current = voltage
        .iter()
        .map(|&v| diode_current(v, jsc0, voc0, series_ohm_cm2))
        .collect();
    (voltage, current)
}

fn analyzer() -> JvAnalyzer {
    JvAnalyzer::new(AnalysisConfig::default()).unwrap()
}

fn assert_all_nan(result: &JvResult) {
    assert!(result.open_circuit_voltage.is_nan());
    assert!(result.short_circuit_current_density.is_nan());
    assert!(result.fill_factor.is_nan());
    assert!(result.efficiency.is_nan());
    assert!(result.series_resistance.is_nan());
    assert!(result.shunt_resistance.is_nan());
}

#[test]
fn diode_with_series_resistance_recovers_voc_and_jsc() {
    let (voltage, current) = diode_curve(200, 20.0, 1.0, 2.0);
    let result = analyzer().analyze_channel(&voltage, &current, 0.105).unwrap();

    assert_abs_diff_eq!(result.open_circuit_voltage, 1.0, epsilon = 0.01);
    assert_abs_diff_eq!(result.short_circuit_current_density, 20.0, epsilon = 0.5);
    assert!(result.series_resistance.is_finite());
    assert!(result.series_resistance > 0.0);
    assert!(result.fill_factor > 0.0 && result.fill_factor <= 100.0);
    assert!(result.efficiency > 0.0);
}

#[test]
fn clean_diode_matches_within_rounding() {
    let (voltage, current) = diode_sweep(1.3, 400, 22.5, 1.12, 0.0);
    let result = analyzer().analyze_channel(&voltage, &current, 1.0).unwrap();

    assert!(result.crosses_both_axes());
    let grid_step = 1.5 / 999.0;
    assert!(result.open_circuit_voltage <= 1.12 + 1e-5);
    assert!(result.open_circuit_voltage >= 1.12 - grid_step - 1e-3);
    assert_abs_diff_eq!(result.short_circuit_current_density, 22.5, epsilon = 0.01);
    assert!(result.fill_factor > 0.0 && result.fill_factor <= 100.0);
}

#[test]
fn current_that_never_crosses_zero_is_all_nan() {
    let voltage = linspace(-0.2, 1.1, 150);
    let current: Vec<f64> = voltage.iter().map(|v| 5.0 + v).collect();
    let result = analyzer().analyze_channel(&voltage, &current, 1.0).unwrap();
    assert_all_nan(&result);
}

#[test]
fn fourth_quadrant_curve_is_all_nan() {
    let voltage = linspace(0.1, 1.0, 120);
    let current: Vec<f64> = voltage.iter().map(|v| -3.0 - 4.0 * v).collect();
    let result = analyzer().analyze_channel(&voltage, &current, 1.0).unwrap();
    assert_all_nan(&result);
}

#[test]
fn negative_voc_with_positive_jsc_gives_zero_fill_factor() {
    // Dips below zero only between -0.17 V and -0.03 V, positive again at 0 V.
    let voltage = linspace(-0.2, 1.1, 300);
    let current: Vec<f64> = voltage
        .iter()
        .map(|v| 100.0 * (v + 0.1) * (v + 0.1) - 0.5)
        .collect();
    let result = analyzer().analyze_channel(&voltage, &current, 1.0).unwrap();

    assert!(result.open_circuit_voltage <= 0.0);
    assert!(result.short_circuit_current_density > 0.0);
    assert_eq!(result.fill_factor, 0.0);
    assert_eq!(result.efficiency, 0.0);
}

#[test]
fn linear_leakage_recovers_shunt_resistance() {
    // 0.5 (mA/cm²)/V of leakage -> 2 kΩ·cm² -> 2000 after the unit scale on 1 cm².
    let voltage = linspace(-0.2, 1.1, 250);
    let current: Vec<f64> = voltage
        .iter()
        .map(|&v| 20.0 * (1.0 - ((v - 1.0) / THERMAL_VOLTAGE).exp()) - 0.5 * v)
        .collect();
    let result = analyzer().analyze_channel(&voltage, &current, 1.0).unwrap();
    assert_abs_diff_eq!(result.shunt_resistance, 2000.0, epsilon = 1.0);
}

#[test]
fn repeated_analysis_is_bit_identical() {
    let (voltage, current) = diode_curve(200, 18.0, 1.05, 5.0);
    let analyzer = analyzer();
    let first = analyzer.analyze(&voltage, &[&current, &current], 0.2).unwrap();
    let second = analyzer.analyze(&voltage, &[&current, &current], 0.2).unwrap();
    for (a, b) in first.iter().zip(&second) {
        assert!(a.bit_eq(b));
    }

    let flat = vec![1.0; voltage.len()];
    let degenerate_a = analyzer.analyze_channel(&voltage, &flat, 0.2).unwrap();
    let degenerate_b = analyzer.analyze_channel(&voltage, &flat, 0.2).unwrap();
    assert!(degenerate_a.bit_eq(&degenerate_b));
}

#[test]
fn descending_scan_matches_after_caller_reversal() {
    let (voltage, current) = diode_curve(200, 20.0, 1.0, 2.0);
    let ascending = JvTable::from_columns(
        vec!["Voltage".into(), "J".into()],
        vec![voltage.clone(), current.clone()],
    )
    .unwrap();

    let mut descending = JvTable::from_columns(
        vec!["Voltage".into(), "J".into()],
        vec![
            voltage.iter().rev().copied().collect(),
            current.iter().rev().copied().collect(),
        ],
    )
    .unwrap();
    assert!(descending.ensure_ascending());

    let analyzer = analyzer();
    let expected = analyzer.analyze_table(&ascending, &[1], 0.105).unwrap();
    let actual = analyzer.analyze_table(&descending, &[1], 0.105).unwrap();
    assert!(expected[0].bit_eq(&actual[0]));
}

#[test]
fn descending_scan_without_reversal_keeps_grid_order() {
    // Without the caller step the resample runs high-to-low; crossings are
    // still found, read from the other side of each axis.
    let (voltage, current) = diode_curve(200, 20.0, 1.0, 2.0);
    let v_desc: Vec<f64> = voltage.iter().rev().copied().collect();
    let j_desc: Vec<f64> = current.iter().rev().copied().collect();
    let result = analyzer().analyze_channel(&v_desc, &j_desc, 0.105).unwrap();
    assert!(result.crosses_both_axes());
    assert_abs_diff_eq!(result.open_circuit_voltage, 1.0, epsilon = 0.01);
}

#[test]
fn channels_are_independent() {
    let (voltage, current) = diode_curve(200, 20.0, 1.0, 2.0);
    let dark: Vec<f64> = voltage.iter().map(|v| -1.0 - v.abs()).collect();
    let results = analyzer().analyze(&voltage, &[&current, &dark], 0.105).unwrap();
    assert!(results[0].crosses_both_axes());
    assert_all_nan(&results[1]);
}

#[test]
fn randomized_diodes_stay_physical() {
    let mut rng = StdRng::seed_from_u64(7);
    let analyzer = analyzer();
    for _ in 0..25 {
        let jsc0 = rng.gen_range(5.0..30.0);
        let voc0 = rng.gen_range(0.6..1.05);
        let series = rng.gen_range(0.0..8.0);
        let points = rng.gen_range(100..400);
        let (voltage, current) = diode_curve(points, jsc0, voc0, series);
        let result = analyzer.analyze_channel(&voltage, &current, 0.105).unwrap();

        assert!(result.fill_factor > 0.0 && result.fill_factor <= 100.0);
        assert_abs_diff_eq!(result.open_circuit_voltage, voc0, epsilon = 0.005);
        assert_abs_diff_eq!(result.short_circuit_current_density, jsc0, epsilon = 0.05);
        assert!(result.series_resistance > 0.0);
    }
}
