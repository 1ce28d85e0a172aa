use crate::analysis::crossing::first_sign_change;
use crate::analysis::resistance::{series_resistance, shunt_resistance};
use crate::curve::{JvResult, JvTable, MaxPowerPoint};
use crate::math::{linspace, LinearInterpolant, RoundTo, StatsHelper};
use crate::prelude::{AnalysisConfig, AnalysisError, AnalysisResult, RESAMPLE_POINTS};
use crate::telemetry::log::LogManager;

const DIGITS_VOC: u32 = 5;
const DIGITS_JSC: u32 = 2;
const DIGITS_FF: u32 = 2;
const DIGITS_PCE: u32 = 2;
const DIGITS_POWER: u32 = 2;

/// Extracts photovoltaic figures of merit from JV sweeps.
///
/// The analyzer only holds its configuration, so one instance can serve any
/// number of curves, from any number of threads.
#[derive(Debug, Clone)]
pub struct JvAnalyzer {
    config: AnalysisConfig,
    logger: LogManager,
}

impl JvAnalyzer {
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            logger: LogManager::new("jvcore::analysis"),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyzes one or two current channels sharing a voltage column.
    ///
    /// Structural problems (channel count, lengths, non-finite samples, cell
    /// area) are errors. A curve that is merely unphysical still yields a
    /// result with NaN fields.
    pub fn analyze(
        &self,
        voltage: &[f64],
        currents: &[&[f64]],
        cell_area: f64,
    ) -> AnalysisResult<Vec<JvResult>> {
        if currents.is_empty() || currents.len() > 2 {
            return Err(AnalysisError::UnsupportedChannelCount(currents.len()));
        }
        for current in currents {
            self.check_channel(voltage, current, cell_area)?;
        }

        Ok(currents
            .iter()
            .enumerate()
            .map(|(channel, current)| self.extract(channel, voltage, current, cell_area))
            .collect())
    }

    pub fn analyze_channel(
        &self,
        voltage: &[f64],
        current: &[f64],
        cell_area: f64,
    ) -> AnalysisResult<JvResult> {
        self.check_channel(voltage, current, cell_area)?;
        Ok(self.extract(0, voltage, current, cell_area))
    }

    /// Analyzes the given table columns against the table's voltage column.
    pub fn analyze_table(
        &self,
        table: &JvTable,
        channels: &[usize],
        cell_area: f64,
    ) -> AnalysisResult<Vec<JvResult>> {
        if let Some(&bad) = channels
            .iter()
            .find(|&&idx| idx == 0 || idx >= table.column_count())
        {
            return Err(AnalysisError::MalformedInput(format!(
                "column {} is not a current column of a {}-column table",
                bad,
                table.column_count()
            )));
        }

        let voltage = table.voltage();
        let columns: Vec<Vec<f64>> = channels.iter().map(|&idx| table.column_vec(idx)).collect();
        let currents: Vec<&[f64]> = columns.iter().map(Vec::as_slice).collect();
        self.analyze(&voltage, &currents, cell_area)
    }

    fn check_channel(&self, voltage: &[f64], current: &[f64], cell_area: f64) -> AnalysisResult<()> {
        if !(cell_area.is_finite() && cell_area > 0.0) {
            return Err(AnalysisError::MalformedInput(format!(
                "cell area must be positive, got {}",
                cell_area
            )));
        }
        if voltage.len() != current.len() {
            return Err(AnalysisError::MalformedInput(format!(
                "{} voltage samples but {} current samples",
                voltage.len(),
                current.len()
            )));
        }
        let required = self.config.min_samples();
        if voltage.len() < required {
            return Err(AnalysisError::MalformedInput(format!(
                "expected at least {} samples for a fit window of {}, got {}",
                required,
                self.config.fit_window,
                voltage.len()
            )));
        }
        if let Some(idx) = voltage
            .iter()
            .zip(current)
            .position(|(v, j)| !v.is_finite() || !j.is_finite())
        {
            return Err(AnalysisError::MalformedInput(format!(
                "sample {} is not finite",
                idx
            )));
        }
        Ok(())
    }

    fn extract(&self, channel: usize, voltage: &[f64], current: &[f64], cell_area: f64) -> JvResult {
        let max_power_point = max_power_point(voltage, current);

        // Resample between the first and last acquired voltage, keeping scan direction.
        let grid = linspace(voltage[0], voltage[voltage.len() - 1], RESAMPLE_POINTS);
        let resampled = match LinearInterpolant::new(voltage, current) {
            Some(interpolant) => interpolant.resample(&grid),
            None => return JvResult::degenerate(max_power_point),
        };

        let crossings = (
            first_sign_change(resampled.iter().copied()),
            first_sign_change(grid.iter().copied()),
        );
        let (voc_index, jsc_index) = match crossings {
            (Some(voc_index), Some(jsc_index)) => (voc_index, jsc_index),
            _ => {
                self.logger.debug(&format!(
                    "channel {} does not cross both axes, reporting NaN",
                    channel
                ));
                return JvResult::degenerate(max_power_point);
            }
        };

        let voc = grid[voc_index].round_to(DIGITS_VOC);
        let jsc = resampled[jsc_index].round_to(DIGITS_JSC);

        let fill_factor = if voc > 0.0 && jsc > 0.0 {
            (max_power_point.voltage * max_power_point.current_density / (voc * jsc) * 100.0)
                .round_to(DIGITS_FF)
        } else {
            0.0
        };
        let efficiency = (voc * jsc * fill_factor / 100.0).round_to(DIGITS_PCE);

        let series = series_resistance(&grid, &resampled, voc_index, &self.config, cell_area);
        let shunt = shunt_resistance(&grid, &resampled, jsc_index, &self.config, cell_area);
        if series.is_nan() || shunt.is_nan() {
            self.logger.debug(&format!(
                "channel {} line fit failed (Rs {}, Rsh {})",
                channel, series, shunt
            ));
        }

        JvResult {
            open_circuit_voltage: voc,
            short_circuit_current_density: jsc,
            fill_factor,
            efficiency,
            max_power_point,
            series_resistance: series,
            shunt_resistance: shunt,
        }
    }
}

/// Raw argmax of `V * J`; no magnitude is taken, so a curve without a
/// positive-power region reports its least negative sample.
fn max_power_point(voltage: &[f64], current: &[f64]) -> MaxPowerPoint {
    let power: Vec<f64> = voltage.iter().zip(current).map(|(v, j)| v * j).collect();
    let idx = StatsHelper::argmax(&power).unwrap_or(0);
    MaxPowerPoint {
        voltage: voltage[idx],
        current_density: current[idx],
        power: (voltage[idx] * current[idx]).round_to(DIGITS_POWER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> JvAnalyzer {
        JvAnalyzer::new(AnalysisConfig::default()).unwrap()
    }

    fn ramp(len: usize) -> (Vec<f64>, Vec<f64>) {
        let v = linspace(-0.2, 1.1, len);
        let j = v.iter().map(|x| 20.0 - 25.0 * x).collect();
        (v, j)
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let (v, j) = ramp(100);
        let err = analyzer().analyze(&v, &[&j[..99]], 1.0).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedInput(_)));
    }

    #[test]
    fn rejects_curves_shorter_than_fit_window() {
        let (v, j) = ramp(40);
        assert!(analyzer().analyze_channel(&v, &j, 1.0).is_err());
        let (v, j) = ramp(41);
        assert!(analyzer().analyze_channel(&v, &j, 1.0).is_ok());
    }

    #[test]
    fn rejects_bad_area_and_channel_count() {
        let (v, j) = ramp(100);
        assert!(analyzer().analyze(&v, &[&j], 0.0).is_err());
        assert!(analyzer().analyze(&v, &[&j], f64::NAN).is_err());
        assert_eq!(
            analyzer().analyze(&v, &[], 1.0).unwrap_err(),
            AnalysisError::UnsupportedChannelCount(0)
        );
        assert_eq!(
            analyzer().analyze(&v, &[&j, &j, &j], 1.0).unwrap_err(),
            AnalysisError::UnsupportedChannelCount(3)
        );
    }

    #[test]
    fn oversized_shunt_factor_is_rejected_up_front() {
        let config = AnalysisConfig {
            fit_window: 20,
            shunt_factor: usize::MAX,
            ..Default::default()
        };
        assert!(matches!(
            JvAnalyzer::new(config),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_non_finite_samples() {
        let (v, mut j) = ramp(100);
        j[10] = f64::INFINITY;
        assert!(analyzer().analyze_channel(&v, &j, 1.0).is_err());
    }

    #[test]
    fn linear_curve_reports_exact_figures() {
        // J = 20 - 25 V crosses zero current at 0.8 V.
        let (v, j) = ramp(200);
        let result = analyzer().analyze_channel(&v, &j, 1.0).unwrap();
        assert!((result.open_circuit_voltage - 0.8).abs() < 2e-3);
        assert!((result.short_circuit_current_density - 20.0).abs() < 0.05);
        // A straight line has FF of 25 %, up to grid placement.
        assert!((result.fill_factor - 25.0).abs() < 0.5);
        assert_eq!(result.series_resistance, 40.0);
        assert_eq!(result.shunt_resistance, 40.0);
    }

    #[test]
    fn mpp_uses_raw_argmax() {
        // Every product is negative; the least negative one wins.
        let v = linspace(0.1, 1.0, 50);
        let j: Vec<f64> = v.iter().map(|x| -5.0 - x).collect();
        let result = analyzer().analyze_channel(&v, &j, 1.0).unwrap();
        assert_eq!(result.max_power_point.voltage, 0.1);
        assert_eq!(result.max_power_point.current_density, -5.1);
        assert!(result.open_circuit_voltage.is_nan());
    }

    #[test]
    fn analyze_table_rejects_voltage_as_channel() {
        let (v, j) = ramp(100);
        let table = JvTable::from_columns(vec!["V".into(), "J".into()], vec![v, j]).unwrap();
        assert!(analyzer().analyze_table(&table, &[0], 1.0).is_err());
        assert!(analyzer().analyze_table(&table, &[2], 1.0).is_err());
        assert_eq!(analyzer().analyze_table(&table, &[1, 1], 1.0).unwrap().len(), 2);
    }
}
