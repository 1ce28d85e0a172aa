use serde::{Deserialize, Serialize};

/// Number of evenly spaced voltages the working copy of a curve is resampled onto.
pub const RESAMPLE_POINTS: usize = 1000;

/// Tunables shared by every analyzer stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Half-width, in resampled points, of the line-fitting windows.
    pub fit_window: usize,
    /// Widening factor applied to the fit window around short circuit.
    pub shunt_factor: usize,
    /// Upper bound on forward shifts while searching for a negative shunt slope.
    pub max_shunt_shift: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fit_window: 20,
            shunt_factor: 1,
            max_shunt_shift: RESAMPLE_POINTS,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.fit_window == 0 {
            return Err(AnalysisError::InvalidConfig(
                "fit_window must be at least 1".into(),
            ));
        }
        if self.shunt_factor == 0 {
            return Err(AnalysisError::InvalidConfig(
                "shunt_factor must be at least 1".into(),
            ));
        }
        match self.fit_window.checked_mul(self.shunt_factor) {
            Some(half_width) if half_width <= RESAMPLE_POINTS => {}
            _ => {
                return Err(AnalysisError::InvalidConfig(format!(
                    "fit_window * shunt_factor must not exceed {} resampled points, got {} * {}",
                    RESAMPLE_POINTS, self.fit_window, self.shunt_factor
                )))
            }
        }
        if self.max_shunt_shift > RESAMPLE_POINTS {
            return Err(AnalysisError::InvalidConfig(format!(
                "max_shunt_shift must not exceed {}, got {}",
                RESAMPLE_POINTS, self.max_shunt_shift
            )));
        }
        Ok(())
    }

    /// Smallest number of samples a channel must carry.
    pub fn min_samples(&self) -> usize {
        self.fit_window.saturating_mul(2).saturating_add(1)
    }
}

/// Structural errors. Numerical degeneracies never surface here; they are
/// encoded as NaN fields on the result instead.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum AnalysisError {
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("expected one or two current channels, got {0}")]
    UnsupportedChannelCount(usize),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
