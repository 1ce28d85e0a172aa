use anyhow::{ensure, Context};
use jvcore::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::generator::profile::SyntheticConfig;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub analysis: AnalysisConfig,
    /// Replaces the active area read from each export header, cm².
    pub cell_area_override: Option<f64>,
    /// Look for the reverse scan recorded right after a forward scan.
    pub pair_reverse_scans: bool,
    pub synthetic: SyntheticConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            cell_area_override: None,
            pair_reverse_scans: true,
            synthetic: SyntheticConfig::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Applies command-line flags on top of the loaded or default config.
    pub fn with_overrides(
        mut self,
        fit_window: Option<usize>,
        shunt_factor: Option<usize>,
        cell_area: Option<f64>,
    ) -> anyhow::Result<Self> {
        if let Some(fit_window) = fit_window {
            self.analysis.fit_window = fit_window;
        }
        if let Some(shunt_factor) = shunt_factor {
            self.analysis.shunt_factor = shunt_factor;
        }
        if cell_area.is_some() {
            self.cell_area_override = cell_area;
        }
        if let Some(area) = self.cell_area_override {
            ensure!(area > 0.0, "cell area override must be positive, got {}", area);
        }
        Ok(self)
    }
}
