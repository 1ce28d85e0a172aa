//! Photovoltaic JV-curve analysis core.
//!
//! The modules split the extraction into well-defined pieces: numeric helpers,
//! the in-memory curve table, the analyzer stages and telemetry. The analyzer
//! is a pure transform over in-memory arrays; callers own file handling and
//! orientation of the raw rows.

pub mod analysis;
pub mod curve;
pub mod math;
pub mod prelude;
pub mod telemetry;

pub use analysis::JvAnalyzer;
pub use curve::{JvResult, JvTable, MaxPowerPoint};
pub use prelude::{AnalysisConfig, AnalysisError, AnalysisResult};
