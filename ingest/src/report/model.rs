use chrono::NaiveDateTime;
use jvcore::telemetry::MetricsSnapshot;
use jvcore::JvResult;
use serde::Serialize;

use crate::format::InstrumentFormat;
use crate::workflow::naming::MultijunctionPosition;

/// Plotted curve: the oriented input samples, not the resample.
#[derive(Debug, Clone, Serialize)]
pub struct CurveRecord {
    pub name: String,
    pub voltage: Vec<f64>,
    pub current_density: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelReport {
    pub name: String,
    #[serde(flatten)]
    pub result: JvResult,
}

/// One export file.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub data_file: String,
    pub format: InstrumentFormat,
    /// Area from the export header, cm².
    pub active_area: f64,
    /// Area the resistances were normalised with, cm².
    pub analysis_area: f64,
    pub header_datetime: Option<String>,
    pub curves: Vec<CurveRecord>,
    pub channels: Vec<ChannelReport>,
}

/// One measurement: a scan, or a forward scan with its reverse partner.
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementReport {
    pub name: String,
    pub sample_id: String,
    pub notes: Option<String>,
    pub multijunction_position: Option<MultijunctionPosition>,
    pub timestamp: Option<NaiveDateTime>,
    pub scans: Vec<ScanReport>,
}

impl MeasurementReport {
    pub fn summary_line(&self) -> String {
        let channels: Vec<String> = self
            .scans
            .iter()
            .flat_map(|scan| scan.channels.iter())
            .map(|channel| {
                let r = &channel.result;
                format!(
                    "[{}] Voc={} V Jsc={} mA/cm2 FF={} % PCE={} % Rs={} Rsh={}",
                    channel.name,
                    r.open_circuit_voltage,
                    r.short_circuit_current_density,
                    r.fill_factor,
                    r.efficiency,
                    r.series_resistance,
                    r.shunt_resistance
                )
            })
            .collect();
        format!("{} -> {}", self.name, channels.join(" "))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedInput {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub measurements: Vec<MeasurementReport>,
    pub skipped: Vec<String>,
    pub failures: Vec<FailedInput>,
    pub metrics: MetricsSnapshot,
}
