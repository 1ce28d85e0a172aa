use anyhow::Context;
use jvcore::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use jvcore::JvAnalyzer;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::format::{read_measurement, HeaderMetadata, InstrumentFormat, JvMeasurement};
use crate::generator::profile::{build_curve_table, SyntheticConfig};
use crate::report::model::{
    BatchReport, ChannelReport, CurveRecord, FailedInput, MeasurementReport, ScanReport,
};
use crate::workflow::config::WorkflowConfig;
use crate::workflow::naming::{find_reverse_partner, parse_header_datetime, FileName};

const FORWARD_SCAN: &str = "Forward Scan";
const REVERSE_SCAN: &str = "Reverse Scan";

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    analyzer: JvAnalyzer,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> anyhow::Result<Self> {
        let analyzer = JvAnalyzer::new(config.analysis).context("configuring analyzer")?;
        let logger = LogManager::new("jvingest::runner");
        let analysis = analyzer.config();
        logger.debug(&format!(
            "fit window {}, shunt factor {}, shift bound {}",
            analysis.fit_window, analysis.shunt_factor, analysis.max_shunt_shift
        ));
        Ok(Self {
            config,
            analyzer,
            metrics: Arc::new(MetricsRecorder::new()),
            logger,
        })
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Analyzes an oriented measurement into a scan report.
    pub fn analyze_measurement(
        &self,
        measurement: &JvMeasurement,
        data_file: &str,
    ) -> anyhow::Result<ScanReport> {
        let area = self
            .config
            .cell_area_override
            .unwrap_or(measurement.header.active_area);
        let channels = measurement.analysis_channels()?;
        self.logger.debug(&format!(
            "{}: voltage negated {}, current negated {}, rows reversed {}",
            data_file,
            measurement.orientation.voltage_negated,
            measurement.orientation.current_negated,
            measurement.reversed
        ));
        let results = self
            .analyzer
            .analyze_table(&measurement.table, &channels, area)
            .with_context(|| format!("analyzing {}", data_file))?;

        let table = &measurement.table;
        let voltage = table.voltage();
        let curves = measurement
            .curve_columns()
            .map(|idx| CurveRecord {
                name: table.names()[idx].clone(),
                voltage: voltage.clone(),
                current_density: table.column_vec(idx),
            })
            .collect();

        let channels = channels
            .iter()
            .zip(results)
            .map(|(&idx, result)| {
                self.metrics.record_channel(&result);
                ChannelReport {
                    name: table.names()[idx].clone(),
                    result,
                }
            })
            .collect();

        Ok(ScanReport {
            data_file: data_file.to_string(),
            format: measurement.format,
            active_area: measurement.header.active_area,
            analysis_area: area,
            header_datetime: measurement.header.datetime.clone(),
            curves,
            channels,
        })
    }

    /// Reads, orients and analyzes a single export.
    pub fn execute_file(&self, path: &Path) -> anyhow::Result<(JvMeasurement, ScanReport)> {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let content = String::from_utf8_lossy(&bytes);
        let measurement =
            read_measurement(&content).with_context(|| format!("parsing {}", path.display()))?;
        let data_file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let scan = self.analyze_measurement(&measurement, &data_file)?;
        Ok((measurement, scan))
    }

    /// Processes a forward export together with its reverse partner, if any.
    pub fn execute_measurement(
        &self,
        path: &Path,
        siblings: &[PathBuf],
    ) -> anyhow::Result<MeasurementReport> {
        let file_name = FileName::from_path(path)
            .with_context(|| format!("{} has no usable file name", path.display()))?;
        let (measurement, mut forward) = self.execute_file(path)?;

        let mut scans = Vec::new();
        let partner = if self.config.pair_reverse_scans
            && measurement.format == InstrumentFormat::Python
        {
            find_reverse_partner(path, siblings)
        } else {
            None
        };

        if let Some(partner) = partner {
            self.logger.record(&format!(
                "pairing {} with reverse scan {}",
                path.display(),
                partner.display()
            ));
            let (_, mut reverse) = self.execute_file(&partner)?;
            rename_first_curve(&mut forward, FORWARD_SCAN);
            rename_first_curve(&mut reverse, REVERSE_SCAN);
            scans.push(forward);
            scans.push(reverse);
        } else {
            scans.push(forward);
        }

        let timestamp = file_name.timestamp().or_else(|| {
            let parsed = measurement
                .header
                .datetime
                .as_deref()
                .and_then(parse_header_datetime);
            if parsed.is_none() {
                self.logger
                    .warn(&format!("could not parse a datetime for {}", file_name.as_str()));
            }
            parsed
        });

        let notes = file_name.notes().map(str::to_string);
        let name = match &notes {
            Some(notes) => format!("{} {}", file_name.sample_id(), notes),
            None => file_name.sample_id().to_string(),
        };

        self.metrics.record_file();
        Ok(MeasurementReport {
            name,
            sample_id: file_name.sample_id().to_string(),
            multijunction_position: file_name.multijunction_position(),
            notes,
            timestamp,
            scans,
        })
    }

    /// Generates and analyzes a synthetic curve, going through the same
    /// orientation steps as an export.
    pub fn execute_synthetic(&self, config: &SyntheticConfig) -> anyhow::Result<MeasurementReport> {
        let mut table = build_curve_table(config)?;
        let orientation = table.orient(1, &[1]);
        let reversed = table.ensure_ascending();
        let measurement = JvMeasurement {
            format: InstrumentFormat::Python,
            header: HeaderMetadata {
                active_area: config.cell_area,
                datetime: None,
            },
            table,
            orientation,
            reversed,
        };
        let mut scan = self.analyze_measurement(&measurement, "synthetic")?;
        // A two-column table has no trailing column to leave out of the plot.
        scan.curves = vec![CurveRecord {
            name: measurement.table.names()[1].clone(),
            voltage: measurement.table.voltage(),
            current_density: measurement.table.column_vec(1),
        }];

        self.metrics.record_file();
        Ok(MeasurementReport {
            name: format!("synthetic seed {}", config.seed),
            sample_id: "synthetic".to_string(),
            notes: None,
            multijunction_position: None,
            timestamp: None,
            scans: vec![scan],
        })
    }

    /// Processes every path; one failing file never stops the batch.
    pub fn run_batch(&self, paths: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport::default();

        for path in paths {
            let is_reverse = FileName::from_path(path)
                .map_or(false, |name| name.is_jv() && name.is_reverse_scan());
            if is_reverse {
                self.logger.record(&format!(
                    "skipping {}, reverse scans are reported with their forward scan",
                    path.display()
                ));
                report.skipped.push(path.display().to_string());
                continue;
            }

            let siblings = sibling_files(path);
            match self.execute_measurement(path, &siblings) {
                Ok(measurement) => report.measurements.push(measurement),
                Err(err) => {
                    self.metrics.record_error();
                    self.logger
                        .warn(&format!("{} failed: {:#}", path.display(), err));
                    report.failures.push(FailedInput {
                        path: path.display().to_string(),
                        error: format!("{:#}", err),
                    });
                }
            }
        }

        report.metrics = self.metrics.snapshot();
        report
    }
}

fn rename_first_curve(scan: &mut ScanReport, name: &str) {
    if let Some(curve) = scan.curves.first_mut() {
        curve.name = name.to_string();
    }
}

fn sibling_files(path: &Path) -> Vec<PathBuf> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    match fs::read_dir(dir) {
        Ok(entries) => {
            let mut files: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                .filter(|candidate| candidate.is_file())
                .collect();
            files.sort();
            files
        }
        Err(_) => Vec::new(),
    }
}
