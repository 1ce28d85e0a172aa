pub mod columns;
pub mod labview;
pub mod python;

use anyhow::{bail, Context};
use jvcore::curve::Orientation;
use jvcore::JvTable;
use serde::{Deserialize, Serialize};

const PYTHON_MARKER: &str = "Singapore Solar Simulator, Python";

/// Software that produced a JV export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentFormat {
    Labview,
    Python,
}

/// Column mapping for one export format.
#[derive(Debug, Clone, Copy)]
pub struct FormatLayout {
    /// Zero-based line holding the curve column names.
    pub curve_header_line: usize,
    pub voltage_column: &'static str,
    /// Columns negated together when the photocurrent is reported negative.
    pub sign_columns: &'static [&'static str],
    /// Current columns handed to the analyzer, one result each.
    pub analysis_columns: &'static [&'static str],
    /// `(from, to)`: overwrite `to` with `from` after orientation.
    pub mirror_column: Option<(&'static str, &'static str)>,
}

const LABVIEW_LAYOUT: FormatLayout = FormatLayout {
    curve_header_line: 11,
    voltage_column: "Voltage [V]",
    sign_columns: &[
        "Current density [1] [mA/cm^2]",
        "Current density [2] [mA/cm^2]",
        "Average current density [mA/cm^2]",
    ],
    analysis_columns: &[
        "Current density [1] [mA/cm^2]",
        "Current density [2] [mA/cm^2]",
    ],
    mirror_column: None,
};

const PYTHON_LAYOUT: FormatLayout = FormatLayout {
    curve_header_line: 48,
    voltage_column: "Voltage",
    sign_columns: &["CurrentDensity", "Current"],
    analysis_columns: &["CurrentDensity"],
    mirror_column: Some(("CurrentDensity", "Current")),
};

impl InstrumentFormat {
    pub fn identify(content: &str) -> Self {
        if content.contains(PYTHON_MARKER) {
            InstrumentFormat::Python
        } else {
            InstrumentFormat::Labview
        }
    }

    pub fn layout(self) -> &'static FormatLayout {
        match self {
            InstrumentFormat::Labview => &LABVIEW_LAYOUT,
            InstrumentFormat::Python => &PYTHON_LAYOUT,
        }
    }

    fn read_header(self, lines: &[&str]) -> anyhow::Result<HeaderMetadata> {
        match self {
            InstrumentFormat::Labview => labview::read_header(lines),
            InstrumentFormat::Python => python::read_header(lines),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMetadata {
    /// cm².
    pub active_area: f64,
    pub datetime: Option<String>,
}

/// A parsed export, oriented into the generator quadrant and sorted by
/// ascending voltage, ready for analysis.
#[derive(Debug, Clone)]
pub struct JvMeasurement {
    pub format: InstrumentFormat,
    pub header: HeaderMetadata,
    pub table: JvTable,
    pub orientation: Orientation,
    pub reversed: bool,
}

impl JvMeasurement {
    pub fn layout(&self) -> &'static FormatLayout {
        self.format.layout()
    }

    /// Table indices of the analysis columns.
    pub fn analysis_channels(&self) -> anyhow::Result<Vec<usize>> {
        column_indices(&self.table, self.layout().analysis_columns)
    }

    /// Columns plotted as curves: everything after voltage except the last column.
    pub fn curve_columns(&self) -> std::ops::Range<usize> {
        1..self.table.column_count().saturating_sub(1).max(1)
    }
}

fn column_indices(table: &JvTable, names: &[&str]) -> anyhow::Result<Vec<usize>> {
    names
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .with_context(|| format!("column '{}' missing from curve block", name))
        })
        .collect()
}

/// Parses an export and applies the orientation every caller of the analyzer
/// is responsible for: sign correction, then ascending voltage order.
pub fn read_measurement(content: &str) -> anyhow::Result<JvMeasurement> {
    let format = InstrumentFormat::identify(content);
    let layout = format.layout();
    let lines: Vec<&str> = content.lines().collect();

    let header = format
        .read_header(&lines)
        .with_context(|| format!("reading {:?} header", format))?;
    if lines.len() <= layout.curve_header_line {
        bail!(
            "export has {} lines, curve block expected at line {}",
            lines.len(),
            layout.curve_header_line
        );
    }
    let mut table = columns::parse_curve_block(&lines[layout.curve_header_line..])
        .context("parsing curve block")?;

    if table.names()[0] != layout.voltage_column {
        bail!(
            "first curve column is '{}', expected '{}'",
            table.names()[0],
            layout.voltage_column
        );
    }
    let sign_columns = column_indices(&table, layout.sign_columns)?;

    let orientation = table.orient(1, &sign_columns);
    if orientation.voc_probe.is_none() || orientation.jsc_probe.is_none() {
        log::warn!(
            "curve does not cross both axes in the raw rows, signs left as recorded"
        );
    }
    let reversed = table.ensure_ascending();

    if let Some((from, to)) = layout.mirror_column {
        let indices = column_indices(&table, &[from, to])?;
        table.copy_column(indices[0], indices[1]);
    }

    Ok(JvMeasurement {
        format,
        header,
        table,
        orientation,
        reversed,
    })
}
