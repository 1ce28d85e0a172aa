use ndarray::{s, Array2};

use crate::analysis::crossing::first_sign_change;
use crate::prelude::{AnalysisError, AnalysisResult};

/// Row table of a JV export: column 0 holds voltage, the remaining columns
/// hold current channels in acquisition order.
#[derive(Debug, Clone, PartialEq)]
pub struct JvTable {
    names: Vec<String>,
    data: Array2<f64>,
}

/// Sign corrections applied by [`JvTable::orient`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    /// Voltage where the probe current first changes sign.
    pub voc_probe: Option<f64>,
    /// Probe current where the voltage first changes sign.
    pub jsc_probe: Option<f64>,
    pub voltage_negated: bool,
    pub current_negated: bool,
}

impl JvTable {
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<f64>>) -> AnalysisResult<Self> {
        let width = names.len();
        if width < 2 {
            return Err(AnalysisError::MalformedInput(format!(
                "a JV table needs a voltage and at least one current column, got {} columns",
                width
            )));
        }

        let height = rows.len();
        let mut flat = Vec::with_capacity(width * height);
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(AnalysisError::MalformedInput(format!(
                    "row {} has {} values, expected {}",
                    idx,
                    row.len(),
                    width
                )));
            }
            flat.extend(row);
        }

        let data = Array2::from_shape_vec((height, width), flat)
            .map_err(|err| AnalysisError::MalformedInput(err.to_string()))?;
        Ok(Self { names, data })
    }

    pub fn from_columns(names: Vec<String>, columns: Vec<Vec<f64>>) -> AnalysisResult<Self> {
        if names.len() != columns.len() {
            return Err(AnalysisError::MalformedInput(format!(
                "{} column names for {} columns",
                names.len(),
                columns.len()
            )));
        }
        let height = columns.first().map_or(0, Vec::len);
        if let Some(column) = columns.iter().find(|column| column.len() != height) {
            return Err(AnalysisError::MalformedInput(format!(
                "column lengths differ: {} vs {}",
                column.len(),
                height
            )));
        }
        let rows = (0..height)
            .map(|row| columns.iter().map(|column| column[row]).collect())
            .collect();
        Self::from_rows(names, rows)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    pub fn column_count(&self) -> usize {
        self.data.ncols()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }

    pub fn column_vec(&self, idx: usize) -> Vec<f64> {
        self.data.column(idx).to_vec()
    }

    pub fn voltage(&self) -> Vec<f64> {
        self.column_vec(0)
    }

    pub fn negate_columns(&mut self, columns: &[usize]) {
        for &idx in columns {
            self.data.column_mut(idx).mapv_inplace(|value| -value);
        }
    }

    /// Overwrites column `to` with the values of column `from`.
    pub fn copy_column(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let source = self.data.column(from).to_owned();
        self.data.column_mut(to).assign(&source);
    }

    pub fn reverse_rows(&mut self) {
        self.data = self.data.slice(s![..;-1, ..]).to_owned();
    }

    /// Reverses the whole table when the first voltage exceeds the last one.
    /// Returns whether a reversal happened.
    pub fn ensure_ascending(&mut self) -> bool {
        let rows = self.len();
        if rows < 2 || self.data[[0, 0]] <= self.data[[rows - 1, 0]] {
            return false;
        }
        self.reverse_rows();
        true
    }

    /// Flips sign conventions so the curve sits in the generator quadrant.
    ///
    /// The probe current column locates both axis crossings in the raw rows.
    /// A negative voltage at the current crossing negates the voltage column;
    /// a negative probe current at the voltage crossing negates every column in
    /// `current_columns`. A probe without a crossing leaves its sign alone.
    pub fn orient(&mut self, probe: usize, current_columns: &[usize]) -> Orientation {
        let voltage = self.data.column(0);
        let current = self.data.column(probe);

        let voc_probe = first_sign_change(current.iter().copied()).map(|idx| voltage[idx]);
        let jsc_probe = first_sign_change(voltage.iter().copied()).map(|idx| current[idx]);

        let voltage_negated = voc_probe.map_or(false, |value| value < 0.0);
        let current_negated = jsc_probe.map_or(false, |value| value < 0.0);

        if voltage_negated {
            self.negate_columns(&[0]);
        }
        if current_negated {
            self.negate_columns(current_columns);
        }

        Orientation {
            voc_probe,
            jsc_probe,
            voltage_negated,
            current_negated,
        }
    }
}
