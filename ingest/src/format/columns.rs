use anyhow::{bail, Context};
use jvcore::JvTable;

/// Parses a tab-separated curve block: one header line with column names,
/// then one sample per line.
///
/// Columns with no value in any row are dropped (exports often end every line
/// with a tab). A blank cell inside a kept column is an error.
pub fn parse_curve_block(lines: &[&str]) -> anyhow::Result<JvTable> {
    let (header, body) = lines.split_first().context("curve block has no header line")?;
    let names: Vec<String> = header.split('\t').map(|name| name.trim().to_string()).collect();

    let mut cells: Vec<Vec<Option<f64>>> = Vec::new();
    for (offset, line) in body.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row_number = offset + 1;
        let mut row = vec![None; names.len()];
        for (col, raw) in line.split('\t').enumerate() {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            if col >= names.len() {
                bail!("row {} has a value beyond the {} named columns", row_number, names.len());
            }
            let value: f64 = raw.parse().with_context(|| {
                format!("row {}, column '{}': '{}' is not a number", row_number, names[col], raw)
            })?;
            row[col] = Some(value);
        }
        cells.push(row);
    }

    if cells.is_empty() {
        bail!("curve block has no samples");
    }

    let kept: Vec<usize> = (0..names.len())
        .filter(|&col| cells.iter().any(|row| row[col].is_some()))
        .collect();

    let mut rows = Vec::with_capacity(cells.len());
    for (idx, row) in cells.iter().enumerate() {
        let values = kept
            .iter()
            .map(|&col| {
                row[col].with_context(|| format!("row {}, column '{}' is empty", idx + 1, names[col]))
            })
            .collect::<anyhow::Result<Vec<f64>>>()?;
        rows.push(values);
    }

    let kept_names = kept.iter().map(|&col| names[col].clone()).collect();
    Ok(JvTable::from_rows(kept_names, rows)?)
}
