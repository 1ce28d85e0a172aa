//! Header block of the LabVIEW solar-simulator export.
//!
//! Line 0 names the header columns, lines 1..=10 hold metadata and line 11
//! starts the curve block.

use anyhow::Context;

use super::HeaderMetadata;

const AREA_LINE: usize = 2;
const DATETIME_LINE: usize = 4;

fn field<'a>(lines: &[&'a str], line: usize, col: usize) -> Option<&'a str> {
    lines
        .get(line)?
        .split('\t')
        .nth(col)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

pub fn read_header(lines: &[&str]) -> anyhow::Result<HeaderMetadata> {
    let area_raw = field(lines, AREA_LINE, 1)
        .with_context(|| format!("active area missing on header line {}", AREA_LINE))?;
    let active_area: f64 = area_raw
        .parse()
        .with_context(|| format!("active area '{}' is not a number", area_raw))?;

    let datetime = match (field(lines, DATETIME_LINE, 0), field(lines, DATETIME_LINE, 1)) {
        (Some(date), Some(time)) => Some(format!("{} {}", date, time)),
        _ => None,
    };

    Ok(HeaderMetadata {
        active_area,
        datetime,
    })
}
