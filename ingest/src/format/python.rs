//! Key/value header of the Python solar-simulator export.
//!
//! The first 47 lines carry `Key:<TAB>value` pairs; line 48 starts the curve
//! block.

use anyhow::Context;

use super::HeaderMetadata;

const HEADER_LINES: usize = 47;
const AREA_KEY: &str = "PixArea:";
const DATETIME_KEY: &str = "DateTime:";

fn lookup<'a>(lines: &[&'a str], key: &str) -> Option<&'a str> {
    lines.iter().take(HEADER_LINES).find_map(|line| {
        let mut fields = line.split('\t');
        if fields.next()?.trim() != key {
            return None;
        }
        fields.next().map(str::trim).filter(|value| !value.is_empty())
    })
}

pub fn read_header(lines: &[&str]) -> anyhow::Result<HeaderMetadata> {
    let area_raw = lookup(lines, AREA_KEY)
        .with_context(|| format!("header key {} missing", AREA_KEY))?;
    let active_area: f64 = area_raw
        .parse()
        .with_context(|| format!("{} '{}' is not a number", AREA_KEY, area_raw))?;

    Ok(HeaderMetadata {
        active_area,
        datetime: lookup(lines, DATETIME_KEY).map(str::to_string),
    })
}
