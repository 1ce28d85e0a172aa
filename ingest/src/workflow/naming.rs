//! File-name conventions of the lab: `<sample-id>.<notes>.<kind>.<ext>`, with
//! python-rig scans stamped `..._YYYYMMDDTHHMMSS.jv.txt`.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";
const FILE_TIMESTAMP_LEN: usize = 15;
const HEADER_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S %p",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %H:%M:%S",
];
/// Characters cut from a forward file name before matching reverse scans.
const PARTNER_SUFFIX_LEN: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultijunctionPosition {
    Top,
    Mid,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileName {
    file_name: String,
    segments: Vec<String>,
}

impl FileName {
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        let segments = file_name.split('.').map(str::to_string).collect();
        Some(Self {
            file_name,
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.file_name
    }

    pub fn sample_id(&self) -> &str {
        &self.segments[0]
    }

    /// Free-text segment between sample id and measurement kind.
    pub fn notes(&self) -> Option<&str> {
        if self.segments.len() > 3 {
            Some(&self.segments[1])
        } else {
            None
        }
    }

    /// Measurement kind such as `jv` or `mpp`.
    pub fn kind(&self) -> Option<&str> {
        let len = self.segments.len();
        if len >= 3 {
            Some(&self.segments[len - 2])
        } else {
            None
        }
    }

    pub fn is_jv(&self) -> bool {
        self.kind() == Some("jv")
    }

    pub fn is_reverse_scan(&self) -> bool {
        self.file_name.contains("rev")
    }

    /// Acquisition time from the last 15 characters before `.<kind>.<ext>`.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let len = self.segments.len();
        if len < 3 {
            return None;
        }
        let stem = &self.segments[len - 3];
        let chars: Vec<char> = stem.chars().collect();
        if chars.len() < FILE_TIMESTAMP_LEN {
            return None;
        }
        let tail: String = chars[chars.len() - FILE_TIMESTAMP_LEN..].iter().collect();
        NaiveDateTime::parse_from_str(&tail, FILE_TIMESTAMP_FORMAT).ok()
    }

    /// Later matches win, so `top_bot` reads as bottom.
    pub fn multijunction_position(&self) -> Option<MultijunctionPosition> {
        let notes = self.notes()?;
        if notes.contains("bot") {
            Some(MultijunctionPosition::Bottom)
        } else if notes.contains("mid") {
            Some(MultijunctionPosition::Mid)
        } else if notes.contains("top") {
            Some(MultijunctionPosition::Top)
        } else {
            None
        }
    }
}

pub fn parse_header_datetime(raw: &str) -> Option<NaiveDateTime> {
    HEADER_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw.trim(), format).ok())
}

/// Name prefix every reverse scan paired with `forward` must start with.
pub fn reverse_partner_prefix(forward: &str) -> Option<String> {
    let swapped: Vec<char> = forward.replace("fwd", "rev").chars().collect();
    if swapped.len() <= PARTNER_SUFFIX_LEN {
        return None;
    }
    Some(swapped[..swapped.len() - PARTNER_SUFFIX_LEN].iter().collect())
}

/// Reverse scan recorded between one second and one minute after `forward`.
/// When several candidates qualify the last one wins.
pub fn find_reverse_partner(forward: &Path, candidates: &[PathBuf]) -> Option<PathBuf> {
    let forward_name = FileName::from_path(forward)?;
    let forward_time = forward_name.timestamp()?;
    let prefix = reverse_partner_prefix(forward_name.as_str())?;

    candidates
        .iter()
        .filter(|candidate| candidate.as_path() != forward)
        .filter(|candidate| {
            let name = match FileName::from_path(candidate) {
                Some(name) => name,
                None => return false,
            };
            if !name.as_str().starts_with(&prefix) || !name.as_str().ends_with("jv.txt") {
                return false;
            }
            name.timestamp().map_or(false, |time| {
                let delta = time - forward_time;
                delta > Duration::seconds(1) && delta < Duration::minutes(1)
            })
        })
        .last()
        .cloned()
}
