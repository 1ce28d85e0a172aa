use serde::Serialize;
use std::sync::Mutex;

use crate::curve::JvResult;

/// Batch counters, shareable across threads.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub files_processed: usize,
    pub files_failed: usize,
    pub channels_analyzed: usize,
    pub degenerate_channels: usize,
    pub failed_fits: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_file(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.files_processed += 1;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.files_failed += 1;
        }
    }

    /// Counts a channel result; degenerate curves are not counted as failed fits.
    pub fn record_channel(&self, result: &JvResult) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.channels_analyzed += 1;
            if !result.crosses_both_axes() {
                metrics.degenerate_channels += 1;
            } else if result.series_resistance.is_nan() || result.shunt_resistance.is_nan() {
                metrics.failed_fits += 1;
            }
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
