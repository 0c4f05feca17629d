//! Parse configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;

use crate::laps::SegmenterConfig;
use crate::laps::segmenter::DEFAULT_TELEPORT_THRESHOLD_M;
use crate::stream::{DEFAULT_PROGRESS_INTERVAL, ParseProgress, ProgressCallback};
use std::sync::Arc;

/// Options for one parse.
///
/// The data fields (de)serialize so a task queue can keep them alongside the job; the progress
/// callback and cancellation token are attached at runtime.
///
/// ```rust
/// use stint::ParseOptions;
///
/// let options: ParseOptions = serde_yaml_ng::from_str("max_samples: 3600\ninclude_out_lap: true\n")?;
/// assert_eq!(options.max_samples, Some(3600));
/// assert!(options.capture_series);
/// # Ok::<(), serde_yaml_ng::Error>(())
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Use this rate instead of the header's tick rate.
    pub tick_rate_override: Option<f64>,
    /// Decode at most this many records.
    pub max_samples: Option<usize>,
    /// Keep the trailing lap's own validity instead of flagging it as session-ended.
    pub include_partial_laps: bool,
    /// Emit lap 0 (out-lap).
    pub include_out_lap: bool,
    /// Records between progress reports; zero disables them.
    pub progress_interval: usize,
    /// Position jump, in metres, that marks a reset.
    pub teleport_threshold_m: f64,
    /// Attach requested channel values to each lap.
    pub capture_series: bool,
    #[serde(skip)]
    pub progress: Option<ProgressCallback>,
    #[serde(skip)]
    pub cancellation: Option<CancellationToken>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            tick_rate_override: None,
            max_samples: None,
            include_partial_laps: false,
            include_out_lap: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            teleport_threshold_m: DEFAULT_TELEPORT_THRESHOLD_M,
            capture_series: true,
            progress: None,
            cancellation: None,
        }
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("tick_rate_override", &self.tick_rate_override)
            .field("max_samples", &self.max_samples)
            .field("include_partial_laps", &self.include_partial_laps)
            .field("include_out_lap", &self.include_out_lap)
            .field("progress_interval", &self.progress_interval)
            .field("teleport_threshold_m", &self.teleport_threshold_m)
            .field("capture_series", &self.capture_series)
            .field("progress", &self.progress.is_some())
            .field("cancellation", &self.cancellation.is_some())
            .finish()
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tick_rate(mut self, hz: f64) -> Self {
        self.tick_rate_override = Some(hz);
        self
    }

    pub fn with_max_samples(mut self, max: usize) -> Self {
        self.max_samples = Some(max);
        self
    }

    pub fn with_partial_laps(mut self, include: bool) -> Self {
        self.include_partial_laps = include;
        self
    }

    pub fn with_out_lap(mut self, include: bool) -> Self {
        self.include_out_lap = include;
        self
    }

    pub fn with_series(mut self, capture: bool) -> Self {
        self.capture_series = capture;
        self
    }

    pub fn with_teleport_threshold(mut self, metres: f64) -> Self {
        self.teleport_threshold_m = metres;
        self
    }

    /// Report progress every `interval` records to `callback`.
    pub fn with_progress<F>(mut self, interval: usize, callback: F) -> Self
    where
        F: Fn(ParseProgress) + Send + Sync + 'static,
    {
        self.progress_interval = interval;
        self.progress = Some(Arc::new(callback));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Effective tick rate given the file's own. Non-positive overrides are ignored.
    pub fn tick_rate(&self, file_rate: f64) -> f64 {
        self.tick_rate_override.filter(|hz| hz.is_finite() && *hz > 0.0).unwrap_or(file_rate)
    }

    /// Segmenter settings for a file; sector starts and series names come from the file.
    pub fn segmenter_config(
        &self,
        tick_rate: f64,
        sector_starts: Vec<f64>,
        series_channels: Vec<String>,
    ) -> SegmenterConfig {
        SegmenterConfig {
            tick_rate,
            include_partial_laps: self.include_partial_laps,
            include_out_lap: self.include_out_lap,
            teleport_threshold_m: self.teleport_threshold_m,
            sector_starts,
            series_channels: if self.capture_series { series_channels } else { Vec::new() },
        }
    }

    pub(crate) fn report(&self, progress: ParseProgress) {
        if let Some(callback) = &self.progress {
            callback(progress);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_yaml() {
        let yaml = serde_yaml_ng::to_string(&ParseOptions::default()).unwrap();
        let parsed: ParseOptions = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed.progress_interval, DEFAULT_PROGRESS_INTERVAL);
        assert_eq!(parsed.teleport_threshold_m, DEFAULT_TELEPORT_THRESHOLD_M);
        assert!(parsed.capture_series);
        assert!(parsed.progress.is_none());
    }

    #[test]
    fn override_wins_only_when_positive() {
        assert_eq!(ParseOptions::new().tick_rate(60.0), 60.0);
        assert_eq!(ParseOptions::new().with_tick_rate(360.0).tick_rate(60.0), 360.0);
        assert_eq!(ParseOptions::new().with_tick_rate(-1.0).tick_rate(60.0), 60.0);
    }

    #[test]
    fn series_capture_can_be_disabled() {
        let config = ParseOptions::new()
            .with_series(false)
            .segmenter_config(60.0, vec![0.0, 0.5], vec!["Speed".into()]);
        assert!(config.series_channels.is_empty());
        assert_eq!(config.sector_starts, vec![0.0, 0.5]);
    }

    #[test]
    fn debug_hides_callback() {
        let options = ParseOptions::new().with_progress(10, |_| {});
        let text = format!("{:?}", options);
        assert!(text.contains("progress: true"));
    }
}
