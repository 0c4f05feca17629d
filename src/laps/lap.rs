//! Segmented lap records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::types::Value;

/// Where a lap's time came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LapTimeSource {
    /// `LapCurrentLapTime` at the last sample of the lap.
    Stopwatch,
    /// Sample count times the sample interval.
    SampleCount,
}

/// Why a lap is not a clean timed lap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// Track surface reported off track or not in world.
    OffTrack,
    /// The car was on pit road during the lap.
    PitRoad,
    /// Lap stopwatch went backwards between samples.
    TimeRewind,
    /// Lap number decreased or skipped ahead; the lap was cut short.
    LapSequenceReset,
    /// The recorded lap time was zero or negative.
    NonPositiveLapTime,
    /// The recording ended mid-lap.
    SessionEnded,
    /// Incident count increased during the lap.
    Incident,
    /// Position jumped further than a car can travel between samples.
    Teleport,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InvalidReason::OffTrack => "off track",
            InvalidReason::PitRoad => "on pit road",
            InvalidReason::TimeRewind => "lap time went backwards",
            InvalidReason::LapSequenceReset => "lap sequence reset",
            InvalidReason::NonPositiveLapTime => "non-positive lap time",
            InvalidReason::SessionEnded => "session ended mid-lap",
            InvalidReason::Incident => "incident during lap",
            InvalidReason::Teleport => "position reset",
        };
        f.write_str(text)
    }
}

/// Per-lap aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LapStats {
    pub samples: usize,
    /// Metres per second
    pub max_speed: Option<f64>,
    /// Metres per second
    pub mean_speed: Option<f64>,
    /// Incident points gained during the lap
    pub incidents: i64,
}

impl LapStats {
    pub fn max_speed_kph(&self) -> Option<f64> {
        self.max_speed.map(|v| v * 3.6)
    }

    pub fn mean_speed_kph(&self) -> Option<f64> {
        self.mean_speed.map(|v| v * 3.6)
    }
}

/// One lap cut from the sample stream.
///
/// `start..end` indexes sample records (end exclusive). Personal-best bookkeeping belongs to the
/// caller; [`time`](Self::time) is the value to compare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    pub number: i32,
    pub start: usize,
    pub end: usize,
    /// Seconds
    pub time: f64,
    pub time_source: LapTimeSource,
    /// `LapLastLapTime` published by the simulator when the lap closed.
    pub official_time: Option<f64>,
    /// `SessionTime` at the first sample
    pub start_session_time: Option<f64>,
    /// Seconds per sector; empty when sectors are unknown or were not all crossed.
    pub sectors: Vec<f64>,
    pub valid: bool,
    /// False when the lap was cut short by the end of the recording or a sequence reset.
    pub complete: bool,
    pub invalid_reasons: Vec<InvalidReason>,
    pub stats: LapStats,
    /// Requested channels over the lap, one value per sample.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub series: BTreeMap<String, Vec<Value>>,
}

impl Lap {
    pub fn sample_count(&self) -> usize {
        self.end - self.start
    }

    pub fn is_timed(&self) -> bool {
        self.valid && self.complete
    }

    /// Official time when the simulator published one, else the segmented time.
    pub fn best_known_time(&self) -> f64 {
        self.official_time.unwrap_or(self.time)
    }

    pub fn series(&self, channel: &str) -> Option<&[Value]> {
        self.series.get(channel).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_reads_naturally() {
        assert_eq!(InvalidReason::PitRoad.to_string(), "on pit road");
        assert_eq!(InvalidReason::SessionEnded.to_string(), "session ended mid-lap");
    }

    #[test]
    fn reasons_serialize_as_snake_case() {
        let yaml = serde_yaml_ng::to_string(&InvalidReason::LapSequenceReset).unwrap();
        assert_eq!(yaml.trim(), "lap_sequence_reset");
    }

    #[test]
    fn speed_converts_to_kph() {
        let stats = LapStats { samples: 2, max_speed: Some(50.0), mean_speed: None, incidents: 0 };
        assert_eq!(stats.max_speed_kph(), Some(180.0));
        assert_eq!(stats.mean_speed_kph(), None);
    }
}
