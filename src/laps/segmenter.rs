//! Lap segmentation state machine
//!
//! [`transition`] is a pure function from `(state, sample)` to `(state, closed lap)`;
//! [`LapSegmenter`] owns the state for callers feeding samples one at a time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace};

use super::geo::GeoPoint;
use super::lap::{InvalidReason, Lap, LapStats, LapTimeSource};
use super::sample::LapSample;
use super::sectors::{SectorClock, interior_boundaries};
use crate::ibt::format::FALLBACK_TICK_RATE;
use crate::types::Value;

/// Default teleport threshold; a car covers roughly 1 m per sample at racing speed.
pub const DEFAULT_TELEPORT_THRESHOLD_M: f64 = 100.0;

/// Segmentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Samples per second, used when the lap stopwatch is unavailable.
    pub tick_rate: f64,
    /// Keep the trailing lap's own validity instead of flagging it `SessionEnded`.
    pub include_partial_laps: bool,
    /// Emit lap 0 (and negative lap numbers).
    pub include_out_lap: bool,
    pub teleport_threshold_m: f64,
    /// Sector start fractions, including 0.0 for the first sector.
    pub sector_starts: Vec<f64>,
    /// Names of the series values carried by each [`LapSample`], in order.
    pub series_channels: Vec<String>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            tick_rate: FALLBACK_TICK_RATE,
            include_partial_laps: false,
            include_out_lap: false,
            teleport_threshold_m: DEFAULT_TELEPORT_THRESHOLD_M,
            sector_starts: Vec::new(),
            series_channels: Vec::new(),
        }
    }
}

impl SegmenterConfig {
    /// Seconds between samples.
    pub fn sample_interval(&self) -> f64 {
        if self.tick_rate.is_finite() && self.tick_rate > 0.0 {
            1.0 / self.tick_rate
        } else {
            1.0 / FALLBACK_TICK_RATE
        }
    }
}

/// Bookkeeping for the lap being driven.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenLap {
    pub number: i32,
    pub start: usize,
    last_index: usize,
    samples: usize,
    start_session_time: Option<f64>,
    reasons: Vec<InvalidReason>,
    stopwatch: Option<f64>,
    pct: Option<f64>,
    position: Option<GeoPoint>,
    incident_count: Option<i64>,
    incidents: i64,
    speed_sum: f64,
    speed_samples: usize,
    max_speed: Option<f64>,
    boundaries: Vec<f64>,
    sectors: SectorClock,
    series: Vec<Vec<Value>>,
}

impl OpenLap {
    /// Open a lap at `sample`. With a `previous` lap, the step from its last sample is still
    /// checked for incidents and position jumps.
    fn begin(config: &SegmenterConfig, sample: LapSample, previous: Option<&OpenLap>) -> Self {
        let boundaries = interior_boundaries(&config.sector_starts);
        let mut open = Self {
            number: sample.lap,
            start: sample.index,
            last_index: sample.index,
            samples: 0,
            start_session_time: sample.session_time,
            reasons: Vec::new(),
            stopwatch: None,
            pct: None,
            position: previous.and_then(|lap| lap.position),
            incident_count: previous.and_then(|lap| lap.incident_count),
            incidents: 0,
            speed_sum: 0.0,
            speed_samples: 0,
            max_speed: None,
            sectors: SectorClock::new(boundaries.len()),
            boundaries,
            series: vec![Vec::new(); sample.series.len()],
        };
        open.absorb(config, sample);
        open
    }

    /// Samples taken so far.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Reasons collected so far.
    pub fn invalid_reasons(&self) -> &[InvalidReason] {
        &self.reasons
    }

    fn flag(&mut self, reason: InvalidReason) {
        if !self.reasons.contains(&reason) {
            self.reasons.push(reason);
        }
    }

    fn absorb(&mut self, config: &SegmenterConfig, sample: LapSample) {
        self.samples += 1;
        self.last_index = sample.index;

        if sample.track_surface.is_some_and(|surface| surface.invalidates_lap()) {
            self.flag(InvalidReason::OffTrack);
        }
        if sample.on_pit_road {
            self.flag(InvalidReason::PitRoad);
        }

        if let (Some(previous), Some(current)) = (self.stopwatch, sample.lap_current_time) {
            if current < previous {
                self.flag(InvalidReason::TimeRewind);
            }
        }

        let counted = sample.index.saturating_sub(self.start) + 1;
        let elapsed =
            sample.lap_current_time.unwrap_or(counted as f64 * config.sample_interval());
        if let (Some(previous), Some(current)) = (self.pct, sample.lap_dist_pct) {
            self.sectors.observe(&self.boundaries, previous, current, elapsed);
        }

        if let (Some(previous), Some(current)) = (self.position, sample.position) {
            let jump = previous.distance_m(&current);
            if jump > config.teleport_threshold_m {
                debug!("Lap {}: position jumped {:.1} m at sample {}", self.number, jump, sample.index);
                self.flag(InvalidReason::Teleport);
            }
        }

        if let (Some(previous), Some(current)) = (self.incident_count, sample.incidents) {
            if current > previous {
                self.incidents += current - previous;
                self.flag(InvalidReason::Incident);
            }
        }

        if let Some(speed) = sample.speed.filter(|v| v.is_finite()) {
            self.speed_sum += speed;
            self.speed_samples += 1;
            self.max_speed = Some(self.max_speed.map_or(speed, |max| max.max(speed)));
        }

        for (column, value) in self.series.iter_mut().zip(sample.series) {
            column.push(value);
        }

        self.stopwatch = sample.lap_current_time.or(self.stopwatch);
        self.pct = sample.lap_dist_pct.or(self.pct);
        self.position = sample.position.or(self.position);
        self.incident_count = sample.incidents.or(self.incident_count);
    }

    fn close(
        mut self,
        config: &SegmenterConfig,
        end: usize,
        official_time: Option<f64>,
        complete: bool,
        reason: Option<InvalidReason>,
    ) -> Lap {
        let counted = self.samples as f64 * config.sample_interval();
        let (time, time_source) = match self.stopwatch {
            Some(t) if t > 0.0 => (t, LapTimeSource::Stopwatch),
            Some(_) => {
                self.flag(InvalidReason::NonPositiveLapTime);
                (counted, LapTimeSource::SampleCount)
            }
            None => (counted, LapTimeSource::SampleCount),
        };
        if let Some(reason) = reason {
            self.flag(reason);
        }

        let sectors = if complete { self.sectors.sector_times(time) } else { Vec::new() };
        let series: BTreeMap<String, Vec<Value>> =
            config.series_channels.iter().cloned().zip(self.series).collect();

        Lap {
            number: self.number,
            start: self.start,
            end: end.max(self.start + 1),
            time,
            time_source,
            official_time,
            start_session_time: self.start_session_time,
            sectors,
            valid: self.reasons.is_empty(),
            complete,
            invalid_reasons: self.reasons,
            stats: LapStats {
                samples: self.samples,
                max_speed: self.max_speed,
                mean_speed: (self.speed_samples > 0)
                    .then(|| self.speed_sum / self.speed_samples as f64),
                incidents: self.incidents,
            },
            series,
        }
    }
}

/// Segmenter state between samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LapState {
    /// No sample seen yet.
    #[default]
    NoLapInProgress,
    LapInProgress(OpenLap),
    /// A lap closed on the latest sample, which opened this one.
    LapJustClosed(OpenLap),
}

impl LapState {
    pub fn open_lap(&self) -> Option<&OpenLap> {
        match self {
            LapState::NoLapInProgress => None,
            LapState::LapInProgress(open) | LapState::LapJustClosed(open) => Some(open),
        }
    }
}

/// Advance the state machine by one sample.
///
/// Returns the next state and the lap closed by this sample, if any. Out-laps are dropped here
/// unless the config asks for them.
pub fn transition(
    config: &SegmenterConfig,
    state: LapState,
    sample: LapSample,
) -> (LapState, Option<Lap>) {
    match state {
        LapState::NoLapInProgress => {
            trace!("First lap number {} at sample {}", sample.lap, sample.index);
            (LapState::LapInProgress(OpenLap::begin(config, sample, None)), None)
        }
        LapState::LapInProgress(mut open) | LapState::LapJustClosed(mut open) => {
            let delta = i64::from(sample.lap) - i64::from(open.number);
            if delta == 0 {
                open.absorb(config, sample);
                return (LapState::LapInProgress(open), None);
            }

            let index = sample.index;
            let (next, lap) = if delta == 1 {
                let official = sample.last_lap_time.filter(|t| *t > 0.0);
                let next = OpenLap::begin(config, sample, Some(&open));
                (next, open.close(config, index, official, true, None))
            } else {
                debug!(
                    "Lap number went from {} to {} at sample {}; restarting",
                    open.number, sample.lap, index
                );
                let next = OpenLap::begin(config, sample, None);
                let reason = Some(InvalidReason::LapSequenceReset);
                (next, open.close(config, index, None, false, reason))
            };
            (LapState::LapJustClosed(next), emit(config, lap))
        }
    }
}

/// Close whatever lap is in progress at the end of the stream.
pub fn finish(config: &SegmenterConfig, state: LapState) -> Option<Lap> {
    let open = match state {
        LapState::NoLapInProgress => return None,
        LapState::LapInProgress(open) | LapState::LapJustClosed(open) => open,
    };
    let end = open.last_index + 1;
    let reason = (!config.include_partial_laps).then_some(InvalidReason::SessionEnded);
    emit(config, open.close(config, end, None, false, reason))
}

fn emit(config: &SegmenterConfig, lap: Lap) -> Option<Lap> {
    if lap.number <= 0 && !config.include_out_lap {
        trace!("Dropping out-lap {} [{}, {})", lap.number, lap.start, lap.end);
        return None;
    }
    trace!(
        "Lap {} [{}, {}): {:.3}s valid={} complete={}",
        lap.number,
        lap.start,
        lap.end,
        lap.time,
        lap.valid,
        lap.complete
    );
    Some(lap)
}

/// Feeds samples through [`transition`], collecting nothing itself.
#[derive(Debug, Clone, Default)]
pub struct LapSegmenter {
    config: SegmenterConfig,
    state: LapState,
}

impl LapSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config, state: LapState::NoLapInProgress }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    pub fn state(&self) -> &LapState {
        &self.state
    }

    /// Feed one sample; returns the lap it closed, if any.
    pub fn push(&mut self, sample: LapSample) -> Option<Lap> {
        let state = std::mem::take(&mut self.state);
        let (next, lap) = transition(&self.config, state, sample);
        self.state = next;
        lap
    }

    /// Close the trailing lap.
    pub fn finish(self) -> Option<Lap> {
        finish(&self.config, self.state)
    }

    /// Segment a whole sample sequence.
    pub fn segment(config: SegmenterConfig, samples: impl IntoIterator<Item = LapSample>) -> Vec<Lap> {
        let mut segmenter = Self::new(config);
        let mut laps: Vec<Lap> = samples.into_iter().filter_map(|s| segmenter.push(s)).collect();
        laps.extend(segmenter.finish());
        laps
    }
}
