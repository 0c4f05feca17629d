//! Segmentation inputs extracted from decoded rows.

use super::geo::GeoPoint;
use crate::stream::{ChannelPlan, SampleRow};
use crate::types::{TrackSurface, Value};
use crate::types::VarTable;

pub const SESSION_TIME: &str = "SessionTime";
pub const LAP: &str = "Lap";
pub const LAP_CURRENT_LAP_TIME: &str = "LapCurrentLapTime";
pub const LAP_LAST_LAP_TIME: &str = "LapLastLapTime";
pub const LAP_DIST_PCT: &str = "LapDistPct";
pub const ON_PIT_ROAD: &str = "OnPitRoad";
pub const PLAYER_TRACK_SURFACE: &str = "PlayerTrackSurface";
pub const INCIDENT_COUNT: &str = "PlayerCarMyIncidentCount";
pub const LAT: &str = "Lat";
pub const LON: &str = "Lon";
pub const SPEED: &str = "Speed";

/// Channels the segmenter reads, in plan order.
pub const SEGMENTATION_CHANNELS: &[&str] = &[
    SESSION_TIME,
    LAP,
    LAP_CURRENT_LAP_TIME,
    LAP_LAST_LAP_TIME,
    LAP_DIST_PCT,
    ON_PIT_ROAD,
    PLAYER_TRACK_SURFACE,
    INCIDENT_COUNT,
    LAT,
    LON,
    SPEED,
];

/// The segmenter's view of one sample.
///
/// Everything but the lap number is optional; recordings differ in which channels they carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LapSample {
    pub index: usize,
    pub lap: i32,
    pub session_time: Option<f64>,
    pub lap_current_time: Option<f64>,
    pub last_lap_time: Option<f64>,
    pub lap_dist_pct: Option<f64>,
    pub on_pit_road: bool,
    pub track_surface: Option<TrackSurface>,
    pub incidents: Option<i64>,
    pub position: Option<GeoPoint>,
    pub speed: Option<f64>,
    /// Values of the captured series channels, in series order.
    pub series: Vec<Value>,
}

impl LapSample {
    /// Sample with only a lap number, for driving the state machine directly.
    pub fn at(index: usize, lap: i32) -> Self {
        Self { index, lap, ..Default::default() }
    }
}

/// Plan slots of the segmentation and series channels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSlots {
    session_time: Option<usize>,
    lap: Option<usize>,
    lap_current_time: Option<usize>,
    last_lap_time: Option<usize>,
    lap_dist_pct: Option<usize>,
    on_pit_road: Option<usize>,
    track_surface: Option<usize>,
    incidents: Option<usize>,
    lat: Option<usize>,
    lon: Option<usize>,
    speed: Option<usize>,
    series: Vec<usize>,
    single_lap: Option<i32>,
}

impl SampleSlots {
    /// Add the segmentation channels to `plan` and remember where they landed.
    ///
    /// `series` names must already be planned; unplanned ones are skipped.
    pub fn resolve(plan: &mut ChannelPlan, table: &VarTable, series: &[String]) -> Self {
        let mut slot = |name: &str| plan.push(table, name);
        let mut slots = Self {
            session_time: slot(SESSION_TIME),
            lap: slot(LAP),
            lap_current_time: slot(LAP_CURRENT_LAP_TIME),
            last_lap_time: slot(LAP_LAST_LAP_TIME),
            lap_dist_pct: slot(LAP_DIST_PCT),
            on_pit_road: slot(ON_PIT_ROAD),
            track_surface: slot(PLAYER_TRACK_SURFACE),
            incidents: slot(INCIDENT_COUNT),
            lat: slot(LAT),
            lon: slot(LON),
            speed: slot(SPEED),
            series: Vec::new(),
            single_lap: None,
        };
        slots.series = series.iter().filter_map(|name| plan.slot(name)).collect();
        slots
    }

    /// Whether lap boundaries can be found at all.
    pub fn has_lap(&self) -> bool {
        self.lap.is_some()
    }

    /// Number every row as lap `number` when the file has no lap channel.
    pub fn or_single_lap(mut self, number: i32) -> Self {
        if self.lap.is_none() {
            self.single_lap = Some(number);
        }
        self
    }

    /// Extract a sample; `None` when the row carries no lap number.
    pub fn sample(&self, row: &SampleRow) -> Option<LapSample> {
        let lap = match self.lap {
            Some(_) => i32::try_from(row.i64_at(self.lap)?).ok()?,
            None => self.single_lap?,
        };
        let position = match (row.f64_at(self.lat), row.f64_at(self.lon)) {
            (Some(lat), Some(lon)) => GeoPoint::new(lat, lon),
            _ => None,
        };
        let track_surface = row
            .i64_at(self.track_surface)
            .and_then(|raw| i32::try_from(raw).ok())
            .map(TrackSurface::from_raw);

        Some(LapSample {
            index: row.index,
            lap,
            session_time: row.f64_at(self.session_time),
            lap_current_time: row.f64_at(self.lap_current_time),
            last_lap_time: row.f64_at(self.last_lap_time),
            lap_dist_pct: row.f64_at(self.lap_dist_pct),
            on_pit_road: row.bool_at(self.on_pit_road).unwrap_or(false),
            track_surface,
            incidents: row.i64_at(self.incidents),
            position,
            speed: row.f64_at(self.speed),
            series: self.series.iter().filter_map(|&slot| row.get(slot).cloned()).collect(),
        })
    }
}
