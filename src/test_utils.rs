//! Synthetic IBT recordings for tests and benchmarks
//!
//! [`IbtBuilder`] writes complete, well-formed IBT files from a list of [`SyntheticSample`]s so
//! that decoding and lap segmentation can be exercised without recorded telemetry. Tests corrupt
//! the returned bytes through [`header_offsets`] to reach the error paths.

#![cfg(any(test, feature = "benchmark"))]

use crate::ibt::format::{FILE_HEADER_SIZE, IRSDK_VAR_HEADER_SIZE};
use crate::types::VariableType;

/// Byte offsets of header fields, for corrupting built files.
pub mod header_offsets {
    pub const VERSION: usize = 0;
    pub const TICK_RATE: usize = 8;
    pub const SESSION_INFO_LEN: usize = 16;
    pub const SESSION_INFO_OFFSET: usize = 20;
    pub const NUM_VARS: usize = 24;
    pub const VAR_HEADER_OFFSET: usize = 28;
    pub const BUF_LEN: usize = 36;
    /// `varBuf[0].bufOffset`
    pub const BUF_OFFSET: usize = 52;
    pub const RECORD_COUNT: usize = 140;
}

/// Session-info block written when a test does not supply one.
pub const DEFAULT_SESSION_YAML: &str = "---
WeekendInfo:
 TrackName: synthetic raceway
 TrackDisplayName: Synthetic Raceway
 TrackConfigName: Grand Prix
 TrackLength: 3.00 km
 TrackWeatherType: Static
 TrackSkies: Clear
 TrackAirTemp: 21.50 C
 TrackSurfaceTemp: 30.25 C

SessionInfo:
 CurrentSessionNum: 0
 Sessions:
 - SessionNum: 0
   SessionType: Practice
   SessionName: PRACTICE

SplitTimeInfo:
 Sectors:
 - SectorNum: 0
   SectorStartPct: 0.000000
 - SectorNum: 1
   SectorStartPct: 0.500000

DriverInfo:
 DriverCarIdx: 0
 DriverSetupName: baseline.sto
 Drivers:
 - CarIdx: 0
   UserName: Test Driver
   CarPath: testcar
   CarScreenName: Test Car
   CarClassShortName: TC
";

/// One channel laid out in synthetic records.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticChannel {
    pub name: &'static str,
    pub var_type: VariableType,
    pub count: usize,
    pub unit: &'static str,
}

const fn channel(
    name: &'static str,
    var_type: VariableType,
    count: usize,
    unit: &'static str,
) -> SyntheticChannel {
    SyntheticChannel { name, var_type, count, unit }
}

/// Channels written by default, in declaration order.
pub const STANDARD_CHANNELS: &[SyntheticChannel] = &[
    channel("SessionTime", VariableType::Float64, 1, "s"),
    channel("Lap", VariableType::Int32, 1, ""),
    channel("LapCurrentLapTime", VariableType::Float32, 1, "s"),
    channel("LapLastLapTime", VariableType::Float32, 1, "s"),
    channel("LapDistPct", VariableType::Float32, 1, "%"),
    channel("OnPitRoad", VariableType::Bool, 1, ""),
    channel("PlayerTrackSurface", VariableType::Int32, 1, "irsdk_TrkLoc"),
    channel("PlayerCarMyIncidentCount", VariableType::Int32, 1, ""),
    channel("Lat", VariableType::Float64, 1, "deg"),
    channel("Lon", VariableType::Float64, 1, "deg"),
    channel("Speed", VariableType::Float32, 1, "m/s"),
    channel("RPM", VariableType::Float32, 1, "revs/min"),
    channel("Gear", VariableType::Int32, 1, ""),
    channel("EngineWarnings", VariableType::BitField, 1, "irsdk_EngineWarnings"),
    channel("CarIdxLap", VariableType::Int32, 4, ""),
];

/// Values of one synthetic sample. Channels absent from the builder's layout are not written.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSample {
    pub session_time: f64,
    pub lap: i32,
    pub lap_current_time: f32,
    pub last_lap_time: f32,
    pub lap_dist_pct: f32,
    pub on_pit_road: bool,
    pub track_surface: i32,
    pub incidents: i32,
    pub lat: f64,
    pub lon: f64,
    pub speed: f32,
    pub rpm: f32,
    pub gear: i32,
    pub engine_warnings: u32,
}

impl Default for SyntheticSample {
    fn default() -> Self {
        Self {
            session_time: 0.0,
            lap: 0,
            lap_current_time: 0.0,
            last_lap_time: 0.0,
            lap_dist_pct: 0.0,
            on_pit_road: false,
            track_surface: 3,
            incidents: 0,
            lat: 33.8,
            lon: -84.3,
            speed: 50.0,
            rpm: 6000.0,
            gear: 4,
            engine_warnings: 0,
        }
    }
}

impl SyntheticSample {
    /// Samples for consecutive `(lap number, sample count)` runs at `tick_rate`.
    ///
    /// Within a run `LapCurrentLapTime` counts `1/tick, 2/tick, .. n/tick`, so a run of `n`
    /// samples times at `n / tick_rate` seconds. `LapLastLapTime` carries the previous run's
    /// time, position advances about 1 m per sample.
    pub fn lap_sequence(runs: &[(i32, usize)], tick_rate: f64) -> Vec<SyntheticSample> {
        let mut samples = Vec::new();
        let mut last_lap_time = 0.0f32;
        for &(lap, count) in runs {
            for k in 0..count {
                let index = samples.len();
                samples.push(SyntheticSample {
                    session_time: index as f64 / tick_rate,
                    lap,
                    lap_current_time: ((k + 1) as f64 / tick_rate) as f32,
                    last_lap_time,
                    lap_dist_pct: (k as f64 / count as f64) as f32,
                    lat: 33.8 + index as f64 * 1e-5,
                    speed: 50.0 + (k % 10) as f32,
                    ..Default::default()
                });
            }
            last_lap_time = (count as f64 / tick_rate) as f32;
        }
        samples
    }
}

/// Builder for synthetic IBT files.
#[derive(Debug, Clone)]
pub struct IbtBuilder {
    version: i32,
    tick_rate: i32,
    channels: Vec<SyntheticChannel>,
    samples: Vec<SyntheticSample>,
    session_block: Vec<u8>,
    record_count: Option<i32>,
}

impl Default for IbtBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IbtBuilder {
    pub fn new() -> Self {
        Self {
            version: 2,
            tick_rate: 60,
            channels: STANDARD_CHANNELS.to_vec(),
            samples: Vec::new(),
            session_block: DEFAULT_SESSION_YAML.as_bytes().to_vec(),
            record_count: None,
        }
    }

    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn tick_rate(mut self, tick_rate: i32) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn samples(mut self, samples: impl IntoIterator<Item = SyntheticSample>) -> Self {
        self.samples.extend(samples);
        self
    }

    /// Drop a channel from the layout.
    pub fn without_channel(mut self, name: &str) -> Self {
        self.channels.retain(|c| c.name != name);
        self
    }

    pub fn session_yaml(mut self, yaml: &str) -> Self {
        self.session_block = yaml.as_bytes().to_vec();
        self
    }

    /// Raw session-info bytes, written as given.
    pub fn session_block(mut self, block: Vec<u8>) -> Self {
        self.session_block = block;
        self
    }

    /// Override the disk sub-header record count (default: number of samples).
    pub fn record_count(mut self, count: i32) -> Self {
        self.record_count = Some(count);
        self
    }

    /// Record stride of the current layout.
    pub fn stride(&self) -> usize {
        self.channels.iter().map(|c| c.var_type.size() * c.count).sum()
    }

    pub fn build(&self) -> Vec<u8> {
        let stride = self.stride();
        let var_header_offset = FILE_HEADER_SIZE;
        let session_info_offset = var_header_offset + self.channels.len() * IRSDK_VAR_HEADER_SIZE;
        // NUL padding after the YAML, as iRacing writes it.
        let session_info_len = self.session_block.len() + 16;
        let buf_offset = session_info_offset + session_info_len;

        let mut out = vec![0u8; buf_offset];

        put_i32(&mut out, header_offsets::VERSION, self.version);
        put_i32(&mut out, 4, 1);
        put_i32(&mut out, header_offsets::TICK_RATE, self.tick_rate);
        put_i32(&mut out, header_offsets::SESSION_INFO_LEN, session_info_len as i32);
        put_i32(&mut out, header_offsets::SESSION_INFO_OFFSET, session_info_offset as i32);
        put_i32(&mut out, header_offsets::NUM_VARS, self.channels.len() as i32);
        put_i32(&mut out, header_offsets::VAR_HEADER_OFFSET, var_header_offset as i32);
        put_i32(&mut out, 32, 1);
        put_i32(&mut out, header_offsets::BUF_LEN, stride as i32);
        put_i32(&mut out, 48, self.samples.len() as i32);
        put_i32(&mut out, header_offsets::BUF_OFFSET, buf_offset as i32);

        let start = self.samples.first().map_or(0.0, |s| s.session_time);
        let end = self.samples.last().map_or(0.0, |s| s.session_time);
        let laps = self.samples.iter().map(|s| s.lap).max().unwrap_or(0);
        out[112..120].copy_from_slice(&1_700_000_000i64.to_le_bytes());
        out[120..128].copy_from_slice(&start.to_le_bytes());
        out[128..136].copy_from_slice(&end.to_le_bytes());
        put_i32(&mut out, 136, laps);
        let records = self.record_count.unwrap_or(self.samples.len() as i32);
        put_i32(&mut out, header_offsets::RECORD_COUNT, records);

        let mut offset = 0usize;
        let mut layout = Vec::with_capacity(self.channels.len());
        for (i, c) in self.channels.iter().enumerate() {
            let base = var_header_offset + i * IRSDK_VAR_HEADER_SIZE;
            put_i32(&mut out, base, c.var_type.tag());
            put_i32(&mut out, base + 4, offset as i32);
            put_i32(&mut out, base + 8, c.count as i32);
            write_str(&mut out[base + 16..base + 48], c.name);
            write_str(&mut out[base + 48..base + 112], c.name);
            write_str(&mut out[base + 112..base + 144], c.unit);
            layout.push((c.name, offset));
            offset += c.var_type.size() * c.count;
        }

        out[session_info_offset..session_info_offset + self.session_block.len()]
            .copy_from_slice(&self.session_block);

        for sample in &self.samples {
            let mut record = vec![0u8; stride];
            for &(name, at) in &layout {
                write_channel(&mut record, at, name, sample);
            }
            out.extend_from_slice(&record);
        }
        out
    }
}

fn put_i32(out: &mut [u8], at: usize, value: i32) {
    out[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn write_str(field: &mut [u8], value: &str) {
    let bytes = value.as_bytes();
    let len = bytes.len().min(field.len() - 1);
    field[..len].copy_from_slice(&bytes[..len]);
}

fn write_channel(record: &mut [u8], at: usize, name: &str, s: &SyntheticSample) {
    let mut put = |bytes: &[u8]| record[at..at + bytes.len()].copy_from_slice(bytes);
    match name {
        "SessionTime" => put(&s.session_time.to_le_bytes()),
        "Lap" => put(&s.lap.to_le_bytes()),
        "LapCurrentLapTime" => put(&s.lap_current_time.to_le_bytes()),
        "LapLastLapTime" => put(&s.last_lap_time.to_le_bytes()),
        "LapDistPct" => put(&s.lap_dist_pct.to_le_bytes()),
        "OnPitRoad" => put(&[s.on_pit_road as u8]),
        "PlayerTrackSurface" => put(&s.track_surface.to_le_bytes()),
        "PlayerCarMyIncidentCount" => put(&s.incidents.to_le_bytes()),
        "Lat" => put(&s.lat.to_le_bytes()),
        "Lon" => put(&s.lon.to_le_bytes()),
        "Speed" => put(&s.speed.to_le_bytes()),
        "RPM" => put(&s.rpm.to_le_bytes()),
        "Gear" => put(&s.gear.to_le_bytes()),
        "EngineWarnings" => put(&s.engine_warnings.to_le_bytes()),
        "CarIdxLap" => {
            let mut laps = [0u8; 16];
            for car in 0..4 {
                let lap = if car == 0 { s.lap } else { -1 };
                laps[car * 4..car * 4 + 4].copy_from_slice(&lap.to_le_bytes());
            }
            put(&laps)
        }
        _ => {}
    }
}
