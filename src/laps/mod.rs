//! Lap segmentation
//!
//! Decoded rows become [`LapSample`]s, which drive the [`LapState`] machine in [`segmenter`]. Each
//! closed lap carries its time, sectors, validity and per-lap statistics.

pub mod geo;
pub mod lap;
pub mod sample;
pub mod sectors;
pub mod segmenter;

pub use geo::GeoPoint;
pub use lap::{InvalidReason, Lap, LapStats, LapTimeSource};
pub use sample::{LapSample, SEGMENTATION_CHANNELS, SampleSlots};
pub use segmenter::{LapSegmenter, LapState, OpenLap, SegmenterConfig, finish, transition};
