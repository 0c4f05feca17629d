//! Session assembly
//!
//! [`parse`] ties the pipeline together: open the container, plan the channels, stream the
//! records through the lap segmenter and hand back an immutable [`Session`]. [`ParseJob`] runs the
//! same pass on tokio's blocking pool with a progress stream and cancellation.

pub mod assembler;
pub mod job;
pub mod options;


pub use assembler::{parse, parse_file};
pub use job::ParseJob;
pub use options::ParseOptions;

use serde::{Deserialize, Serialize};

use crate::laps::Lap;
use crate::schema::SessionInfo;
use crate::{ParseError, Result};

/// Where a short file ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Truncation {
    /// First record that could not be read
    pub at_record: usize,
    /// Records the header declared
    pub declared: usize,
}

/// Result of one parse: session metadata plus the laps cut from the sample stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub info: SessionInfo,
    /// Ordered by start index, non-overlapping
    pub laps: Vec<Lap>,
    /// Records actually decoded
    pub total_samples: usize,
    /// Samples per second
    pub tick_rate: f64,
    /// Records the header declared
    pub declared_records: usize,
    /// Set when the file ended before the declared record count.
    pub truncation: Option<Truncation>,
    /// Requested channels present in the file, in request order
    pub channels: Vec<String>,
    /// Requested channels the file does not carry
    pub missing_channels: Vec<String>,
    /// Recording start, unix seconds
    pub recorded_at: Option<i64>,
}

impl Session {
    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }

    /// Turn a truncated session into [`ParseError::TruncatedFile`], which still carries it.
    pub fn require_complete(self) -> Result<Self> {
        match self.truncation {
            Some(truncation) => Err(ParseError::TruncatedFile {
                decoded: self.total_samples,
                declared: truncation.declared,
                session: Box::new(self),
            }),
            None => Ok(self),
        }
    }

    /// Laps that ran start line to start line.
    pub fn completed_laps(&self) -> impl Iterator<Item = &Lap> {
        self.laps.iter().filter(|lap| lap.complete)
    }

    /// Complete laps with no invalidation.
    pub fn valid_laps(&self) -> impl Iterator<Item = &Lap> {
        self.laps.iter().filter(|lap| lap.is_timed())
    }

    /// Fastest valid lap.
    pub fn best_lap(&self) -> Option<&Lap> {
        self.valid_laps().min_by(|a, b| a.best_known_time().total_cmp(&b.best_known_time()))
    }

    /// Recorded duration in seconds.
    pub fn duration(&self) -> f64 {
        if self.tick_rate > 0.0 { self.total_samples as f64 / self.tick_rate } else { 0.0 }
    }
}
