//! Decoding and lap segmentation for iRacing IBT telemetry recordings.
//!
//! Stint turns a `.ibt` file into a [`Session`]: the session metadata plus the laps cut from the
//! 60 Hz sample stream, each with its time, sectors, validity and the requested channel series.
//!
//! # Features
//!
//! - **Streaming**: sample records are decoded one at a time straight from the byte source
//! - **Graceful degradation**: truncated files and lap anomalies produce flagged results, not
//!   errors
//! - **Cross-platform**: positional reads on any platform, no simulator required
//! - **Async friendly**: [`ParseJob`] runs a parse on tokio's blocking pool with progress and
//!   cancellation
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use stint::{ParseOptions, parse_file};
//!
//! let session = parse_file("session.ibt", ["Speed", "Throttle", "Brake"], &ParseOptions::default())?;
//! println!("{:?} at {:?}", session.info.car_name, session.info.track_name);
//! if let Some(best) = session.best_lap() {
//!     println!("best lap {} in {:.3}s", best.number, best.time);
//! }
//! # Ok::<(), stint::ParseError>(())
//! ```
//!
//! ## Lower-level access
//!
//! ```rust,no_run
//! use stint::ibt::IbtFile;
//! use stint::stream::{ChannelPlan, SampleDecoder};
//!
//! let file = IbtFile::open_path("session.ibt")?;
//! let decoder = SampleDecoder::new(&file, ChannelPlan::new(file.vars(), ["RPM"]));
//! for row in decoder.rows_range(0..600) {
//!     println!("{} {:?}", row.index, row.values[0]);
//! }
//! # Ok::<(), stint::ParseError>(())
//! ```

// Core types and error handling
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;
mod yaml_utils;

// Container and sample decoding
pub mod ibt;
pub mod source;
pub mod stream;

// Metadata, segmentation and assembly
pub mod laps;
pub mod schema;
pub mod session;

// Core exports
pub use error::*;
pub use types::*;

pub use laps::{InvalidReason, Lap, LapStats, LapTimeSource};
pub use schema::{SessionDocument, SessionInfo, SessionType};
pub use session::{ParseJob, ParseOptions, Session, Truncation, parse, parse_file};
pub use stream::ParseProgress;
