//! Record-by-record sample decoding
//!
//! A [`ChannelPlan`] resolves requested channel names once; a [`SampleDecoder`] then walks the
//! sample region yielding one [`SampleRow`] per record until the data runs out, the cap is hit or
//! the caller cancels.

pub mod decoder;
pub mod row;

pub use decoder::{
    DEFAULT_PROGRESS_INTERVAL, ParseProgress, ProgressCallback, Rows, SampleDecoder, StreamEnd,
    StreamSummary,
};
pub use row::{ChannelPlan, SampleRow};
