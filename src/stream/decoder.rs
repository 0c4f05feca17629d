//! Sequential sample decoding over an opened IBT file.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::row::{ChannelPlan, SampleRow};
use crate::ibt::IbtFile;
use crate::source::ByteSource;
use crate::types::decode_value;
use crate::{ParseError, Result};

/// Records decoded between progress reports unless configured otherwise.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 1024;

/// Snapshot of how far a parse has got.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParseProgress {
    pub records_decoded: usize,
    pub records_total: usize,
}

impl ParseProgress {
    pub fn new(records_decoded: usize, records_total: usize) -> Self {
        Self { records_decoded, records_total }
    }

    /// Completion in `0.0..=100.0`. An empty file counts as done.
    pub fn percent(&self) -> f64 {
        if self.records_total == 0 {
            return 100.0;
        }
        (self.records_decoded as f64 / self.records_total as f64 * 100.0).min(100.0)
    }

    pub fn is_complete(&self) -> bool {
        self.records_decoded >= self.records_total
    }
}

/// Callback receiving progress reports from the decoding thread.
pub type ProgressCallback = Arc<dyn Fn(ParseProgress) + Send + Sync>;

/// How a row iterator stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// Still yielding rows.
    Running,
    /// Every record in range was decoded.
    Complete,
    /// The file ended before record `at`.
    Truncated { at: usize },
    /// The cancellation token fired before record `at`.
    Cancelled { at: usize },
    /// An I/O failure at record `at`; the error is returned by [`Rows::finish`].
    Failed { at: usize },
}

/// Result of a drained row iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    pub decoded: usize,
    /// First record that could not be read, when the file was cut short.
    pub truncated_at: Option<usize>,
}

/// Decodes the planned channels of every sample record, in file order.
///
/// Records are read one at a time into a reused buffer, so memory stays flat regardless of file
/// size. The decoder never goes past the declared record count or the configured cap.
pub struct SampleDecoder<'f, S> {
    file: &'f IbtFile<S>,
    plan: ChannelPlan,
    limit: usize,
    cancellation: Option<CancellationToken>,
    progress: Option<ProgressCallback>,
    progress_interval: usize,
}

impl<S> fmt::Debug for SampleDecoder<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleDecoder")
            .field("plan", &self.plan)
            .field("limit", &self.limit)
            .field("cancellable", &self.cancellation.is_some())
            .field("progress_interval", &self.progress_interval)
            .finish()
    }
}

impl<'f, S: ByteSource> SampleDecoder<'f, S> {
    pub fn new(file: &'f IbtFile<S>, plan: ChannelPlan) -> Self {
        Self {
            file,
            plan,
            limit: file.sample_region().declared,
            cancellation: None,
            progress: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Stop after `max` records.
    pub fn with_max_samples(mut self, max: Option<usize>) -> Self {
        if let Some(max) = max {
            self.limit = self.limit.min(max);
        }
        self
    }

    /// Checked between records.
    pub fn with_cancellation(mut self, token: Option<CancellationToken>) -> Self {
        self.cancellation = token;
        self
    }

    /// Report progress every `interval` records. Zero disables reports.
    pub fn with_progress(mut self, interval: usize, callback: Option<ProgressCallback>) -> Self {
        self.progress_interval = interval;
        self.progress = callback;
        self
    }

    pub fn plan(&self) -> &ChannelPlan {
        &self.plan
    }

    pub fn file(&self) -> &'f IbtFile<S> {
        self.file
    }

    /// Number of records this decoder will attempt.
    pub fn len(&self) -> usize {
        self.limit
    }

    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }

    /// Iterate every record from the start.
    pub fn rows(&self) -> Rows<'_, 'f, S> {
        self.rows_range(0..self.limit)
    }

    /// Iterate a sub-range of records, clamped to the decoder's limit.
    pub fn rows_range(&self, range: Range<usize>) -> Rows<'_, 'f, S> {
        let end = range.end.min(self.limit);
        let start = range.start.min(end);
        let stride = self.file.sample_region().stride;
        trace!("Decoding records {}..{} ({} channels)", start, end, self.plan.len());
        Rows {
            decoder: self,
            next: start,
            end,
            buffer: vec![0; stride],
            state: StreamEnd::Running,
            error: None,
        }
    }

    /// Decode a single record.
    pub fn decode_record(&self, index: usize) -> Result<SampleRow> {
        let mut buffer = vec![0; self.file.sample_region().stride];
        self.decode_into(index, &mut buffer)
    }

    fn decode_into(&self, index: usize, buffer: &mut [u8]) -> Result<SampleRow> {
        let region = self.file.sample_region();
        let offset = region.record_offset(index).ok_or_else(|| {
            ParseError::out_of_range(u64::MAX, region.stride, self.file.source().len())
        })?;
        self.file.reader().read_into(offset, buffer)?;

        let record: &[u8] = buffer;
        let values = self
            .plan
            .descriptors()
            .iter()
            .map(|descriptor| decode_value(record, descriptor))
            .collect::<Result<Vec<_>>>()?;
        Ok(SampleRow { index, values })
    }
}

/// Iterator over decoded rows. Inspect [`end`](Self::end) or call [`finish`](Self::finish) once
/// it stops to learn why.
pub struct Rows<'d, 'f, S> {
    decoder: &'d SampleDecoder<'f, S>,
    next: usize,
    end: usize,
    buffer: Vec<u8>,
    state: StreamEnd,
    error: Option<ParseError>,
}

impl<S: ByteSource> Rows<'_, '_, S> {
    pub fn end(&self) -> StreamEnd {
        self.state
    }

    /// Index of the next record to decode.
    pub fn position(&self) -> usize {
        self.next
    }

    /// Drain remaining rows and report how the stream ended.
    ///
    /// Truncation is not an error here; cancellation and I/O failures are.
    pub fn finish(mut self) -> Result<StreamSummary> {
        for _ in self.by_ref() {}
        match self.state {
            StreamEnd::Complete | StreamEnd::Running => {
                Ok(StreamSummary { decoded: self.next, truncated_at: None })
            }
            StreamEnd::Truncated { at } => Ok(StreamSummary { decoded: at, truncated_at: Some(at) }),
            StreamEnd::Cancelled { at } => Err(ParseError::Cancelled { records: at }),
            StreamEnd::Failed { at } => Err(self
                .error
                .take()
                .unwrap_or_else(|| ParseError::out_of_range(at as u64, 0, 0))),
        }
    }

    fn report_progress(&self, decoded: usize) {
        let interval = self.decoder.progress_interval;
        if interval == 0 || decoded % interval != 0 {
            return;
        }
        if let Some(callback) = &self.decoder.progress {
            callback(ParseProgress::new(decoded, self.decoder.limit));
        }
    }
}

impl<S: ByteSource> Iterator for Rows<'_, '_, S> {
    type Item = SampleRow;

    fn next(&mut self) -> Option<SampleRow> {
        if self.state != StreamEnd::Running {
            return None;
        }
        if self.next >= self.end {
            self.state = StreamEnd::Complete;
            return None;
        }
        if self.decoder.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled) {
            debug!("Decoding cancelled at record {}", self.next);
            self.state = StreamEnd::Cancelled { at: self.next };
            return None;
        }

        let index = self.next;
        match self.decoder.decode_into(index, &mut self.buffer) {
            Ok(row) => {
                self.next += 1;
                self.report_progress(self.next);
                Some(row)
            }
            Err(ParseError::OutOfRange { offset, len, available }) => {
                warn!(
                    "Sample record {} unreadable ({} bytes at {:#x}, file has {}); stopping",
                    index, len, offset, available
                );
                self.state = StreamEnd::Truncated { at: index };
                None
            }
            Err(err) => {
                warn!("Sample record {} failed to decode: {}", index, err);
                self.state = StreamEnd::Failed { at: index };
                self.error = Some(err);
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.state != StreamEnd::Running {
            return (0, Some(0));
        }
        (0, Some(self.end - self.next))
    }
}
