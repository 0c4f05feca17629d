//! One sequential pass from byte source to [`Session`].

use std::path::Path;

use tracing::{debug, info, warn};

use super::options::ParseOptions;
use super::{Session, Truncation};
use crate::ibt::IbtFile;
use crate::laps::{LapSegmenter, SampleSlots};
use crate::source::{ByteSource, FileSource};
use crate::stream::{ChannelPlan, ParseProgress, SampleDecoder};
use crate::Result;

/// Parse a recording and segment it into laps.
///
/// `requested` names the channels to carry per lap; the segmentation channels are decoded
/// regardless. Only structural, I/O and cancellation failures are errors: a short file yields a
/// session with [`truncation`](Session::truncation) set.
///
/// ```rust,no_run
/// use stint::{parse, source::FileSource, ParseOptions};
///
/// let source = FileSource::open("session.ibt")?;
/// let session = parse(source, ["Speed", "Throttle"], &ParseOptions::default())?;
/// for lap in session.valid_laps() {
///     println!("lap {}: {:.3}s", lap.number, lap.time);
/// }
/// # Ok::<(), stint::ParseError>(())
/// ```
pub fn parse<S, I, N>(source: S, requested: I, options: &ParseOptions) -> Result<Session>
where
    S: ByteSource,
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
{
    let file = IbtFile::open(source)?;
    assemble(&file, requested, options)
}

/// [`parse`] a file on disk. The handle is closed on every exit path.
pub fn parse_file<P, I, N>(path: P, requested: I, options: &ParseOptions) -> Result<Session>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
{
    let path = path.as_ref();
    info!("Parsing IBT file: {}", path.display());
    parse(FileSource::open(path)?, requested, options)
}

/// Run the decode and segmentation pass over an opened file.
pub fn assemble<S, I, N>(file: &IbtFile<S>, requested: I, options: &ParseOptions) -> Result<Session>
where
    S: ByteSource,
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
{
    let mut plan = ChannelPlan::new(file.vars(), requested);
    let channels: Vec<String> = plan.names().map(str::to_string).collect();
    let missing_channels = plan.missing().to_vec();
    if !missing_channels.is_empty() {
        warn!("Requested channels not in file: {}", missing_channels.join(", "));
    }

    let mut slots = SampleSlots::resolve(&mut plan, file.vars(), &channels);
    if !slots.has_lap() {
        warn!("File has no Lap channel; treating the whole recording as lap 1");
        slots = slots.or_single_lap(1);
    }

    let info = file.session_info().clone();
    let tick_rate = options.tick_rate(file.tick_rate());
    let config = options.segmenter_config(tick_rate, info.sector_starts.clone(), channels.clone());
    let region = file.sample_region();

    let decoder = SampleDecoder::new(file, plan)
        .with_max_samples(options.max_samples)
        .with_cancellation(options.cancellation.clone())
        .with_progress(options.progress_interval, options.progress.clone());

    info!(
        "Decoding {} of {} records at {} Hz ({} channels)",
        decoder.len(),
        region.declared,
        tick_rate,
        decoder.plan().len()
    );

    let mut segmenter = LapSegmenter::new(config);
    let mut laps = Vec::new();
    let mut rows = decoder.rows();
    for row in rows.by_ref() {
        if let Some(sample) = slots.sample(&row) {
            laps.extend(segmenter.push(sample));
        }
    }
    let summary = rows.finish()?;
    laps.extend(segmenter.finish());

    let truncation = summary
        .truncated_at
        .map(|at_record| Truncation { at_record, declared: region.declared });
    if let Some(truncation) = &truncation {
        warn!(
            "Recording truncated: {} of {} records readable",
            truncation.at_record, truncation.declared
        );
    }
    options.report(ParseProgress::new(summary.decoded, summary.decoded));

    let session = Session {
        info,
        laps,
        total_samples: summary.decoded,
        tick_rate,
        declared_records: region.declared,
        truncation,
        channels,
        missing_channels,
        recorded_at: (file.header().disk.start_date > 0).then_some(file.header().disk.start_date),
    };

    debug!(
        "Laps: {:?}",
        session.laps.iter().map(|lap| (lap.number, lap.valid)).collect::<Vec<_>>()
    );
    info!(
        "Parsed session: {} laps ({} valid) from {} samples",
        session.laps.len(),
        session.valid_laps().count(),
        session.total_samples
    );
    Ok(session)
}
