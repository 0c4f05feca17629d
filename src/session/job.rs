//! Background parse with progress reporting and cancellation.

use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::Session;
use super::assembler::parse_file;
use super::options::ParseOptions;
use crate::stream::ParseProgress;
use crate::{ParseError, Result};

/// A parse running on tokio's blocking pool.
///
/// Dropping the job cancels the parse; the worker stops before its next record and closes the
/// file.
///
/// ```rust,no_run
/// use futures::StreamExt;
/// use stint::{ParseJob, ParseOptions};
///
/// # async fn run() -> stint::Result<()> {
/// let job = ParseJob::spawn("session.ibt", ["Speed"], ParseOptions::default());
/// let mut progress = Box::pin(job.progress_updates());
/// tokio::spawn(async move {
///     while let Some(p) = progress.next().await {
///         println!("{:.0}%", p.percent());
///     }
/// });
/// let session = job.wait().await?;
/// println!("{} laps", session.laps.len());
/// # Ok(())
/// # }
/// ```
pub struct ParseJob {
    path: PathBuf,
    progress: watch::Receiver<Option<ParseProgress>>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<Result<Session>>>,
}

impl ParseJob {
    /// Start parsing `path`. Must be called from within a tokio runtime.
    ///
    /// A cancellation token already set on `options` still applies; the job derives its own
    /// child token from it. An existing progress callback keeps receiving reports.
    pub fn spawn<P, I, N>(path: P, channels: I, options: ParseOptions) -> Self
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let path = path.as_ref().to_path_buf();
        let channels: Vec<String> = channels.into_iter().map(|c| c.as_ref().to_string()).collect();
        let (progress_tx, progress_rx) = watch::channel(None);

        let cancel = options
            .cancellation
            .as_ref()
            .map(CancellationToken::child_token)
            .unwrap_or_default();

        let mut options = options;
        let forward = options.progress.take();
        options.progress = Some(Arc::new(move |progress: ParseProgress| {
            let _ = progress_tx.send(Some(progress));
            if let Some(callback) = &forward {
                callback(progress);
            }
        }));
        options.cancellation = Some(cancel.clone());

        info!("Spawning parse job for {}", path.display());
        let worker_path = path.clone();
        let handle =
            tokio::task::spawn_blocking(move || parse_file(&worker_path, &channels, &options));

        Self { path, progress: progress_rx, cancel, handle: Some(handle) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Progress reports as a stream. Ends once the parse finishes.
    pub fn progress_updates(&self) -> impl Stream<Item = ParseProgress> + 'static {
        WatchStream::new(self.progress.clone()).filter_map(|opt| async move { opt })
    }

    /// Latest progress report, if any arrived yet.
    pub fn latest_progress(&self) -> Option<ParseProgress> {
        *self.progress.borrow()
    }

    /// Ask the worker to stop before its next record.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the parse to finish.
    pub async fn wait(mut self) -> Result<Session> {
        let Some(handle) = self.handle.take() else {
            return Err(ParseError::Cancelled { records: 0 });
        };
        match handle.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => {
                let records = self.latest_progress().map_or(0, |p| p.records_decoded);
                Err(ParseError::Cancelled { records })
            }
        }
    }
}

impl Drop for ParseJob {
    fn drop(&mut self) {
        debug!("Dropping parse job for {}", self.path.display());
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{IbtBuilder, SyntheticSample};
    use anyhow::Result;

    fn write_recording(name: &str, runs: &[(i32, usize)]) -> Result<PathBuf> {
        let bytes = IbtBuilder::new().samples(SyntheticSample::lap_sequence(runs, 60.0)).build();
        let path = std::env::temp_dir().join(format!("stint-job-{}-{}.ibt", name, std::process::id()));
        std::fs::write(&path, bytes)?;
        Ok(path)
    }

    #[tokio::test]
    async fn job_parses_and_reports_progress() -> Result<()> {
        let _ = tracing_subscriber::fmt::try_init();
        let path = write_recording("progress", &[(1, 120), (2, 125), (3, 118)])?;

        let options = ParseOptions { progress_interval: 50, ..Default::default() };
        let job = ParseJob::spawn(&path, ["Speed"], options);
        let updates = job.progress_updates();
        let session = job.wait().await?;

        assert_eq!(session.total_samples, 363);
        assert_eq!(session.completed_laps().count(), 2);

        let seen: Vec<ParseProgress> = updates.collect().await;
        let last = seen.last().copied().expect("final progress report");
        assert!(last.is_complete());
        assert_eq!(last.records_decoded, 363);

        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[tokio::test]
    async fn progress_can_be_polled_while_the_job_runs() -> Result<()> {
        let path = write_recording("polled", &[(1, 90), (2, 90)])?;

        let options = ParseOptions { progress_interval: 30, ..Default::default() };
        let job = ParseJob::spawn(&path, ["Speed"], options);
        let mut progress = Box::pin(job.progress_updates());
        let watcher = tokio::spawn(async move {
            let mut last = None;
            while let Some(update) = progress.next().await {
                last = Some(update);
            }
            last
        });

        let session = job.wait().await?;
        let last = watcher.await?.expect("at least one progress report");
        assert_eq!(last.records_decoded, session.total_samples);
        assert_eq!(last.percent(), 100.0);

        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[tokio::test]
    async fn cancelled_token_stops_the_job() -> Result<()> {
        let path = write_recording("cancel", &[(1, 200)])?;
        let token = CancellationToken::new();
        token.cancel();

        let job = ParseJob::spawn(&path, Vec::<String>::new(), ParseOptions::new().with_cancellation(token));
        let err = job.wait().await.unwrap_err();
        assert!(matches!(err, ParseError::Cancelled { records: 0 }));
        assert!(err.is_fatal());

        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_surfaces_as_file_error() {
        let job = ParseJob::spawn("/no/such/dir/recording.ibt", ["Speed"], ParseOptions::default());
        assert!(matches!(job.wait().await, Err(ParseError::File { .. })));
    }
}
