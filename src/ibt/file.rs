//! Parsed IBT container: headers, var table and session metadata over a byte source.

use std::path::Path;

use tracing::debug;

use super::format::{FileHeader, SampleRegion, read_session_block, read_var_table};
use super::reader::ByteReader;
use crate::schema::{SessionDocument, SessionInfo};
use crate::source::{ByteSource, FileSource};
use crate::types::VarTable;
use crate::Result;

/// An IBT recording whose metadata has been parsed and validated.
///
/// Sample records are not touched here; hand the file to a
/// [`SampleDecoder`](crate::stream::SampleDecoder) to iterate them.
#[derive(Debug)]
pub struct IbtFile<S> {
    source: S,
    header: FileHeader,
    vars: VarTable,
    document: SessionDocument,
    info: SessionInfo,
    region: SampleRegion,
}

impl<S: ByteSource> IbtFile<S> {
    /// Parse headers, var table and session-info block.
    ///
    /// Structural problems fail with [`ParseError::MalformedHeader`](crate::ParseError) or
    /// [`ParseError::UnsupportedVersion`](crate::ParseError); a session-info block that does not
    /// parse only costs the metadata.
    pub fn open(source: S) -> Result<Self> {
        let reader = ByteReader::new(&source);
        let header = FileHeader::read(&reader)?;
        let vars = read_var_table(&reader, &header.header)?;
        let block = read_session_block(&reader, &header.header)?;
        let document = SessionDocument::from_block_lossy(&block);
        let info = SessionInfo::from_document(&document);
        let region = header.sample_region(reader.len());

        debug!(
            "IBT file: {} variables, {} declared records of {} bytes at {:#x}",
            vars.len(),
            region.declared,
            region.stride,
            region.start
        );

        Ok(Self { source, header, vars, document, info, region })
    }

    pub fn reader(&self) -> ByteReader<'_, S> {
        ByteReader::new(&self.source)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Give the source back, releasing the parsed metadata.
    pub fn into_source(self) -> S {
        self.source
    }
}

impl IbtFile<FileSource> {
    /// Open a recording on disk. The handle is closed when the returned value is dropped.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(FileSource::open(path)?)
    }
}

impl<S> IbtFile<S> {
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn vars(&self) -> &VarTable {
        &self.vars
    }

    /// Full session-info document.
    pub fn session_document(&self) -> &SessionDocument {
        &self.document
    }

    pub fn session_info(&self) -> &SessionInfo {
        &self.info
    }

    pub fn sample_region(&self) -> SampleRegion {
        self.region
    }

    /// Tick rate from the header, 60 Hz when the header's is not positive.
    pub fn tick_rate(&self) -> f64 {
        self.header.tick_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{IbtBuilder, SyntheticSample};
    use crate::ParseError;
    use anyhow::{Context, Result};

    #[test]
    fn opens_in_memory_recording() -> Result<()> {
        let samples = SyntheticSample::lap_sequence(&[(1, 30)], 60.0);
        let bytes = IbtBuilder::new().samples(samples).build();
        let file = IbtFile::open(&bytes).context("opening synthetic file")?;

        assert_eq!(file.sample_region().declared, 30);
        assert_eq!(file.tick_rate(), 60.0);
        assert!(file.vars().contains("LapDistPct"));
        assert_eq!(file.session_info().track_name.as_deref(), Some("synthetic raceway"));
        assert!(file.session_document().driver_info.is_some());
        Ok(())
    }

    #[test]
    fn broken_session_yaml_only_costs_metadata() -> Result<()> {
        let bytes = IbtBuilder::new()
            .samples(SyntheticSample::lap_sequence(&[(1, 3)], 60.0))
            .session_yaml("WeekendInfo: [oops\n")
            .build();
        let file = IbtFile::open(&bytes)?;
        assert_eq!(file.session_info(), &SessionInfo::default());
        assert_eq!(file.sample_region().declared, 3);
        Ok(())
    }

    #[test]
    fn opens_from_disk_and_releases_handle() -> Result<()> {
        let bytes = IbtBuilder::new().samples(SyntheticSample::lap_sequence(&[(1, 4)], 60.0)).build();
        let path = std::env::temp_dir().join(format!("stint-file-{}.ibt", std::process::id()));
        std::fs::write(&path, &bytes)?;

        let file = IbtFile::open_path(&path)?;
        assert_eq!(file.source().path(), path.as_path());
        assert_eq!(file.sample_region().declared, 4);
        drop(file);

        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn missing_path_is_file_error() {
        let err = IbtFile::open_path("/no/such/recording.ibt").unwrap_err();
        assert!(matches!(err, ParseError::File { .. }));
    }
}
