//! Positional byte sources for IBT data.
//!
//! Every read names its own offset, so no cursor is shared between the header parser and the
//! sample decoder. A source is either an in-memory buffer (uploads that already live in RAM) or a
//! [`FileSource`] that reads straight from disk without loading the recording.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::{ParseError, Result};

/// Random-access, read-only view over the bytes of one recording.
pub trait ByteSource {
    /// Total number of bytes available.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill `buf` with the bytes starting at `offset`.
    ///
    /// Fails with [`ParseError::OutOfRange`] when `offset + buf.len()` exceeds [`len`](Self::len);
    /// `buf` is left untouched in that case.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;
}

/// Bounds check shared by every source implementation.
pub(crate) fn check_range(offset: u64, len: usize, available: u64) -> Result<()> {
    match offset.checked_add(len as u64) {
        Some(end) if end <= available => Ok(()),
        _ => Err(ParseError::out_of_range(offset, len, available)),
    }
}

impl ByteSource for [u8] {
    fn len(&self) -> u64 {
        <[u8]>::len(self) as u64
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        check_range(offset, buf.len(), ByteSource::len(self))?;
        let start = offset as usize;
        buf.copy_from_slice(&self[start..start + buf.len()]);
        Ok(())
    }
}

impl ByteSource for Vec<u8> {
    fn len(&self) -> u64 {
        self.as_slice().len() as u64
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.as_slice().read_at(offset, buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &S {
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        (**self).read_at(offset, buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        (**self).read_at(offset, buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Arc<S> {
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        (**self).read_at(offset, buf)
    }
}

/// IBT file on disk, read positionally.
///
/// The handle is owned by this value and closed when it is dropped, on every exit path of a
/// parse including cancellation.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    len: u64,
    path: PathBuf,
}

impl FileSource {
    /// Open a recording for positional reads.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| ParseError::file_error(path.clone(), e))?;
        let len = file.metadata().map_err(|e| ParseError::file_error(path.clone(), e))?.len();
        debug!("Opened {} ({} bytes)", path.display(), len);
        Ok(Self { file, len, path })
    }

    /// Path this source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(unix)]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
        use std::os::unix::fs::FileExt;
        self.file.read_exact_at(buf, offset)
    }

    #[cfg(windows)]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
        use std::os::windows::fs::FileExt;
        let mut filled = 0;
        while filled < buf.len() {
            match self.file.seek_read(&mut buf[filled..], offset + filled as u64) {
                Ok(0) => return Err(std::io::ErrorKind::UnexpectedEof.into()),
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    #[cfg(not(any(unix, windows)))]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
        use std::io::{Read, Seek, SeekFrom};
        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        check_range(offset, buf.len(), self.len)?;
        self.read_exact_at(offset, buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                // File shrank after it was opened.
                ParseError::out_of_range(offset, buf.len(), self.len)
            } else {
                ParseError::file_error(self.path.clone(), e)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;

    #[test]
    fn slice_reads_are_positional() -> Result<()> {
        let data: Vec<u8> = (0u8..16).collect();
        let mut buf = [0u8; 4];
        data.read_at(8, &mut buf)?;
        assert_eq!(buf, [8, 9, 10, 11]);
        data.read_at(0, &mut buf)?;
        assert_eq!(buf, [0, 1, 2, 3]);
        Ok(())
    }

    #[test]
    fn reads_past_end_are_out_of_range() {
        let data = vec![0u8; 10];
        let mut buf = [0u8; 4];
        match data.read_at(8, &mut buf) {
            Err(ParseError::OutOfRange { offset, len, available }) => {
                assert_eq!((offset, len, available), (8, 4, 10));
            }
            other => panic!("Expected OutOfRange, got {other:?}"),
        }
        assert!(data.read_at(u64::MAX, &mut buf).is_err());
    }

    #[test]
    fn shared_sources_delegate() -> Result<()> {
        let data: Arc<[u8]> = Arc::from(vec![1u8, 2, 3, 4].into_boxed_slice());
        let mut buf = [0u8; 2];
        data.read_at(2, &mut buf)?;
        assert_eq!(buf, [3, 4]);
        assert_eq!(ByteSource::len(&data), 4);
        Ok(())
    }

    #[test]
    fn file_source_reads_and_bounds_checks() -> Result<()> {
        let path = std::env::temp_dir().join(format!("stint-source-{}.bin", std::process::id()));
        {
            let mut file = File::create(&path)?;
            file.write_all(&[10, 20, 30, 40, 50])?;
        }

        let source = FileSource::open(&path)?;
        assert_eq!(source.len(), 5);
        let mut buf = [0u8; 3];
        source.read_at(2, &mut buf)?;
        assert_eq!(buf, [30, 40, 50]);
        assert!(matches!(source.read_at(3, &mut buf), Err(ParseError::OutOfRange { .. })));

        drop(source);
        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn missing_file_reports_path() {
        let err = FileSource::open("/definitely/not/here.ibt").unwrap_err();
        match err {
            ParseError::File { path, .. } => assert!(path.ends_with("here.ibt")),
            other => panic!("Expected File error, got {other:?}"),
        }
    }
}
