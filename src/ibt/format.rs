//! IBT file format structures and parsing
//!
//! ## IBT File Structure
//!
//! IBT (iRacing Binary Telemetry) files contain recorded telemetry data from iRacing sessions:
//!
//! 1. **Main Header** (112 bytes at offset 0) - `irsdk_header` compatible structure
//! 2. **Disk Sub-Header** (32 bytes at offset 112) - start date, session times, lap and record
//!    counts
//! 3. **Variable Headers** - `numVars` descriptors of 144 bytes at `varHeaderOffset`
//! 4. **Session Info** - YAML session configuration at `sessionInfoOffset`
//! 5. **Sample Data** - `recordCount` records of `bufLen` bytes starting at `varBuf[0].bufOffset`
//!
//! All integers are little-endian. Every count and offset is validated against the file length
//! before anything is read from it.

use tracing::{debug, trace, warn};

use super::reader::{ByteReader, extract_null_terminated_string};
use crate::source::ByteSource;
use crate::types::{VarDescriptor, VarTable, VariableType};
use crate::{ParseError, Result};

/// Size of `irsdk_header`
pub const IRSDK_HEADER_SIZE: usize = 112;
/// Offset of `irsdk_diskSubHeader`
pub const DISK_SUBHEADER_OFFSET: usize = IRSDK_HEADER_SIZE;
pub const DISK_SUBHEADER_SIZE: usize = 32;
/// Bytes that must be present before anything else can be read
pub const FILE_HEADER_SIZE: usize = IRSDK_HEADER_SIZE + DISK_SUBHEADER_SIZE;
pub const IRSDK_VAR_HEADER_SIZE: usize = 144;
pub const IRSDK_MAX_BUFS: usize = 4;
const VAR_BUF_OFFSET: usize = 48;
const VAR_BUF_SIZE: usize = 16;
const IRSDK_VAR_NAME_SIZE: usize = 32;
const IRSDK_VAR_DESC_SIZE: usize = 64;
const IRSDK_VAR_UNIT_SIZE: usize = 32;

/// Format versions this crate decodes.
pub const SUPPORTED_VERSIONS: std::ops::RangeInclusive<i32> = 1..=2;
/// Tick rate assumed when the header carries a non-positive one.
pub const FALLBACK_TICK_RATE: f64 = 60.0;
const MAX_VARS: i32 = 10_000;
const MAX_BUF_LEN: i32 = 100_000_000;

/// One `irsdk_varBuf` entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferEntry {
    pub tick_count: i32,
    pub buf_offset: i32,
}

/// IBT file header structure (matches iRacing's irsdk_header)
#[derive(Debug, Clone, PartialEq)]
pub struct IbtHeader {
    pub version: i32,
    pub status: i32,
    pub tick_rate: i32,
    pub session_info_update: i32,
    pub session_info_len: i32,
    pub session_info_offset: i32,
    pub num_vars: i32,
    pub var_header_offset: i32,
    pub num_buf: i32,
    pub buf_len: i32,
    pub var_bufs: [BufferEntry; IRSDK_MAX_BUFS],
}

/// IBT disk sub-header
/// struct irsdk_diskSubHeader {
///   time_t sessionStartDate;   // 8 bytes (i64)
///   double sessionStartTime;   // 8 bytes (f64)
///   double sessionEndTime;     // 8 bytes (f64)
///   int sessionLapCount;       // 4 bytes (i32)
///   int sessionRecordCount;    // 4 bytes (i32)
/// }
#[derive(Debug, Clone, PartialEq)]
pub struct DiskSubHeader {
    pub start_date: i64,   // time_t (unix timestamp)
    pub start_time: f64,   // session start time in seconds
    pub end_time: f64,     // session end time in seconds
    pub lap_count: i32,    // number of laps completed
    pub record_count: i32, // number of telemetry records
}

/// Where the sample records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRegion {
    /// Offset of the first record
    pub start: u64,
    /// Bytes per record (`bufLen`)
    pub stride: usize,
    /// Records the file claims to hold
    pub declared: usize,
    /// Complete records physically present after `start`
    pub available: usize,
}

impl SampleRegion {
    /// Offset of record `index`, `None` on overflow.
    pub fn record_offset(&self, index: usize) -> Option<u64> {
        (index as u64).checked_mul(self.stride as u64)?.checked_add(self.start)
    }

    /// Whether the file holds fewer complete records than it declares.
    pub fn is_short(&self) -> bool {
        self.available < self.declared
    }
}

/// Parsed and validated fixed headers.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    pub header: IbtHeader,
    pub disk: DiskSubHeader,
}

impl IbtHeader {
    pub fn read<S: ByteSource + ?Sized>(reader: &ByteReader<'_, S>) -> Result<Self> {
        trace!("Reading IBT header ({} bytes)", IRSDK_HEADER_SIZE);

        // struct irsdk_header {
        //   int ver;                    // offset 0
        //   int status;                 // offset 4
        //   int tickRate;               // offset 8
        //   int sessionInfoUpdate;      // offset 12
        //   int sessionInfoLen;         // offset 16
        //   int sessionInfoOffset;      // offset 20
        //   int numVars;                // offset 24
        //   int varHeaderOffset;        // offset 28
        //   int numBuf;                 // offset 32
        //   int bufLen;                 // offset 36
        //   int pad1[2];                // offset 40
        //   irsdk_varBuf varBuf[4];     // offset 48, 16 bytes each
        // }
        let mut var_bufs = [BufferEntry::default(); IRSDK_MAX_BUFS];
        for (i, entry) in var_bufs.iter_mut().enumerate() {
            let base = (VAR_BUF_OFFSET + i * VAR_BUF_SIZE) as u64;
            entry.tick_count = reader.read_i32(base)?;
            entry.buf_offset = reader.read_i32(base + 4)?;
        }

        Ok(Self {
            version: reader.read_i32(0)?,
            status: reader.read_i32(4)?,
            tick_rate: reader.read_i32(8)?,
            session_info_update: reader.read_i32(12)?,
            session_info_len: reader.read_i32(16)?,
            session_info_offset: reader.read_i32(20)?,
            num_vars: reader.read_i32(24)?,
            var_header_offset: reader.read_i32(28)?,
            num_buf: reader.read_i32(32)?,
            buf_len: reader.read_i32(36)?,
            var_bufs,
        })
    }

    /// First byte past the var-descriptor table.
    pub fn var_table_end(&self) -> u64 {
        self.var_header_offset as u64 + self.num_vars as u64 * IRSDK_VAR_HEADER_SIZE as u64
    }

    /// First byte past the session-info block.
    pub fn session_info_end(&self) -> u64 {
        self.session_info_offset as u64 + self.session_info_len as u64
    }
}

impl DiskSubHeader {
    pub fn read<S: ByteSource + ?Sized>(reader: &ByteReader<'_, S>) -> Result<Self> {
        let base = DISK_SUBHEADER_OFFSET as u64;
        Ok(Self {
            start_date: reader.read_i64(base)?,
            start_time: reader.read_f64(base + 8)?,
            end_time: reader.read_f64(base + 16)?,
            lap_count: reader.read_i32(base + 24)?,
            record_count: reader.read_i32(base + 28)?,
        })
    }
}

impl FileHeader {
    /// Read and validate both fixed headers.
    pub fn read<S: ByteSource + ?Sized>(reader: &ByteReader<'_, S>) -> Result<Self> {
        let file_len = reader.len();
        if file_len < FILE_HEADER_SIZE as u64 {
            return Err(ParseError::malformed_header(format!(
                "file is {} bytes, headers need {}",
                file_len, FILE_HEADER_SIZE
            )));
        }

        let header = IbtHeader::read(reader)?;
        let disk = DiskSubHeader::read(reader)?;
        let file_header = Self { header, disk };
        file_header.validate(file_len)?;

        debug!(
            "Parsed IBT header: version={}, tick_rate={}, num_vars={}, buf_len={}, records={}",
            file_header.header.version,
            file_header.header.tick_rate,
            file_header.header.num_vars,
            file_header.header.buf_len,
            file_header.disk.record_count
        );
        Ok(file_header)
    }

    /// Structural checks against the file length.
    pub fn validate(&self, file_len: u64) -> Result<()> {
        let h = &self.header;
        if !SUPPORTED_VERSIONS.contains(&h.version) {
            return Err(ParseError::UnsupportedVersion {
                found: h.version,
                min: *SUPPORTED_VERSIONS.start(),
                max: *SUPPORTED_VERSIONS.end(),
            });
        }

        for (field, value) in [
            ("numVars", h.num_vars),
            ("varHeaderOffset", h.var_header_offset),
            ("sessionInfoLen", h.session_info_len),
            ("sessionInfoOffset", h.session_info_offset),
            ("numBuf", h.num_buf),
            ("bufLen", h.buf_len),
            ("varBuf[0].bufOffset", h.var_bufs[0].buf_offset),
        ] {
            if value < 0 {
                return Err(ParseError::malformed_header(format!("{field} is negative ({value})")));
            }
        }

        if h.num_vars > MAX_VARS {
            return Err(ParseError::malformed_header(format!(
                "numVars {} is unreasonably large",
                h.num_vars
            )));
        }
        if h.buf_len > MAX_BUF_LEN {
            return Err(ParseError::malformed_header(format!(
                "bufLen {} is unreasonably large",
                h.buf_len
            )));
        }

        if h.num_vars > 0 && h.var_table_end() > file_len {
            return Err(ParseError::malformed_header(format!(
                "var table {}..{} extends past end of file ({} bytes)",
                h.var_header_offset,
                h.var_table_end(),
                file_len
            )));
        }
        if h.session_info_len > 0 && h.session_info_end() > file_len {
            return Err(ParseError::malformed_header(format!(
                "session info {}..{} extends past end of file ({} bytes)",
                h.session_info_offset,
                h.session_info_end(),
                file_len
            )));
        }
        if h.var_bufs[0].buf_offset as u64 > file_len {
            return Err(ParseError::malformed_header(format!(
                "sample buffer offset {} lies past end of file ({} bytes)",
                h.var_bufs[0].buf_offset, file_len
            )));
        }
        Ok(())
    }

    /// Effective tick rate in Hz; non-positive rates fall back to 60 Hz.
    pub fn tick_rate(&self) -> f64 {
        if self.header.tick_rate > 0 {
            self.header.tick_rate as f64
        } else {
            warn!(
                "Header tick rate {} is not positive, assuming {} Hz",
                self.header.tick_rate, FALLBACK_TICK_RATE
            );
            FALLBACK_TICK_RATE
        }
    }

    /// Locate the sample records.
    ///
    /// Records start at `varBuf[0].bufOffset`, or after whichever of the var table and the
    /// session-info block ends last when that offset is 0. The declared count comes from the
    /// disk sub-header and is derived from the bytes present when that is not positive.
    pub fn sample_region(&self, file_len: u64) -> SampleRegion {
        let h = &self.header;
        let start = if h.var_bufs[0].buf_offset > 0 {
            h.var_bufs[0].buf_offset as u64
        } else {
            let session_end = if h.session_info_len > 0 { h.session_info_end() } else { 0 };
            h.var_table_end().max(session_end).max(FILE_HEADER_SIZE as u64)
        };
        let stride = h.buf_len as usize;

        let available = match stride {
            0 => 0,
            _ => (file_len.saturating_sub(start) / stride as u64) as usize,
        };
        let declared = match (stride, self.disk.record_count) {
            (0, _) => 0,
            (_, count) if count > 0 => count as usize,
            _ => available,
        };

        if declared != available {
            warn!(
                "Record count mismatch: disk header reports {} records, file holds {} complete records",
                declared, available
            );
        }

        SampleRegion { start, stride, declared, available }
    }
}

/// Read the variable descriptor table.
///
/// Unknown type tags, empty names and non-positive counts are skipped with a warning. Duplicate
/// names keep the first declaration. A descriptor reaching past the record stride is a
/// [`ParseError::MalformedHeader`].
pub fn read_var_table<S: ByteSource + ?Sized>(
    reader: &ByteReader<'_, S>,
    header: &IbtHeader,
) -> Result<VarTable> {
    let stride = header.buf_len as usize;
    if header.buf_len == 0 || header.num_vars == 0 {
        debug!("No sample records declared (bufLen={}), skipping var table", header.buf_len);
        return Ok(VarTable::new(stride));
    }

    let num_vars = header.num_vars as usize;
    let bytes = reader.read_bytes(header.var_header_offset as u64, num_vars * IRSDK_VAR_HEADER_SIZE)?;
    let mut table = VarTable::new(stride);

    for (i, raw) in bytes.chunks_exact(IRSDK_VAR_HEADER_SIZE).enumerate() {
        let field = |offset: usize| i32::from_le_bytes([raw[offset], raw[offset + 1], raw[offset + 2], raw[offset + 3]]);
        let tag = field(0);
        let offset = field(4);
        let count = field(8);
        let count_as_time = raw[12] != 0;
        let name = extract_null_terminated_string(&raw[16..16 + IRSDK_VAR_NAME_SIZE]);
        let description = extract_null_terminated_string(&raw[48..48 + IRSDK_VAR_DESC_SIZE]);
        let unit = extract_null_terminated_string(&raw[112..112 + IRSDK_VAR_UNIT_SIZE]);

        if name.is_empty() {
            warn!("Skipping variable {} with empty name", i);
            continue;
        }
        let Some(var_type) = VariableType::from_tag(tag) else {
            warn!("Skipping variable '{}' with unknown type {}", name, tag);
            continue;
        };
        if offset < 0 || count <= 0 {
            warn!("Skipping variable '{}' with offset {} and count {}", name, offset, count);
            continue;
        }

        let descriptor = VarDescriptor {
            name,
            var_type,
            offset: offset as usize,
            count: count as usize,
            count_as_time,
            unit,
            description,
        };
        let name = descriptor.name.clone();
        if !table.insert(descriptor)? {
            warn!("Duplicate variable '{}' ignored, keeping first declaration", name);
        }
    }

    debug!("Extracted {} of {} variables with stride {}", table.len(), num_vars, stride);
    Ok(table)
}

/// Raw bytes of the session-info block; empty when the file has none.
pub fn read_session_block<S: ByteSource + ?Sized>(
    reader: &ByteReader<'_, S>,
    header: &IbtHeader,
) -> Result<Vec<u8>> {
    if header.session_info_len <= 0 {
        return Ok(Vec::new());
    }
    reader.read_bytes(header.session_info_offset as u64, header.session_info_len as usize)
}
