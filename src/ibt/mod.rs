//! IBT container parsing (cross-platform)
//!
//! Positional typed reads ([`ByteReader`]), the fixed headers and var table ([`format`]) and
//! the parsed container ([`IbtFile`]).

pub mod file;
pub mod format;
pub mod reader;

pub use file::IbtFile;
pub use format::{FileHeader, SampleRegion};
pub use reader::ByteReader;
