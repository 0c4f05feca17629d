//! Typed little-endian reads at explicit offsets.
//!
//! [`ByteReader`] wraps any [`ByteSource`] and never keeps a cursor: header parsing and sample
//! decoding can share one reader without coordinating positions.
//!
//! ```rust
//! use stint::ibt::ByteReader;
//!
//! let data: Vec<u8> = vec![0x02, 0x00, 0x00, 0x00, 0x3c, 0x00, 0x00, 0x00];
//! let reader = ByteReader::new(&data);
//! assert_eq!(reader.read_i32(0).unwrap(), 2);
//! assert_eq!(reader.read_i32(4).unwrap(), 60);
//! assert!(reader.read_i32(6).is_err());
//! ```

use crate::Result;
use crate::source::ByteSource;

/// Positional reader over a byte source.
#[derive(Debug)]
pub struct ByteReader<'s, S: ?Sized> {
    source: &'s S,
}

impl<S: ?Sized> Clone for ByteReader<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for ByteReader<'_, S> {}

impl<'s, S: ByteSource + ?Sized> ByteReader<'s, S> {
    pub fn new(source: &'s S) -> Self {
        Self { source }
    }

    /// Underlying source.
    pub fn source(&self) -> &'s S {
        self.source
    }

    /// Total bytes available.
    pub fn len(&self) -> u64 {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    fn read_array<const N: usize>(&self, offset: u64) -> Result<[u8; N]> {
        let mut bytes = [0u8; N];
        self.source.read_at(offset, &mut bytes)?;
        Ok(bytes)
    }

    /// Read `len` raw bytes.
    pub fn read_bytes(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; len];
        self.source.read_at(offset, &mut bytes)?;
        Ok(bytes)
    }

    /// Fill a caller-owned buffer, used for the per-record reads of the sample decoder.
    pub fn read_into(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.source.read_at(offset, buf)
    }

    pub fn read_u8(&self, offset: u64) -> Result<u8> {
        Ok(self.read_array::<1>(offset)?[0])
    }

    pub fn read_i8(&self, offset: u64) -> Result<i8> {
        Ok(self.read_array::<1>(offset)?[0] as i8)
    }

    pub fn read_i16(&self, offset: u64) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_i32(&self, offset: u64) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_i64(&self, offset: u64) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_f32(&self, offset: u64) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array(offset)?))
    }

    pub fn read_f64(&self, offset: u64) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array(offset)?))
    }

    /// Any non-zero byte is true.
    pub fn read_bool(&self, offset: u64) -> Result<bool> {
        Ok(self.read_u8(offset)? != 0)
    }

    /// Read a fixed-width, null-terminated string field.
    pub fn read_string(&self, offset: u64, width: usize) -> Result<String> {
        let bytes = self.read_bytes(offset, width)?;
        Ok(extract_null_terminated_string(&bytes))
    }

    /// Read a single bit of the little-endian 32-bit word at `offset`.
    pub fn read_bit(&self, offset: u64, bit: u32) -> Result<bool> {
        let word = u32::from_le_bytes(self.read_array(offset)?);
        Ok(bit < 32 && word & (1 << bit) != 0)
    }
}

/// Decode a null-terminated string from a fixed-width field.
pub fn extract_null_terminated_string(bytes: &[u8]) -> String {
    let null_pos = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..null_pos]).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseError;
    use proptest::prelude::*;

    #[test]
    fn reads_every_width_little_endian() -> anyhow::Result<()> {
        let mut data = Vec::new();
        data.push(0xFFu8);
        data.extend_from_slice(&(-2i16).to_le_bytes());
        data.extend_from_slice(&123_456i32.to_le_bytes());
        data.extend_from_slice(&(-9_876_543_210i64).to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&(-0.25f64).to_le_bytes());

        let reader = ByteReader::new(&data);
        assert_eq!(reader.read_u8(0)?, 255);
        assert_eq!(reader.read_i8(0)?, -1);
        assert_eq!(reader.read_i16(1)?, -2);
        assert_eq!(reader.read_i32(3)?, 123_456);
        assert_eq!(reader.read_i64(7)?, -9_876_543_210);
        assert_eq!(reader.read_f32(15)?, 1.5);
        assert_eq!(reader.read_f64(19)?, -0.25);
        assert!(reader.read_bool(0)?);
        Ok(())
    }

    #[test]
    fn strings_stop_at_first_null() -> anyhow::Result<()> {
        let mut field = [0u8; 32];
        field[..5].copy_from_slice(b"Speed");
        field[6] = b'x';
        let data = field.to_vec();
        let reader = ByteReader::new(&data);
        assert_eq!(reader.read_string(0, 32)?, "Speed");
        assert_eq!(extract_null_terminated_string(b"NoTerminator"), "NoTerminator");
        Ok(())
    }

    #[test]
    fn bits_are_read_from_words() -> anyhow::Result<()> {
        let data = 0b1010u32.to_le_bytes().to_vec();
        let reader = ByteReader::new(&data);
        assert!(!reader.read_bit(0, 0)?);
        assert!(reader.read_bit(0, 1)?);
        assert!(reader.read_bit(0, 3)?);
        assert!(!reader.read_bit(0, 40)?);
        Ok(())
    }

    proptest! {
        #[test]
        fn reads_never_exceed_source(len in 0usize..64, offset in 0u64..80, width in 1usize..9) {
            let data = vec![0u8; len];
            let reader = ByteReader::new(&data);
            let result = reader.read_bytes(offset, width);
            if offset as usize + width <= len {
                prop_assert!(result.is_ok());
            } else {
                let is_out_of_range = matches!(result, Err(ParseError::OutOfRange { .. }));
                prop_assert!(is_out_of_range);
            }
        }
    }
}
