//! Byte cursor utilities for the Fumen record layout.
//!
//! `ByteReader` is a position-tracking little-endian reader whose failures
//! carry the absolute offset of the read that failed. `ByteWriter` is its
//! append-only counterpart.

use crate::error::ParseError;

type ReadResult<T> = std::result::Result<T, ParseError>;

/// A position-tracking reader over a Fumen buffer.
///
/// # Example
///
/// ```
/// use chartkit::fumen::ByteReader;
///
/// let data = [0x78, 0x56, 0x34, 0x12, 0x00, 0x00, 0x80, 0x3F];
/// let mut buf = ByteReader::new(&data);
///
/// assert_eq!(buf.read_u32().unwrap(), 0x12345678);
/// assert_eq!(buf.read_f32().unwrap(), 1.0);
/// assert_eq!(buf.position(), 8);
/// ```
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of bytes remaining from the current position.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Skips `count` bytes, failing like a read when they are not there.
    pub fn skip(&mut self, count: usize) -> ReadResult<()> {
        self.read_bytes(count).map(|_| ())
    }

    pub fn read_u8(&mut self) -> ReadResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> ReadResult<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> ReadResult<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> ReadResult<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> ReadResult<f32> {
        self.read_array().map(f32::from_le_bytes)
    }

    /// Reads the specified number of bytes and advances the position.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] at the current position if fewer than
    /// `count` bytes remain. The position is left unchanged.
    pub fn read_bytes(&mut self, count: usize) -> ReadResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(count)
            .ok_or_else(|| ParseError::new(self.pos, "Position overflow"))?;

        if end > self.data.len() {
            return Err(ParseError::new(
                self.pos,
                format!(
                    "Unexpected end of data (need {} bytes, {} remaining)",
                    count,
                    self.remaining()
                ),
            ));
        }

        let result = &self.data[self.pos..end];
        self.pos = end;
        Ok(result)
    }

    fn read_array<const N: usize>(&mut self) -> ReadResult<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}

/// Append-only little-endian writer.
#[derive(Debug, Default)]
pub struct ByteWriter {
    data: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn position(&self) -> usize {
        self.data.len()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes `count` zero bytes.
    pub fn pad(&mut self, count: usize) {
        self.data.resize(self.data.len() + count, 0);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}
