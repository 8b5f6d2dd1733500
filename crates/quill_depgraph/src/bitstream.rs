//! Bit-level writer and reader for the graph file container.
//!
//! Bits are packed least-significant first within each byte, so a 32-bit
//! field written at a word boundary reads back as a little-endian `u32`.
//! Variable-width (VBR) fields split a value into chunks of `width - 1` bits
//! with the top bit of each chunk flagging a continuation.

use crate::error::GraphFormatError;

/// Width of the length prefix on a blob.
const BLOB_LEN_WIDTH: u32 = 6;

/// Appends bit fields to an in-memory buffer.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    fn push_bit(&mut self, bit: bool) {
        let byte = self.bit_len / 8;
        if byte == self.bytes.len() {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[byte] |= 1 << (self.bit_len % 8);
        }
        self.bit_len += 1;
    }

    /// Writes the low `width` bits of `value`.
    pub fn fixed(&mut self, value: u64, width: u32) {
        debug_assert!(width <= 64);
        for i in 0..width {
            self.push_bit((value >> i) & 1 == 1);
        }
    }

    /// Writes `value` as a VBR field with `width`-bit chunks.
    pub fn vbr(&mut self, mut value: u64, width: u32) {
        debug_assert!((2..=32).contains(&width));
        let payload = width - 1;
        let continue_flag = 1u64 << payload;
        let mask = continue_flag - 1;
        loop {
            let chunk = value & mask;
            value >>= payload;
            if value == 0 {
                self.fixed(chunk, width);
                return;
            }
            self.fixed(chunk | continue_flag, width);
        }
    }

    /// Pads with zero bits up to the next 32-bit boundary.
    pub fn align32(&mut self) {
        while self.bit_len % 32 != 0 {
            self.push_bit(false);
        }
    }

    /// Writes a length-prefixed, word-aligned byte blob.
    pub fn blob(&mut self, data: &[u8]) {
        self.vbr(data.len() as u64, BLOB_LEN_WIDTH);
        self.align32();
        for &byte in data {
            self.fixed(u64::from(byte), 8);
        }
        self.align32();
    }

    /// Overwrites the aligned 32-bit word starting at bit `at`.
    pub fn patch_word(&mut self, at: usize, value: u32) {
        debug_assert!(at % 32 == 0 && at + 32 <= self.bit_len);
        let start = at / 8;
        self.bytes[start..start + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Returns the written bytes; a trailing partial byte is zero-padded.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Reads bit fields back from a byte slice.
#[derive(Debug)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Starts reading at the first bit of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Current bit offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bits left to read.
    pub fn remaining_bits(&self) -> usize {
        self.bytes.len() * 8 - self.pos
    }

    fn eof(&self) -> GraphFormatError {
        GraphFormatError::UnexpectedEof { bit: self.pos }
    }

    /// Reads a `width`-bit field.
    pub fn fixed(&mut self, width: u32) -> Result<u64, GraphFormatError> {
        debug_assert!(width <= 64);
        if self.remaining_bits() < width as usize {
            return Err(self.eof());
        }
        let mut value = 0u64;
        for i in 0..width {
            let byte = self.bytes[self.pos / 8];
            if (byte >> (self.pos % 8)) & 1 == 1 {
                value |= 1 << i;
            }
            self.pos += 1;
        }
        Ok(value)
    }

    /// Reads a VBR field with `width`-bit chunks.
    pub fn vbr(&mut self, width: u32) -> Result<u64, GraphFormatError> {
        let start = self.pos;
        let payload = width - 1;
        let continue_flag = 1u64 << payload;
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let chunk = self.fixed(width)?;
            let bits = chunk & (continue_flag - 1);
            if shift >= 64 || (shift > 0 && bits >> (64 - shift) != 0) {
                return Err(GraphFormatError::VbrOverflow { bit: start });
            }
            value |= bits << shift;
            if chunk & continue_flag == 0 {
                return Ok(value);
            }
            shift += payload;
        }
    }

    /// Skips to the next 32-bit boundary.
    pub fn align32(&mut self) -> Result<(), GraphFormatError> {
        let aligned = self.pos.div_ceil(32) * 32;
        if aligned > self.bytes.len() * 8 {
            return Err(self.eof());
        }
        self.pos = aligned;
        Ok(())
    }

    /// Reads a blob written by [`BitWriter::blob`].
    pub fn blob(&mut self) -> Result<&'a [u8], GraphFormatError> {
        let len = self.vbr(BLOB_LEN_WIDTH)?;
        self.align32()?;
        let start = self.pos / 8;
        let len = usize::try_from(len).map_err(|_| self.eof())?;
        if self.bytes.len() - start < len {
            return Err(self.eof());
        }
        let data = &self.bytes[start..start + len];
        self.pos += len * 8;
        self.align32()?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_pack_lsb_first() {
        let mut w = BitWriter::new();
        w.fixed(0b1, 1);
        w.fixed(0b10, 2);
        w.fixed(0b1, 1);
        assert_eq!(w.into_bytes(), vec![0b1101]);
    }

    #[test]
    fn vbr_splits_into_chunks() {
        let mut w = BitWriter::new();
        // 6-bit chunks carry 5 payload bits: 40 = 0b01000 | continue, then 0b1.
        w.vbr(40, 6);
        assert_eq!(w.bit_len(), 12);
        let bytes = w.into_bytes();
        let mut r = BitReader::new(&bytes);
        assert_eq!(r.fixed(6).unwrap(), 0b101000);
        assert_eq!(r.fixed(6).unwrap(), 0b000001);
    }

    #[test]
    fn mixed_fields_read_back() {
        let mut w = BitWriter::new();
        w.fixed(5, 3);
        w.vbr(70_000, 13);
        w.fixed(1, 1);
        w.blob(b"hello");
        w.fixed(0xBEEF, 16);
        let bytes = w.into_bytes();

        let mut r = BitReader::new(&bytes);
        assert_eq!(r.fixed(3).unwrap(), 5);
        assert_eq!(r.vbr(13).unwrap(), 70_000);
        assert_eq!(r.fixed(1).unwrap(), 1);
        assert_eq!(r.blob().unwrap(), b"hello");
        assert_eq!(r.position() % 32, 0);
        assert_eq!(r.fixed(16).unwrap(), 0xBEEF);
    }

    #[test]
    fn patched_word_is_little_endian() {
        let mut w = BitWriter::new();
        w.fixed(0, 32);
        w.fixed(7, 8);
        w.patch_word(0, 0x0102_0304);
        let bytes = w.into_bytes();
        assert_eq!(&bytes[..4], &[4, 3, 2, 1]);
        let mut r = BitReader::new(&bytes);
        assert_eq!(r.fixed(32).unwrap(), 0x0102_0304);
        assert_eq!(r.fixed(8).unwrap(), 7);
    }

    #[test]
    fn reading_past_end_fails() {
        let mut r = BitReader::new(&[0xff]);
        assert!(r.fixed(8).is_ok());
        assert!(matches!(r.fixed(1), Err(GraphFormatError::UnexpectedEof { bit: 8 })));
    }

    #[test]
    fn truncated_blob_fails() {
        let mut w = BitWriter::new();
        w.blob(b"truncate me");
        let mut bytes = w.into_bytes();
        bytes.truncate(6);
        let mut r = BitReader::new(&bytes);
        assert!(r.blob().is_err());
    }

    #[test]
    fn overlong_vbr_is_rejected() {
        let mut w = BitWriter::new();
        for _ in 0..20 {
            w.fixed(0b11_1111, 6);
        }
        w.fixed(0, 6);
        let bytes = w.into_bytes();
        let mut r = BitReader::new(&bytes);
        assert!(matches!(r.vbr(6), Err(GraphFormatError::VbrOverflow { bit: 0 })));
    }
}
