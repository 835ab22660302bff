//! Byte buffers for prediction side-channel data.
//!
//! All multi-byte scalars are little-endian. Unsigned counts use a 7-bit
//! continuation varint so short streams stay short.

use crate::error::{Error, Result};

/// Growable output buffer for prediction data.
#[derive(Debug, Default)]
pub struct EncoderBuffer {
    data: Vec<u8>,
}

impl EncoderBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn encode_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn encode_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn encode_i32(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn encode_varint(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value != 0 {
                self.data.push(byte | 0x80);
            } else {
                self.data.push(byte);
                return;
            }
        }
    }
}

/// Bounds-checked reader over an encoded byte slice.
#[derive(Debug)]
pub struct DecoderBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DecoderBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn decode_u8(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or(Error::BufferUnderflow(self.pos))?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn decode_u32(&mut self) -> Result<u32> {
        let bytes = self.decode_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn decode_i32(&mut self) -> Result<i32> {
        let bytes = self.decode_bytes(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn decode_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            if shift >= 64 {
                return Err(Error::VarintOverflow);
            }
            let byte = self.decode_u8()?;
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    pub fn decode_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(Error::BufferUnderflow(self.pos))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}
