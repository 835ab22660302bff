//! Raw boolean bit streams.
//!
//! Bits are packed MSB-first into 32-bit words; the payload is stored as a
//! varint word count followed by the words in little-endian byte order.

use crate::buffer::{DecoderBuffer, EncoderBuffer};
use crate::error::{Error, Result};

/// Packs individual bits for one encoded stream.
#[derive(Debug, Default)]
pub struct BitEncoder {
    bits: Vec<u32>,
    local_bits: u32,
    num_local_bits: u32,
}

impl BitEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_encoding(&mut self) {
        self.bits.clear();
        self.local_bits = 0;
        self.num_local_bits = 0;
    }

    pub fn encode_bit(&mut self, bit: bool) {
        if bit {
            self.local_bits |= 1 << (31 - self.num_local_bits);
        }
        self.num_local_bits += 1;
        if self.num_local_bits == 32 {
            self.bits.push(self.local_bits);
            self.local_bits = 0;
            self.num_local_bits = 0;
        }
    }

    /// Flushes the stream into |buffer| and resets the encoder.
    pub fn end_encoding(&mut self, buffer: &mut EncoderBuffer) {
        if self.num_local_bits > 0 {
            self.bits.push(self.local_bits);
        }
        buffer.encode_varint(self.bits.len() as u64);
        for &word in &self.bits {
            buffer.encode_u32(word);
        }
        self.start_encoding();
    }
}

/// Reads back a stream produced by [`BitEncoder`].
#[derive(Debug, Default)]
pub struct BitDecoder {
    bits: Vec<u32>,
    pos: usize,
}

impl BitDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_decoding(&mut self, buffer: &mut DecoderBuffer<'_>) -> Result<()> {
        let num_words = buffer.decode_varint()?;
        if num_words > (buffer.remaining() / 4) as u64 {
            return Err(Error::BitStreamExhausted);
        }
        self.bits.clear();
        self.bits.reserve(num_words as usize);
        for _ in 0..num_words {
            self.bits.push(buffer.decode_u32()?);
        }
        self.pos = 0;
        Ok(())
    }

    pub fn decode_next_bit(&mut self) -> Result<bool> {
        let word = self
            .bits
            .get(self.pos / 32)
            .ok_or(Error::BitStreamExhausted)?;
        let bit = (word >> (31 - (self.pos % 32) as u32)) & 1 != 0;
        self.pos += 1;
        Ok(bit)
    }
}
