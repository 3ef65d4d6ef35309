//! X protocol wire reading utilities.
//!
//! Row values are encoded with protobuf primitives: base-128 varints
//! (zig-zag for signed integers) and fixed little-endian floats.

#![allow(clippy::cast_possible_truncation)]

/// Longest varint encoding of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

/// A reader over one column value.
#[derive(Debug)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Create a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Get remaining bytes in the buffer.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Check if we've reached the end of the data.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Current read offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Option<u8> {
        let byte = self.data.get(self.pos)?;
        self.pos += 1;
        Some(*byte)
    }

    /// Read a plain base-128 varint.
    ///
    /// Returns `None` when the buffer ends mid-value or the encoding runs
    /// past ten bytes.
    pub fn read_varint(&mut self) -> Option<u64> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let byte = *self.data.get(self.pos + i)?;
            value |= u64::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                self.pos += i + 1;
                return Some(value);
            }
        }
        None
    }

    /// Read a zig-zag encoded signed varint.
    pub fn read_zigzag(&mut self) -> Option<i64> {
        self.read_varint().map(zigzag_decode)
    }

    /// Read a plain varint through the signed 64-bit path.
    ///
    /// Unsigned columns are read this way; the value is reinterpreted, so
    /// the full `u64` range survives a later cast back to unsigned.
    pub fn read_varint_as_i64(&mut self) -> Option<i64> {
        self.read_varint().map(|v| v as i64)
    }

    /// Read a 4-byte little-endian float.
    pub fn read_f32_le(&mut self) -> Option<f32> {
        let bytes = self.read_bytes(4)?;
        Some(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read an 8-byte little-endian double.
    pub fn read_f64_le(&mut self) -> Option<f64> {
        let bytes = self.read_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Some(f64::from_le_bytes(buf))
    }

    /// Read a fixed number of bytes.
    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        if self.remaining() < len {
            return None;
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Some(bytes)
    }

    /// Read remaining bytes.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }
}

/// Map a zig-zag encoded value back to a signed integer.
pub const fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Map a signed integer to its zig-zag encoding.
pub const fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Append a plain base-128 varint to a buffer.
pub fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Append a zig-zag encoded signed varint to a buffer.
pub fn write_zigzag(buf: &mut Vec<u8>, value: i64) {
    write_varint(buf, zigzag_encode(value));
}
