//! Postcard-style binary encoding format.
//!
//! This module provides [`PostcardEncoder`] and [`PostcardDecoder`], which
//! implement [`Encoder`] and [`Decoder`] with a layout similar to the
//! [`postcard`](https://docs.rs/postcard) crate.
//!
//! # Format Overview
//!
//! - **Variable-length integers**: unsigned integers use LEB128, signed
//!   integers are zigzag mapped first so small magnitudes stay small.
//! - **Single bytes**: `u8`, `i8` and `bool` take exactly one byte.
//! - **Floating-point**: `f32` and `f64` use little-endian IEEE 754.
//! - **Strings/bytes**: varint length followed by the raw bytes.

use std::io::{self, Write};

use crate::{Decoder, Encoder};

// =============================================================================
// Varint helpers
// =============================================================================

/// Generates a LEB128 encoder for one unsigned width. The buffer is sized to
/// `ceil(bits / 7)`.
macro_rules! varint_encoder {
    ($name:ident, $ty:ty, $len:literal) => {
        #[inline]
        #[allow(clippy::cast_possible_truncation)]
        const fn $name(mut value: $ty) -> ([u8; $len], usize) {
            let mut buf = [0u8; $len];
            let mut i = 0;
            while value >= 0x80 {
                buf[i] = (value as u8) | 0x80;
                value >>= 7;
                i += 1;
            }
            buf[i] = value as u8;
            (buf, i + 1)
        }
    };
}

varint_encoder!(varint_u16, u16, 3);
varint_encoder!(varint_u32, u32, 5);
varint_encoder!(varint_u64, u64, 10);
varint_encoder!(varint_u128, u128, 19);

/// Generates the zigzag mapping pair for one signed width.
macro_rules! zigzag {
    ($encode:ident, $decode:ident, $signed:ty, $unsigned:ty) => {
        #[inline]
        #[allow(clippy::cast_sign_loss)]
        const fn $encode(value: $signed) -> $unsigned {
            ((value << 1) ^ (value >> (<$signed>::BITS - 1))) as $unsigned
        }

        #[inline]
        #[allow(clippy::cast_possible_wrap)]
        const fn $decode(value: $unsigned) -> $signed {
            ((value >> 1) as $signed) ^ (-((value & 1) as $signed))
        }
    };
}

zigzag!(zigzag_encode_i16, zigzag_decode_i16, i16, u16);
zigzag!(zigzag_encode_i32, zigzag_decode_i32, i32, u32);
zigzag!(zigzag_encode_i64, zigzag_decode_i64, i64, u64);
zigzag!(zigzag_encode_i128, zigzag_decode_i128, i128, u128);

// =============================================================================
// PostcardEncoder
// =============================================================================

/// A postcard-style encoder that writes to any [`Write`] implementation.
///
/// The encoder keeps track of how many bytes it has written so that
/// [`Encoder::position`] is exact regardless of the underlying writer.
///
/// ```ignore
/// use planwire_serialize::PostcardEncoder;
///
/// let encoder = PostcardEncoder::new(Vec::with_capacity(4096));
/// ```
#[derive(Debug)]
pub struct PostcardEncoder<W> {
    writer: W,
    written: usize,
}

impl<W> PostcardEncoder<W> {
    /// Creates a new encoder wrapping the given writer.
    #[must_use]
    pub const fn new(writer: W) -> Self { Self { writer, written: 0 } }

    /// Returns a reference to the underlying writer.
    #[must_use]
    pub const fn get_ref(&self) -> &W { &self.writer }

    /// Consumes the encoder and returns the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W { self.writer }
}

impl<W: Write> PostcardEncoder<W> {
    fn put(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.written += bytes.len();
        Ok(())
    }
}

impl<W: Write> Encoder for PostcardEncoder<W> {
    fn position(&self) -> usize { self.written }

    fn emit_u8(&mut self, v: u8) -> io::Result<()> { self.put(&[v]) }

    fn emit_u16(&mut self, v: u16) -> io::Result<()> {
        let (buf, len) = varint_u16(v);
        self.put(&buf[..len])
    }

    fn emit_u32(&mut self, v: u32) -> io::Result<()> {
        let (buf, len) = varint_u32(v);
        self.put(&buf[..len])
    }

    fn emit_u64(&mut self, v: u64) -> io::Result<()> {
        let (buf, len) = varint_u64(v);
        self.put(&buf[..len])
    }

    fn emit_u128(&mut self, v: u128) -> io::Result<()> {
        let (buf, len) = varint_u128(v);
        self.put(&buf[..len])
    }

    fn emit_i8(&mut self, v: i8) -> io::Result<()> {
        self.put(&v.to_le_bytes())
    }

    fn emit_i16(&mut self, v: i16) -> io::Result<()> {
        self.emit_u16(zigzag_encode_i16(v))
    }

    fn emit_i32(&mut self, v: i32) -> io::Result<()> {
        self.emit_u32(zigzag_encode_i32(v))
    }

    fn emit_i64(&mut self, v: i64) -> io::Result<()> {
        self.emit_u64(zigzag_encode_i64(v))
    }

    fn emit_i128(&mut self, v: i128) -> io::Result<()> {
        self.emit_u128(zigzag_encode_i128(v))
    }

    fn emit_raw_bytes(&mut self, s: &[u8]) -> io::Result<()> { self.put(s) }

    // floats are fixed width, varints would only grow them
    fn emit_f32(&mut self, v: f32) -> io::Result<()> {
        self.put(&v.to_le_bytes())
    }

    fn emit_f64(&mut self, v: f64) -> io::Result<()> {
        self.put(&v.to_le_bytes())
    }
}

// =============================================================================
// PostcardDecoder
// =============================================================================

/// A postcard-style decoder over an in-memory byte slice.
///
/// Reading from a slice keeps [`Decoder::remaining`] exact, which lets the
/// decoder reject oversized length prefixes before allocating.
#[derive(Debug, Clone, Copy)]
pub struct PostcardDecoder<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> PostcardDecoder<'a> {
    /// Creates a new decoder reading from the start of `bytes`.
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self { Self { bytes, offset: 0 } }

    fn eof(wanted: usize, remaining: usize) -> io::Error {
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("needed {wanted} more bytes but only {remaining} remain"),
        )
    }

    fn take(&mut self, len: usize) -> io::Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(Self::eof(len, remaining));
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }
}

/// Generates a LEB128 reader for one unsigned width.
macro_rules! varint_decoder {
    ($name:ident, $ty:ty) => {
        fn $name(&mut self) -> io::Result<$ty> {
            let mut result: $ty = 0;
            let mut shift = 0;

            loop {
                let byte = self.read_u8()?;

                if shift >= <$ty>::BITS {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        concat!("varint too long for ", stringify!($ty)),
                    ));
                }

                let payload = byte & 0x7F;

                // the last group may only carry the bits that still fit
                if shift + 7 > <$ty>::BITS
                    && payload >> (<$ty>::BITS - shift) != 0
                {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        concat!("varint overflows ", stringify!($ty)),
                    ));
                }

                result |= <$ty>::from(payload) << shift;

                if byte & 0x80 == 0 {
                    return Ok(result);
                }

                shift += 7;
            }
        }
    };
}

impl PostcardDecoder<'_> {
    varint_decoder!(read_varint_u16, u16);
    varint_decoder!(read_varint_u32, u32);
    varint_decoder!(read_varint_u64, u64);
    varint_decoder!(read_varint_u128, u128);
}

impl Decoder for PostcardDecoder<'_> {
    fn position(&self) -> usize { self.offset }

    fn remaining(&self) -> usize { self.bytes.len() - self.offset }

    fn read_u8(&mut self) -> io::Result<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    fn read_u16(&mut self) -> io::Result<u16> { self.read_varint_u16() }

    fn read_u32(&mut self) -> io::Result<u32> { self.read_varint_u32() }

    fn read_u64(&mut self) -> io::Result<u64> { self.read_varint_u64() }

    fn read_u128(&mut self) -> io::Result<u128> { self.read_varint_u128() }

    fn read_i8(&mut self) -> io::Result<i8> {
        Ok(i8::from_le_bytes(self.take_array()?))
    }

    fn read_i16(&mut self) -> io::Result<i16> {
        Ok(zigzag_decode_i16(self.read_varint_u16()?))
    }

    fn read_i32(&mut self) -> io::Result<i32> {
        Ok(zigzag_decode_i32(self.read_varint_u32()?))
    }

    fn read_i64(&mut self) -> io::Result<i64> {
        Ok(zigzag_decode_i64(self.read_varint_u64()?))
    }

    fn read_i128(&mut self) -> io::Result<i128> {
        Ok(zigzag_decode_i128(self.read_varint_u128()?))
    }

    fn read_raw_bytes(&mut self, len: usize) -> io::Result<Vec<u8>> {
        Ok(self.take(len)?.to_vec())
    }

    fn read_f32(&mut self) -> io::Result<f32> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    fn read_f64(&mut self) -> io::Result<f64> {
        Ok(f64::from_le_bytes(self.take_array()?))
    }
}
