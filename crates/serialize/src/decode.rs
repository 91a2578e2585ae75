//! The [`Decoder`] trait for reading primitive values.

use std::io;

/// A source of primitive values in a binary format.
///
/// This is the mirror of [`crate::Encoder`]: each `read_*` method consumes
/// exactly what the matching `emit_*` method produced.
///
/// Decoders are handed untrusted input. Implementations report truncation as
/// [`io::ErrorKind::UnexpectedEof`] and malformed values as
/// [`io::ErrorKind::InvalidData`], and never allocate based on a length
/// prefix that exceeds [`Decoder::remaining`].
pub trait Decoder {
    // =========================================================================
    // Required methods
    // =========================================================================

    /// Returns the number of bytes consumed so far.
    fn position(&self) -> usize;

    /// Returns the number of bytes left in the input.
    fn remaining(&self) -> usize;

    /// Reads a single unsigned byte.
    fn read_u8(&mut self) -> io::Result<u8>;

    /// Reads a 16-bit unsigned integer.
    fn read_u16(&mut self) -> io::Result<u16>;

    /// Reads a 32-bit unsigned integer.
    fn read_u32(&mut self) -> io::Result<u32>;

    /// Reads a 64-bit unsigned integer.
    fn read_u64(&mut self) -> io::Result<u64>;

    /// Reads a 128-bit unsigned integer.
    fn read_u128(&mut self) -> io::Result<u128>;

    /// Reads a single signed byte.
    fn read_i8(&mut self) -> io::Result<i8>;

    /// Reads a 16-bit signed integer.
    fn read_i16(&mut self) -> io::Result<i16>;

    /// Reads a 32-bit signed integer.
    fn read_i32(&mut self) -> io::Result<i32>;

    /// Reads a 64-bit signed integer.
    fn read_i64(&mut self) -> io::Result<i64>;

    /// Reads a 128-bit signed integer.
    fn read_i128(&mut self) -> io::Result<i128>;

    /// Reads exactly `len` raw bytes.
    fn read_raw_bytes(&mut self, len: usize) -> io::Result<Vec<u8>>;

    // =========================================================================
    // Default implementations
    // =========================================================================

    /// Reads a platform-sized unsigned integer stored as 64 bits.
    fn read_usize(&mut self) -> io::Result<usize> {
        let value = self.read_u64()?;
        usize::try_from(value).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "usize value out of range for this platform",
            )
        })
    }

    /// Reads a platform-sized signed integer stored as 64 bits.
    fn read_isize(&mut self) -> io::Result<isize> {
        let value = self.read_i64()?;
        isize::try_from(value).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "isize value out of range for this platform",
            )
        })
    }

    /// Reads a boolean. Only `0` and `1` are accepted.
    fn read_bool(&mut self) -> io::Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid boolean byte: {other}"),
            )),
        }
    }

    /// Reads a Unicode character.
    fn read_char(&mut self) -> io::Result<char> {
        let code = self.read_u32()?;
        char::from_u32(code).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid Unicode scalar value: {code}"),
            )
        })
    }

    /// Reads a 32-bit float from its IEEE 754 bits.
    fn read_f32(&mut self) -> io::Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Reads a 64-bit float from its IEEE 754 bits.
    fn read_f64(&mut self) -> io::Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Reads a length-prefixed UTF-8 string.
    fn read_str(&mut self) -> io::Result<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid UTF-8: {e}"),
            )
        })
    }

    /// Reads a length-prefixed byte vector.
    fn read_bytes(&mut self) -> io::Result<Vec<u8>> {
        let len = self.read_length()?;
        self.read_raw_bytes(len)
    }

    /// Reads the length prefix of a byte run and checks it against the
    /// remaining input.
    fn read_length(&mut self) -> io::Result<usize> {
        let len = self.read_usize()?;
        if len > self.remaining() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "length prefix {len} exceeds the {} remaining bytes",
                    self.remaining()
                ),
            ));
        }
        Ok(len)
    }
}
