//! The [`Encoder`] trait for emitting primitive values.

use std::io;

/// A sink for primitive values in a binary format.
///
/// Implementors provide the low-level representation of primitive types. The
/// default implementations delegate to the required methods where possible but
/// can be overridden for format-specific reasons.
///
/// All methods return [`io::Result`] so that encoders writing to fallible
/// sinks can report failures.
///
/// # Example
///
/// ```ignore
/// use planwire_serialize::Encoder;
/// use std::io;
///
/// struct CountingEncoder {
///     buffer: Vec<u8>,
/// }
///
/// impl Encoder for CountingEncoder {
///     fn position(&self) -> usize { self.buffer.len() }
///
///     fn emit_u8(&mut self, v: u8) -> io::Result<()> {
///         self.buffer.push(v);
///         Ok(())
///     }
///
///     fn emit_raw_bytes(&mut self, s: &[u8]) -> io::Result<()> {
///         self.buffer.extend_from_slice(s);
///         Ok(())
///     }
///
///     // ... implement other required methods
/// }
/// ```
pub trait Encoder {
    // =========================================================================
    // Required methods
    // =========================================================================

    /// Returns the number of bytes emitted so far.
    fn position(&self) -> usize;

    /// Emits a single unsigned byte.
    fn emit_u8(&mut self, v: u8) -> io::Result<()>;

    /// Emits a 16-bit unsigned integer.
    fn emit_u16(&mut self, v: u16) -> io::Result<()>;

    /// Emits a 32-bit unsigned integer.
    fn emit_u32(&mut self, v: u32) -> io::Result<()>;

    /// Emits a 64-bit unsigned integer.
    fn emit_u64(&mut self, v: u64) -> io::Result<()>;

    /// Emits a 128-bit unsigned integer.
    fn emit_u128(&mut self, v: u128) -> io::Result<()>;

    /// Emits a single signed byte.
    fn emit_i8(&mut self, v: i8) -> io::Result<()>;

    /// Emits a 16-bit signed integer.
    fn emit_i16(&mut self, v: i16) -> io::Result<()>;

    /// Emits a 32-bit signed integer.
    fn emit_i32(&mut self, v: i32) -> io::Result<()>;

    /// Emits a 64-bit signed integer.
    fn emit_i64(&mut self, v: i64) -> io::Result<()>;

    /// Emits a 128-bit signed integer.
    fn emit_i128(&mut self, v: i128) -> io::Result<()>;

    /// Emits raw bytes directly to the output, without a length prefix.
    fn emit_raw_bytes(&mut self, s: &[u8]) -> io::Result<()>;

    // =========================================================================
    // Default implementations
    // =========================================================================

    /// Emits a platform-sized unsigned integer as a 64-bit value.
    fn emit_usize(&mut self, v: usize) -> io::Result<()> {
        self.emit_u64(v as u64)
    }

    /// Emits a platform-sized signed integer as a 64-bit value.
    fn emit_isize(&mut self, v: isize) -> io::Result<()> {
        self.emit_i64(v as i64)
    }

    /// Emits a boolean as `1u8` or `0u8`.
    fn emit_bool(&mut self, v: bool) -> io::Result<()> {
        self.emit_u8(u8::from(v))
    }

    /// Emits a Unicode character as its scalar value.
    fn emit_char(&mut self, v: char) -> io::Result<()> {
        self.emit_u32(u32::from(v))
    }

    /// Emits a 32-bit float using its IEEE 754 bits.
    fn emit_f32(&mut self, v: f32) -> io::Result<()> {
        self.emit_u32(v.to_bits())
    }

    /// Emits a 64-bit float using its IEEE 754 bits.
    fn emit_f64(&mut self, v: f64) -> io::Result<()> {
        self.emit_u64(v.to_bits())
    }

    /// Emits a length-prefixed UTF-8 string.
    fn emit_str(&mut self, v: &str) -> io::Result<()> {
        self.emit_bytes(v.as_bytes())
    }

    /// Emits a length-prefixed byte slice.
    fn emit_bytes(&mut self, v: &[u8]) -> io::Result<()> {
        self.emit_usize(v.len())?;
        self.emit_raw_bytes(v)
    }
}
