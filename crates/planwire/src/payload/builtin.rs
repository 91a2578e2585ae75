//! [`Payload`] implementations for primitive and standard library types.

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    io,
    sync::Arc,
    time::Duration,
};

use crate::{Result, input::Input, output::Output, payload::Payload};


// =============================================================================
// Primitive types
// =============================================================================

macro_rules! primitive_payload {
    ($($ty:ty => $emit:ident, $read:ident;)*) => {
        $(
            impl Payload for $ty {
                fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
                    Ok(output.encoder().$emit(*self)?)
                }

                fn read_fields(input: &mut Input<'_>) -> Result<Self> {
                    Ok(input.decoder().$read()?)
                }
            }
        )*
    };
}

primitive_payload! {
    u8 => emit_u8, read_u8;
    u16 => emit_u16, read_u16;
    u32 => emit_u32, read_u32;
    u64 => emit_u64, read_u64;
    u128 => emit_u128, read_u128;
    usize => emit_usize, read_usize;
    i8 => emit_i8, read_i8;
    i16 => emit_i16, read_i16;
    i32 => emit_i32, read_i32;
    i64 => emit_i64, read_i64;
    i128 => emit_i128, read_i128;
    isize => emit_isize, read_isize;
    bool => emit_bool, read_bool;
    char => emit_char, read_char;
    f32 => emit_f32, read_f32;
    f64 => emit_f64, read_f64;
}

impl Payload for () {
    fn write_fields(&self, _output: &mut Output<'_>) -> Result<()> { Ok(()) }

    fn read_fields(_input: &mut Input<'_>) -> Result<Self> { Ok(()) }
}

impl Payload for String {
    fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        Ok(output.encoder().emit_str(self)?)
    }

    fn read_fields(input: &mut Input<'_>) -> Result<Self> {
        Ok(input.decoder().read_str()?)
    }
}

impl Payload for Arc<str> {
    fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        Ok(output.encoder().emit_str(self)?)
    }

    fn read_fields(input: &mut Input<'_>) -> Result<Self> {
        Ok(Self::from(input.decoder().read_str()?))
    }
}

impl Payload for Duration {
    fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        let encoder = output.encoder();
        encoder.emit_u64(self.as_secs())?;
        encoder.emit_u32(self.subsec_nanos())?;
        Ok(())
    }

    fn read_fields(input: &mut Input<'_>) -> Result<Self> {
        let decoder = input.decoder();
        let secs = decoder.read_u64()?;
        let nanos = decoder.read_u32()?;

        if nanos >= 1_000_000_000 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("duration has {nanos} sub-second nanoseconds"),
            )
            .into());
        }

        Ok(Self::new(secs, nanos))
    }
}

// =============================================================================
// Forwarding wrappers
// =============================================================================

impl<T: Payload> Payload for Option<T> {
    fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        match self {
            Some(value) => {
                output.encoder().emit_bool(true)?;
                output.write(value)
            }
            None => Ok(output.encoder().emit_bool(false)?),
        }
    }

    fn read_fields(input: &mut Input<'_>) -> Result<Self> {
        if input.decoder().read_bool()? {
            input.read().map(Some)
        } else {
            Ok(None)
        }
    }
}

impl<T: Payload> Payload for Box<T> {
    fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        output.write::<T>(self)
    }

    fn read_fields(input: &mut Input<'_>) -> Result<Self> {
        input.read().map(Box::new)
    }
}

macro_rules! tuple_payload {
    ($($param:ident $index:tt)+) => {
        impl<$($param: Payload),+> Payload for ($($param,)+) {
            fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
                $(
                    output.write(&self.$index)?;
                )+
                Ok(())
            }

            fn read_fields(input: &mut Input<'_>) -> Result<Self> {
                Ok(($(input.read::<$param>()?,)+))
            }
        }
    };
}

tuple_payload! { A 0 }
tuple_payload! { A 0 B 1 }
tuple_payload! { A 0 B 1 C 2 }
tuple_payload! { A 0 B 1 C 2 D 3 }
tuple_payload! { A 0 B 1 C 2 D 3 E 4 }
tuple_payload! { A 0 B 1 C 2 D 3 E 4 F 5 }

// =============================================================================
// Collections
// =============================================================================

/// Writes the length followed by every element.
fn write_sequence<'v, T: Payload + 'v>(
    output: &mut Output<'_>,
    len: usize,
    elements: impl IntoIterator<Item = &'v T>,
) -> Result<()> {
    output.encoder().emit_usize(len)?;
    for element in elements {
        output.write(element)?;
    }
    Ok(())
}

/// Upper bound on the length of a sequence whose elements are zero-sized.
pub(crate) const MAX_ZERO_SIZED_LEN: usize = 1 << 16;

/// Reads a sequence length for elements of type `E`.
///
/// Every element of a non-zero-sized type takes at least one byte, so the
/// length can never exceed what is left of the input. Zero-sized elements
/// take no bytes and are capped by [`MAX_ZERO_SIZED_LEN`] instead.
fn read_length<E>(input: &mut Input<'_>) -> Result<usize> {
    let decoder = input.decoder();
    let len = decoder.read_usize()?;

    let limit = if size_of::<E>() == 0 {
        MAX_ZERO_SIZED_LEN
    } else {
        decoder.remaining()
    };

    if len > limit {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("sequence of {len} elements exceeds the input"),
        )
        .into());
    }

    Ok(len)
}

/// Reads a length and then that many elements into `C`.
fn read_sequence<T: Payload, C: FromIterator<T>>(
    input: &mut Input<'_>,
) -> Result<C> {
    let len = read_length::<T>(input)?;
    (0..len).map(|_| input.read::<T>()).collect()
}

impl<T: Payload> Payload for Vec<T> {
    fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        write_sequence(output, self.len(), self)
    }

    fn read_fields(input: &mut Input<'_>) -> Result<Self> {
        read_sequence(input)
    }
}

impl<T: Payload> Payload for VecDeque<T> {
    fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        write_sequence(output, self.len(), self)
    }

    fn read_fields(input: &mut Input<'_>) -> Result<Self> {
        read_sequence(input)
    }
}

impl<T: Payload> Payload for Box<[T]> {
    fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        write_sequence(output, self.len(), self.iter())
    }

    fn read_fields(input: &mut Input<'_>) -> Result<Self> {
        read_sequence(input)
    }
}

impl<T: Payload> Payload for Arc<[T]> {
    fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        write_sequence(output, self.len(), self.iter())
    }

    fn read_fields(input: &mut Input<'_>) -> Result<Self> {
        read_sequence(input)
    }
}

impl<T: Payload + Ord> Payload for BTreeSet<T> {
    fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        write_sequence(output, self.len(), self)
    }

    fn read_fields(input: &mut Input<'_>) -> Result<Self> {
        read_sequence(input)
    }
}

impl<K: Payload + Ord, V: Payload> Payload for BTreeMap<K, V> {
    fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        output.encoder().emit_usize(self.len())?;
        for (key, value) in self {
            output.write(key)?;
            output.write(value)?;
        }
        Ok(())
    }

    fn read_fields(input: &mut Input<'_>) -> Result<Self> {
        let len = read_length::<(K, V)>(input)?;
        (0..len)
            .map(|_| -> Result<(K, V)> { Ok((input.read()?, input.read()?)) })
            .collect()
    }
}
