//! The frame around a serialized root.
//!
//! ```text
//! +---------+----------------------+---------------------+
//! | version | root type key (16 B) | root value          |
//! +---------+----------------------+---------------------+
//! ```
//!
//! The key lets a reader refuse a stream written for another root type
//! before decoding anything else.

use std::any::type_name;

use crate::{
    Result, error::Error, input::Input, output::Output, payload::Payload,
    type_key::TypeKey,
};

/// The version byte written in front of every envelope.
pub const FORMAT_VERSION: u8 = 1;

pub(crate) fn write_root<T: Payload>(
    root: &T,
    output: &mut Output<'_>,
) -> Result<()> {
    let encoder = output.encoder();
    encoder.emit_u8(FORMAT_VERSION)?;
    encoder.emit_raw_bytes(&T::TYPE_KEY.to_le_bytes())?;

    output.write(root)
}

pub(crate) fn read_root<T: Payload>(input: &mut Input<'_>) -> Result<T> {
    let decoder = input.decoder();

    let version = decoder.read_u8()?;
    if version != FORMAT_VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    let mut key = [0; 16];
    key.copy_from_slice(&decoder.read_raw_bytes(16)?);
    let found = TypeKey::from_le_bytes(key);
    if found != T::TYPE_KEY {
        return Err(Error::RootTypeMismatch {
            expected: type_name::<T>(),
            found,
        });
    }

    let root = input.read::<T>()?;

    match input.decoder().remaining() {
        0 => Ok(root),
        trailing => Err(Error::TrailingBytes(trailing)),
    }
}
