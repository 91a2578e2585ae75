//! The fallback strategy for every type without a specific serializer.
//!
//! Values whose type has an instance in the injection mapping are replaced
//! by a one-byte marker; on decode the marker is swapped for the instance of
//! the decoding engine. Everything else is written structurally, field by
//! field, and reassembled without running a constructor.

use std::any::type_name;

use crate::{
    Result,
    error::Error,
    injection::Injection,
    input::Input,
    output::Output,
    payload::Payload,
};

/// The tag that precedes every value handled by the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum FallbackTag {
    Injected = 0,
    Structural = 1,
}

impl FallbackTag {
    const fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Injected),
            1 => Some(Self::Structural),
            _ => None,
        }
    }
}

pub(crate) fn write<T: Payload>(
    value: &T,
    output: &mut Output<'_>,
) -> Result<()> {
    if output.injections().contains(T::TYPE_KEY) {
        tracing::trace!(
            type_name = type_name::<T>(),
            "writing injection marker"
        );
        output.encoder().emit_u8(FallbackTag::Injected as u8)?;
        return Ok(());
    }

    tracing::trace!(type_name = type_name::<T>(), "writing structurally");
    output.encoder().emit_u8(FallbackTag::Structural as u8)?;
    value.write_fields(output)
}

pub(crate) fn read<T: Payload>(input: &mut Input<'_>) -> Result<T> {
    let tag = input.decoder().read_u8()?;

    match FallbackTag::from_u8(tag) {
        Some(FallbackTag::Injected) => input
            .injections()
            .lookup(T::TYPE_KEY)
            .and_then(Injection::instantiate::<T>)
            .ok_or(Error::MissingInjection {
                type_name: type_name::<T>(),
                key: T::TYPE_KEY,
            }),

        Some(FallbackTag::Structural) => T::read_fields(input),

        None => Err(Error::UnknownTag { what: "fallback", tag }),
    }
}
