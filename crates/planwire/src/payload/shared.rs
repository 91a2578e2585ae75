//! Shared nodes: [`Arc`] and [`Weak`] with identity preserved.
//!
//! The first time an allocation is written, its stream position is recorded
//! and its contents follow. Every later occurrence of the same allocation is
//! written as a back-reference to that position. Decoding keeps a slot per
//! position, so all back-references resolve to one shared allocation again.
//!
//! A slot is reserved before the contents are decoded and completed after.
//! Types with a [`Payload::placeholder`] are allocated up front with
//! [`Arc::new_cyclic`], which lets `Weak` back-edges found while decoding the
//! contents point at the allocation being populated.

use std::{
    any::{Any, type_name},
    sync::{Arc, Weak},
};

use fxhash::FxHashMap;

use crate::{
    Result,
    error::Error,
    input::Input,
    output::Output,
    payload::Payload,
    session::SessionKey,
    type_key::TypeKey,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum SharedTag {
    New = 0,
    BackReference = 1,
    Null = 2,
}

impl SharedTag {
    fn read(input: &mut Input<'_>) -> Result<Self> {
        match input.decoder().read_u8()? {
            0 => Ok(Self::New),
            1 => Ok(Self::BackReference),
            2 => Ok(Self::Null),
            tag => Err(Error::UnknownTag { what: "shared reference", tag }),
        }
    }
}

/// Positions of the allocations written so far, keyed by address and type.
struct WrittenShared;

impl SessionKey for WrittenShared {
    type Value = FxHashMap<(usize, TypeKey), usize>;
}

/// Decoded shared values, keyed by the position they were written at.
struct ReadShared;

impl SessionKey for ReadShared {
    type Value = FxHashMap<usize, Slot>;
}

type Erased = Box<dyn Any + Send + Sync>;

enum Slot {
    /// Being decoded. Holds a `Weak<T>` to the allocation if it was made up
    /// front.
    Reserved(Option<Erased>),

    /// Fully decoded. Holds the `Arc<T>`.
    Complete(Erased),
}

fn write_arc<T: Payload>(
    arc: &Arc<T>,
    output: &mut Output<'_>,
) -> Result<()> {
    let identity = (Arc::as_ptr(arc).addr(), T::TYPE_KEY);
    let position = output.encoder().position();
    let written = output.session().get_mut_or_default::<WrittenShared>();

    if let Some(&origin) = written.get(&identity) {
        let encoder = output.encoder();
        encoder.emit_u8(SharedTag::BackReference as u8)?;
        encoder.emit_usize(origin)?;
        return Ok(());
    }

    written.insert(identity, position);
    output.encoder().emit_u8(SharedTag::New as u8)?;
    output.write::<T>(arc)
}

fn slots<'s>(input: &'s mut Input<'_>) -> &'s mut FxHashMap<usize, Slot> {
    input.session().get_mut_or_default::<ReadShared>()
}

fn read_new<T: Payload>(
    input: &mut Input<'_>,
    position: usize,
) -> Result<Arc<T>> {
    let arc = if let Some(placeholder) = T::placeholder() {
        let mut failure = None;
        let arc = Arc::new_cyclic(|weak: &Weak<T>| {
            let weak: Erased = Box::new(weak.clone());
            slots(input).insert(position, Slot::Reserved(Some(weak)));

            input.read::<T>().unwrap_or_else(|error| {
                failure = Some(error);
                placeholder
            })
        });

        if let Some(error) = failure {
            return Err(error);
        }

        arc
    } else {
        slots(input).insert(position, Slot::Reserved(None));
        Arc::new(input.read::<T>()?)
    };

    slots(input).insert(position, Slot::Complete(Box::new(Arc::clone(&arc))));

    Ok(arc)
}

fn origin_slot<'s>(input: &'s mut Input<'_>) -> Result<(usize, &'s Slot)> {
    let origin = input.decoder().read_usize()?;
    tracing::trace!(origin, "following back-reference");

    slots(input)
        .get(&origin)
        .map(|slot| (origin, slot))
        .ok_or(Error::DanglingReference { position: origin })
}

fn read_arc<T: Payload>(input: &mut Input<'_>) -> Result<Arc<T>> {
    let position = input.decoder().position();

    match SharedTag::read(input)? {
        SharedTag::New => read_new(input, position),

        SharedTag::BackReference => match origin_slot(input)? {
            (position, Slot::Complete(arc)) => {
                arc.downcast_ref::<Arc<T>>().cloned().ok_or(
                    Error::ReferenceTypeMismatch {
                        type_name: type_name::<T>(),
                        position,
                    },
                )
            }
            (position, Slot::Reserved(_)) => Err(Error::CyclicReference {
                type_name: type_name::<T>(),
                position,
            }),
        },

        SharedTag::Null => Err(Error::UnknownTag {
            what: "shared reference",
            tag: SharedTag::Null as u8,
        }),
    }
}

fn read_weak<T: Payload>(input: &mut Input<'_>) -> Result<Weak<T>> {
    let position = input.decoder().position();

    match SharedTag::read(input)? {
        SharedTag::Null => Ok(Weak::new()),

        // the slot keeps the allocation alive until the call returns
        SharedTag::New => {
            read_new(input, position).map(|arc| Arc::downgrade(&arc))
        }

        SharedTag::BackReference => {
            let mismatch = |position| Error::ReferenceTypeMismatch {
                type_name: type_name::<T>(),
                position,
            };

            match origin_slot(input)? {
                (position, Slot::Complete(arc)) => arc
                    .downcast_ref::<Arc<T>>()
                    .map(Arc::downgrade)
                    .ok_or_else(|| mismatch(position)),

                (position, Slot::Reserved(Some(weak))) => weak
                    .downcast_ref::<Weak<T>>()
                    .cloned()
                    .ok_or_else(|| mismatch(position)),

                (position, Slot::Reserved(None)) => {
                    Err(Error::CyclicReference {
                        type_name: type_name::<T>(),
                        position,
                    })
                }
            }
        }
    }
}

impl<T: Payload> Payload for Arc<T> {
    fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        write_arc(self, output)
    }

    fn read_fields(input: &mut Input<'_>) -> Result<Self> { read_arc(input) }
}

impl<T: Payload> Payload for Weak<T> {
    fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        match self.upgrade() {
            Some(arc) => write_arc(&arc, output),
            None => Ok(output.encoder().emit_u8(SharedTag::Null as u8)?),
        }
    }

    fn read_fields(input: &mut Input<'_>) -> Result<Self> { read_weak(input) }
}

#[cfg(test)]
mod test;
