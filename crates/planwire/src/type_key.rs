//! Stable identification of payload types.
//!
//! A [`TypeKey`] names a concrete type independently of the compiler run
//! that produced it, which makes it usable both as a lookup key in the
//! injection mapping and as the root type stamp in a serialized envelope.
//!
//! Keys are computed at compile time from a unique type name such as
//! `planwire@0.1.0::plan::Scan`. Generic instantiations start from the key of
//! the generic type (its *family*) and fold in the keys of each type
//! argument, so `Vec<u32>` and `Vec<String>` get different keys while both
//! belong to the `Vec` family.

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt,
    sync::{Arc, Weak},
    time::Duration,
};

/// A stable 128-bit identifier of a type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeKey(u64, u64);

const OFFSET_HIGH: u64 = 0xcbf2_9ce4_8422_2325;
const OFFSET_LOW: u64 = 0x8422_2325_cbf2_9ce4;
const PRIME_HIGH: u64 = 0x0000_0100_0000_01b3;
const PRIME_LOW: u64 = 0x9e37_79b9_7f4a_7c15;

/// The 64-bit finalizer of splitmix64.
const fn avalanche(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

impl TypeKey {
    /// Computes the key of a type from its unique name.
    ///
    /// The name should include the package, its version and the module path
    /// of the type; `#[derive(Identifiable)]` builds it that way.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn of_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut high = OFFSET_HIGH ^ (bytes.len() as u64);
        let mut low = OFFSET_LOW;

        let mut i = 0;
        while i < bytes.len() {
            let byte = bytes[i] as u64;
            high = (high ^ byte).wrapping_mul(PRIME_HIGH);
            low = (low ^ byte.rotate_left((i % 64) as u32))
                .wrapping_mul(PRIME_LOW);
            i += 1;
        }

        Self(avalanche(high ^ low.rotate_left(32)), avalanche(low ^ high))
    }

    /// Folds `argument` into this key. The operation is order sensitive, so
    /// `a.combine(b)` and `b.combine(a)` differ.
    #[must_use]
    pub const fn combine(self, argument: Self) -> Self {
        let high = avalanche(
            self.0.rotate_left(23) ^ argument.0.wrapping_mul(PRIME_LOW),
        );
        let low = avalanche(
            self.1.wrapping_add(PRIME_HIGH) ^ argument.1.rotate_left(41),
        );
        Self(high ^ argument.1, low ^ self.0)
    }

    /// Returns the key as its little-endian byte representation.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 16] {
        (((self.0 as u128) << 64) | self.1 as u128).to_le_bytes()
    }

    /// Rebuilds a key from [`TypeKey::to_le_bytes`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_le_bytes(bytes: [u8; 16]) -> Self {
        let value = u128::from_le_bytes(bytes);
        Self((value >> 64) as u64, value as u64)
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({self})")
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.0, self.1)
    }
}

/// A type with a stable [`TypeKey`].
///
/// Implement it with `#[derive(Identifiable)]`, which derives the key from
/// the package name, version, module path and type name, and folds in the
/// keys of type parameters.
///
/// ```ignore
/// #[derive(Identifiable)]
/// struct Filter<T> {
///     input: T,
/// }
///
/// assert_eq!(Filter::<u32>::FAMILY, Filter::<String>::FAMILY);
/// assert_ne!(Filter::<u32>::TYPE_KEY, Filter::<String>::TYPE_KEY);
/// ```
#[diagnostic::on_unimplemented(
    message = "the type `{Self}` does not implement `Identifiable`",
    note = "derive it with `#[derive(Identifiable)]`"
)]
pub trait Identifiable {
    /// The key of this exact type, type arguments included.
    const TYPE_KEY: TypeKey;

    /// The key of the generic type this type instantiates. Equal to
    /// [`Identifiable::TYPE_KEY`] for non-generic types.
    const FAMILY: TypeKey = Self::TYPE_KEY;
}

// =============================================================================
// Implementations for primitive and platform types
// =============================================================================

macro_rules! identifiable_leaf {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Identifiable for $ty {
                const TYPE_KEY: TypeKey = TypeKey::of_name($name);
            }
        )*
    };
}

identifiable_leaf! {
    u8 => "core::u8",
    u16 => "core::u16",
    u32 => "core::u32",
    u64 => "core::u64",
    u128 => "core::u128",
    usize => "core::usize",
    i8 => "core::i8",
    i16 => "core::i16",
    i32 => "core::i32",
    i64 => "core::i64",
    i128 => "core::i128",
    isize => "core::isize",
    bool => "core::bool",
    char => "core::char",
    f32 => "core::f32",
    f64 => "core::f64",
    () => "core::unit",
    String => "alloc::string::String",
    Duration => "core::time::Duration",
    Arc<str> => "alloc::sync::Arc<str>",
}

// =============================================================================
// Implementations for generic containers
// =============================================================================

macro_rules! identifiable_generic {
    ($($ty:ident<$($param:ident),+> => $name:literal),* $(,)?) => {
        $(
            impl<$($param: Identifiable),+> Identifiable for $ty<$($param),+> {
                const FAMILY: TypeKey = TypeKey::of_name($name);
                const TYPE_KEY: TypeKey = {
                    let key = Self::FAMILY;
                    $(
                        let key = key.combine($param::TYPE_KEY);
                    )+
                    key
                };
            }
        )*
    };
}

identifiable_generic! {
    Option<T> => "core::option::Option",
    Box<T> => "alloc::boxed::Box",
    Arc<T> => "alloc::sync::Arc",
    Weak<T> => "alloc::sync::Weak",
    Vec<T> => "alloc::vec::Vec",
    VecDeque<T> => "alloc::collections::VecDeque",
    BTreeSet<T> => "alloc::collections::BTreeSet",
    BTreeMap<K, V> => "alloc::collections::BTreeMap",
}

impl<T: Identifiable> Identifiable for Box<[T]> {
    const FAMILY: TypeKey = TypeKey::of_name("alloc::boxed::Box<[_]>");
    const TYPE_KEY: TypeKey = Self::FAMILY.combine(T::TYPE_KEY);
}

impl<T: Identifiable> Identifiable for Arc<[T]> {
    const FAMILY: TypeKey = TypeKey::of_name("alloc::sync::Arc<[_]>");
    const TYPE_KEY: TypeKey = Self::FAMILY.combine(T::TYPE_KEY);
}

macro_rules! identifiable_tuple {
    ($name:literal: $($param:ident)+) => {
        impl<$($param: Identifiable),+> Identifiable for ($($param,)+) {
            const FAMILY: TypeKey = TypeKey::of_name($name);
            const TYPE_KEY: TypeKey = {
                let key = Self::FAMILY;
                $(
                    let key = key.combine($param::TYPE_KEY);
                )+
                key
            };
        }
    };
}

identifiable_tuple! { "core::tuple::1": A }
identifiable_tuple! { "core::tuple::2": A B }
identifiable_tuple! { "core::tuple::3": A B C }
identifiable_tuple! { "core::tuple::4": A B C D }
identifiable_tuple! { "core::tuple::5": A B C D E }
identifiable_tuple! { "core::tuple::6": A B C D E F }
