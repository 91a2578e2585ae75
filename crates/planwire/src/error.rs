//! Error types of the serialization engine.

use std::io;

use crate::{data_type::TypeKind, type_info::Category, type_key::TypeKey};

/// A boxed error reported by an environment collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A convenient alias for results produced by the engine.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The broad class of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The engine was set up or used inconsistently. Raised while building
    /// the engine or when a type reaches a strategy it cannot support.
    Configuration,

    /// The stream is well formed but names something the current
    /// environment cannot provide.
    Resolution,

    /// The stream is truncated, corrupt or was produced for another type.
    Structural,
}

/// Every way serialization or deserialization can fail.
///
/// Failures are fatal for the call that raised them; no partial result is
/// ever returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two injections were registered for the same type.
    #[error("type `{type_name}` ({key}) is injected more than once")]
    DuplicateInjection {
        /// The offending type.
        type_name: &'static str,
        /// Its key.
        key: TypeKey,
    },

    /// A buffer size of zero was requested.
    #[error("buffer size must be greater than zero")]
    InvalidBufferSize,

    /// A maximum depth of zero was requested.
    #[error("maximum nesting depth must be greater than zero")]
    InvalidMaxDepth,

    /// A type that only exists as part of the environment reached the
    /// structural strategy because nothing injected it.
    #[error(
        "type `{type_name}` is bound to the environment and must be injected"
    )]
    NotStructural {
        /// The offending type.
        type_name: &'static str,
    },

    /// A type was dispatched to a category it cannot be viewed as.
    #[error("type `{type_name}` cannot be serialized as {category}")]
    CategoryMismatch {
        /// The offending type.
        type_name: &'static str,
        /// The category the registry picked.
        category: Category,
    },

    /// The stream marks a value as injected but no injection exists for its
    /// type.
    #[error("no injected instance of `{type_name}` ({key}) is available")]
    MissingInjection {
        /// The type that had to be injected.
        type_name: &'static str,
        /// Its key.
        key: TypeKey,
    },

    /// The catalog does not know the operator named in the stream.
    #[error("unknown operator `{0}`")]
    UnknownOperator(String),

    /// The plugin registry does not know the plugin named in the stream.
    #[error("unknown storage plugin `{0}`")]
    UnknownPlugin(String),

    /// The catalog cannot resolve the table path named in the stream.
    #[error("unknown table `{}`", .0.join("."))]
    UnknownTable(Vec<String>),

    /// The type factory refused to rebuild a data type.
    #[error("type factory rejected a {kind} type")]
    TypeFactory {
        /// The kind of the rejected description.
        kind: TypeKind,
        /// The factory's reason.
        #[source]
        source: BoxError,
    },

    /// The stream ended early or contains a malformed primitive.
    #[error("malformed stream: {0}")]
    Stream(#[from] io::Error),

    /// A tag byte is not one of the values the decoder expects.
    #[error("unknown {what} tag {tag}")]
    UnknownTag {
        /// What the tag was supposed to select.
        what: &'static str,
        /// The tag found in the stream.
        tag: u8,
    },

    /// An enum variant index is out of range.
    #[error(
        "invalid variant index {index} for enum `{type_name}` (expected \
         0..{count})"
    )]
    InvalidVariant {
        /// The enum being decoded.
        type_name: &'static str,
        /// The index found in the stream.
        index: usize,
        /// The number of variants of the enum.
        count: usize,
    },

    /// The envelope was written by an incompatible format version.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),

    /// The envelope holds a root of a different type than requested.
    #[error("stream holds a root of type {found}, expected `{expected}`")]
    RootTypeMismatch {
        /// The requested root type.
        expected: &'static str,
        /// The key stamped into the envelope.
        found: TypeKey,
    },

    /// Bytes were left over after the root value.
    #[error("{0} trailing bytes after the root value")]
    TrailingBytes(usize),

    /// A back-reference points at a position where no shared value starts.
    #[error("back-reference to unknown position {position}")]
    DanglingReference {
        /// The referenced stream position.
        position: usize,
    },

    /// A strong back-reference points at a value that is still being
    /// decoded.
    #[error(
        "strong reference to `{type_name}` at position {position} forms a \
         cycle"
    )]
    CyclicReference {
        /// The referenced type.
        type_name: &'static str,
        /// The referenced stream position.
        position: usize,
    },

    /// A back-reference points at a value of another type.
    #[error(
        "back-reference at position {position} does not hold a `{type_name}`"
    )]
    ReferenceTypeMismatch {
        /// The expected type.
        type_name: &'static str,
        /// The referenced stream position.
        position: usize,
    },

    /// The value graph is nested deeper than the configured limit.
    #[error("value graph is nested deeper than {limit} levels")]
    DepthExceeded {
        /// The configured limit.
        limit: usize,
    },

    /// A writable value failed to produce or parse its native form.
    #[error("native form of `{type_name}` is invalid")]
    Native {
        /// The writable type.
        type_name: &'static str,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateInjection { .. }
            | Self::InvalidBufferSize
            | Self::InvalidMaxDepth
            | Self::NotStructural { .. }
            | Self::CategoryMismatch { .. } => ErrorKind::Configuration,

            Self::MissingInjection { .. }
            | Self::UnknownOperator(_)
            | Self::UnknownPlugin(_)
            | Self::UnknownTable(_)
            | Self::TypeFactory { .. } => ErrorKind::Resolution,

            Self::Stream(_)
            | Self::UnknownTag { .. }
            | Self::InvalidVariant { .. }
            | Self::UnsupportedVersion(_)
            | Self::RootTypeMismatch { .. }
            | Self::TrailingBytes(_)
            | Self::DanglingReference { .. }
            | Self::CyclicReference { .. }
            | Self::ReferenceTypeMismatch { .. }
            | Self::DepthExceeded { .. }
            | Self::Native { .. } => ErrorKind::Structural,
        }
    }
}
