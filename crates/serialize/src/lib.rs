//! Planwire wire codec
//!
//! This crate provides the primitive layer of the planwire serialization
//! engine: a pair of traits for emitting and reading primitive values, and a
//! compact postcard-style implementation of both.
//!
//! # Overview
//!
//! - [`Encoder`]: Low-level trait for emitting primitive values
//! - [`Decoder`]: Low-level trait for reading primitive values
//! - [`PostcardEncoder`]/[`PostcardDecoder`]: varint based implementation
//!
//! Both traits expose the current stream position. The object-graph layer
//! built on top of this crate uses positions as identities for shared nodes,
//! so every implementation must count bytes exactly as they hit the stream.
//!
//! # Example
//!
//! ```ignore
//! use planwire_serialize::{
//!     Decoder, Encoder, PostcardDecoder, PostcardEncoder,
//! };
//!
//! let mut encoder = PostcardEncoder::new(Vec::new());
//! encoder.emit_u32(300)?;
//! encoder.emit_str("scan")?;
//! let bytes = encoder.into_inner();
//!
//! let mut decoder = PostcardDecoder::new(&bytes);
//! assert_eq!(decoder.read_u32()?, 300);
//! assert_eq!(decoder.read_str()?, "scan");
//! assert_eq!(decoder.remaining(), 0);
//! ```

pub mod decode;
pub mod encode;
pub mod postcard;

pub use decode::Decoder;
pub use encode::Encoder;
pub use postcard::{PostcardDecoder, PostcardEncoder};
