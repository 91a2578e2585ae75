//! The read half of one deserialization call.

use planwire_serialize::{Decoder, PostcardDecoder};

use crate::{
    Result,
    context::SerializerContext,
    engine::Engine,
    error::Error,
    injection::InjectionMapping,
    payload::Payload,
    session::Session,
    strategy,
};

/// The source payload types read their fields from.
///
/// Mirrors [`Output`](crate::Output): nested values go through
/// [`Input::read`], primitive data comes from [`Input::decoder`].
#[derive(Debug)]
pub struct Input<'a> {
    decoder: PostcardDecoder<'a>,
    engine: &'a Engine,
    session: Session,
    depth: usize,
}

impl<'a> Input<'a> {
    pub(crate) fn new(engine: &'a Engine, bytes: &'a [u8]) -> Self {
        Self {
            decoder: PostcardDecoder::new(bytes),
            engine,
            session: Session::new(),
            depth: 0,
        }
    }

    /// Reads a `T` using the strategy the registry resolves for it.
    pub fn read<T: Payload>(&mut self) -> Result<T> {
        let limit = self.engine.max_depth();
        if self.depth >= limit {
            return Err(Error::DepthExceeded { limit });
        }

        self.depth += 1;
        let result = strategy::read(self);
        self.depth -= 1;

        result
    }

    /// Returns the primitive decoder.
    pub fn decoder(&mut self) -> &mut dyn Decoder { &mut self.decoder }

    /// Returns the state of the current call.
    pub fn session(&mut self) -> &mut Session { &mut self.session }

    /// Returns the context of the engine performing the call.
    #[must_use]
    pub fn context(&self) -> &'a SerializerContext { self.engine.context() }

    pub(crate) fn engine(&self) -> &'a Engine { self.engine }

    pub(crate) fn injections(&self) -> &'a InjectionMapping {
        self.engine.injections()
    }
}
