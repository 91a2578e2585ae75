//! The write half of one serialization call.

use planwire_serialize::{Encoder, PostcardEncoder};

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

/// The sink payload types write their fields to.
///
/// Every nested value goes through [`Output::write`], which asks the
/// registry for the strategy of the value's type. Primitive data is emitted
/// directly through [`Output::encoder`].
#[derive(Debug)]
pub struct Output<'a> {
    encoder: PostcardEncoder<Vec<u8>>,
    engine: &'a Engine,
    session: Session,
    depth: usize,
}

impl<'a> Output<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self {
            encoder: PostcardEncoder::new(Vec::with_capacity(
                engine.context().buffer_size(),
            )),
            engine,
            session: Session::new(),
            depth: 0,
        }
    }

    /// Writes `value` using the strategy the registry resolves for `T`.
    pub fn write<T: Payload>(&mut self, value: &T) -> Result<()> {
        let limit = self.engine.max_depth();
        if self.depth >= limit {
            return Err(Error::DepthExceeded { limit });
        }

        self.depth += 1;
        let result = strategy::write(self, value);
        self.depth -= 1;

        result
    }

    /// Returns the primitive encoder.
    pub fn encoder(&mut self) -> &mut dyn Encoder { &mut self.encoder }

    /// Returns the state of the current call.
    pub fn session(&mut self) -> &mut Session { &mut self.session }

    /// Returns the context of the engine performing the call.
    #[must_use]
    pub fn context(&self) -> &'a SerializerContext { self.engine.context() }

    pub(crate) fn engine(&self) -> &'a Engine { self.engine }

    pub(crate) fn injections(&self) -> &'a InjectionMapping {
        self.engine.injections()
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> { self.encoder.into_inner() }
}
