//! Tunables of an [`Engine`](crate::Engine).

/// The largest output buffer an engine preallocates. Larger requests are
/// clamped to this value.
pub const MAX_BUFFER_SIZE: usize = 2 << 15;

/// The nesting depth an engine allows unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Tunables of an engine.
///
/// ```ignore
/// let configuration = Configuration::builder()
///     .buffer_size(4096)
///     .max_depth(128)
///     .build();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, bon::Builder)]
pub struct Configuration {
    /// The initial capacity of the output buffer of every serialize call.
    #[builder(default = MAX_BUFFER_SIZE)]
    pub buffer_size: usize,

    /// How deeply values may nest before a call fails.
    #[builder(default = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
}

impl Default for Configuration {
    fn default() -> Self { Self::builder().build() }
}
